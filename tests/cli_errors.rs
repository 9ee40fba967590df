use predicates::str::contains;

#[test]
fn zero_arrival_rate_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args(["run", "--groups", "1", "--arrival-rate", "0"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: arrival rate must be > 0 (got 0)"));
}

#[test]
fn uneven_partition_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args(["run", "--groups", "5", "--arrival-rate", "1"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: 5 groups do not evenly partition 12 servers"));
}

#[test]
fn group_count_without_service_rate_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args(["run", "--groups", "4", "--arrival-rate", "1"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: no service rate configured for 4 groups"));
}

#[test]
fn zero_queue_capacity_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args([
        "run",
        "--groups",
        "1",
        "--arrival-rate",
        "1",
        "--queue-capacity",
        "0",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: queue capacity must be greater than 0"));
}

#[test]
fn missing_subcommand_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.assert().failure().stderr(contains("Error:"));
}

#[test]
fn zero_replications_fail() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args(["sweep", "--replications", "0"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: replications must be greater than 0"));
}
