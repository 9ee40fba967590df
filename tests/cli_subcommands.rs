use predicates::str::diff;

#[test]
fn list_policies_prints_supported_values() {
    let expected = concat!("waiting-list\n", "reject\n", "head-of-line\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.arg("list-policies");
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn show_config_prints_defaults_with_overrides() {
    let expected = concat!(
        "Servers: 12\n",
        "Queue capacity: 100\n",
        "Horizon: 1000\n",
        "Policy: head-of-line\n",
        "Seed: 42\n",
        "Replications: 10\n",
        "Max loss rate: 0.05\n",
        "Group counts: 1, 2, 3, 6\n",
        "Arrival rates: 0.1 to 6 step 0.35\n",
        "Service rates:\n",
        "- 1 groups: 0.2 per server\n",
        "- 2 groups: 0.35 per server\n",
        "- 3 groups: 0.5 per server\n",
        "- 6 groups: 0.7 per server\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("router-sim");
    cmd.args(["show-config", "--policy", "head-of-line", "--seed", "42"]);
    cmd.assert().success().stdout(diff(expected));
}
