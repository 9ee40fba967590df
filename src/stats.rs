use serde::Serialize;

use crate::state::RunCounters;

/// Critical value of the standard normal for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Time-average number of requests in the system.
    pub mean_in_system: f64,
    pub effective_throughput: f64,
    /// Sample mean of recorded response times.
    pub mean_response_time: f64,
    /// `mean_in_system / effective_throughput`.
    pub littles_law_response_time: f64,
    pub loss_rate: f64,
}

pub fn reduce(counters: &RunCounters) -> RunStatistics {
    let elapsed = counters.elapsed;
    let mean_in_system = ratio_or(counters.occupancy_area, elapsed, 0.0);
    let effective_throughput = ratio_or(counters.completed as f64, elapsed, 0.0);
    let mean_response_time = if counters.response_times.is_empty() {
        f64::INFINITY
    } else {
        counters.response_times.iter().sum::<f64>() / counters.response_times.len() as f64
    };
    let littles_law_response_time = ratio_or(mean_in_system, effective_throughput, f64::INFINITY);
    let loss_rate = ratio_or(counters.lost() as f64, counters.arrivals as f64, 0.0);

    RunStatistics {
        mean_in_system,
        effective_throughput,
        mean_response_time,
        littles_law_response_time,
        loss_rate,
    }
}

fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 {
        fallback
    } else {
        numerator / denominator
    }
}

/// Sample mean with a 95% confidence half-width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Estimate {
    pub mean: f64,
    pub half_width: f64,
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Unbiased sample variance; zero below two samples.
pub fn sample_variance(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let squares = samples.iter().map(|value| (value - m).powi(2)).sum::<f64>();
    squares / (samples.len() - 1) as f64
}

pub fn confidence_interval(samples: &[f64]) -> Estimate {
    if samples.is_empty() {
        return Estimate {
            mean: 0.0,
            half_width: 0.0,
        };
    }
    let half_width = if samples.len() < 2 {
        0.0
    } else if samples.iter().any(|value| !value.is_finite()) {
        f64::INFINITY
    } else {
        Z_95 * (sample_variance(samples) / samples.len() as f64).sqrt()
    };
    Estimate {
        mean: mean(samples),
        half_width,
    }
}
