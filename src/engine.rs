use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analytics::validate_distribution;
use crate::error::{Error, Result};
use crate::generators::PoissonTable;
use crate::metrics::{self, ResultRow, Summary, Utilization};
use crate::models::{ArrivalMethod, Distribution, InputMode, SimConfig};
use crate::scheduler::{self, Segment};
use crate::stream;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimulationResult {
    pub rows: Vec<ResultRow>,
    pub timeline: Vec<Segment>,
    pub utilization: Utilization,
    pub summary: Summary,
    pub truncated: bool,
}

/// Single synchronous entry point: validate, generate the streams,
/// schedule, derive metrics. A fixed seed fixes the whole run.
pub fn run_simulation(config: &SimConfig) -> Result<SimulationResult> {
    validate_config(config)?;
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
    let customers = stream::build_customers(config, &mut rng)?;
    let timeline = scheduler::run(&customers, config.num_servers);
    let rows = metrics::derive_rows(&customers, &timeline);
    let utilization = metrics::utilization(&timeline, config.num_servers);
    let summary = metrics::summarize(&rows);
    Ok(SimulationResult {
        rows,
        utilization,
        summary,
        truncated: timeline.truncated,
        timeline: timeline.segments,
    })
}

pub fn validate_config(config: &SimConfig) -> Result<()> {
    if config.num_servers < 1 {
        return Err(Error::ServersZero);
    }
    if config.arrival.lambda <= 0.0 {
        return Err(Error::InvalidArrivalRate(config.arrival.lambda));
    }
    validate_distribution(&config.service)?;
    if matches!(config.service, Distribution::Gamma { .. }) {
        return Err(Error::GammaNotSimulable);
    }
    if let Some(range) = &config.priority {
        if range.min < 1 || range.min > range.max {
            return Err(Error::InvalidPriorityRange {
                min: range.min,
                max: range.max,
            });
        }
    }
    match config.input {
        InputMode::FixedCount { customers: 0 } => return Err(Error::CustomersZero),
        InputMode::FixedCount { .. } => {}
        InputMode::TimeHorizon { horizon_minutes } => {
            if horizon_minutes <= 0.0 {
                return Err(Error::InvalidHorizon(horizon_minutes));
            }
        }
    }

    // Stability: offered load per server from the mean inter-arrival
    // spacing the configured method will actually produce.
    let mean_gap = match config.arrival.method {
        ArrivalMethod::Table => PoissonTable::build(config.arrival.lambda).mean_spacing(),
        ArrivalMethod::Exponential => 1.0 / config.arrival.lambda,
    };
    let rho = config.service.mean() / (config.num_servers as f64 * mean_gap);
    if rho >= 1.0 {
        return Err(Error::UnstableSystem(rho));
    }
    Ok(())
}
