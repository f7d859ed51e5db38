use rand::RngCore;

use crate::error::Result;
use crate::generators::{
    exponential_interarrival, sample_priority, sample_service, PoissonTable,
};
use crate::models::{ArrivalMethod, InputMode, SimConfig};

/// Hard cap on generated customers; guarantees the time-horizon loop
/// terminates even when rounding collapses inter-arrival gaps to zero.
pub const MAX_CUSTOMERS: usize = 500;

/// One generated customer, ready for scheduling.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomerSpec {
    pub id: usize,
    pub inter_arrival: f64,
    pub arrival: f64,
    pub service: f64,
    pub priority: i64,
}

/// Materializes the arrival/service streams for a run. Arrival spacing
/// comes from the configured method; one service sample and one priority
/// draw per customer, all off the single injected source.
pub fn build_customers(config: &SimConfig, rng: &mut dyn RngCore) -> Result<Vec<CustomerSpec>> {
    let table = match config.arrival.method {
        ArrivalMethod::Table => Some(PoissonTable::build(config.arrival.lambda)),
        ArrivalMethod::Exponential => None,
    };
    let gap = |rng: &mut dyn RngCore| match &table {
        Some(table) => table.invert(crate::random::uniform01(rng)) as f64,
        None => exponential_interarrival(config.arrival.lambda, rng),
    };

    let mut customers = Vec::new();
    match config.input {
        InputMode::FixedCount { customers: count } => {
            let mut arrival = 0.0;
            for id in 0..count {
                let inter_arrival = if id == 0 { 0.0 } else { gap(rng) };
                arrival += inter_arrival;
                customers.push(make_customer(config, rng, id, inter_arrival, arrival)?);
            }
        }
        InputMode::TimeHorizon { horizon_minutes } => {
            let mut arrival = 0.0;
            while customers.len() < MAX_CUSTOMERS {
                let inter_arrival = gap(rng);
                let next = arrival + inter_arrival;
                if next > horizon_minutes {
                    // The overshoot sample is discarded: arrivals strictly
                    // beyond the horizon are excluded.
                    break;
                }
                arrival = next;
                let id = customers.len();
                customers.push(make_customer(config, rng, id, inter_arrival, arrival)?);
            }
        }
    }

    Ok(customers)
}

fn make_customer(
    config: &SimConfig,
    rng: &mut dyn RngCore,
    id: usize,
    inter_arrival: f64,
    arrival: f64,
) -> Result<CustomerSpec> {
    let service = sample_service(&config.service, rng)?;
    let priority = match &config.priority {
        Some(range) => sample_priority(range, rng),
        None => 1,
    };
    Ok(CustomerSpec {
        id,
        inter_arrival,
        arrival,
        service,
        priority,
    })
}
