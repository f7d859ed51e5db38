use rand::RngCore;

use crate::error::{Error, Result};
use crate::models::{PriorityRange, Distribution};
use crate::random::uniform01;

/// Stop extending the cumulative table once the remaining mass is below
/// this, or after this many terms regardless.
const POISSON_MASS_EPSILON: f64 = 1e-6;
const POISSON_MAX_TERMS: usize = 5000;
/// Above this rate the pmf is evaluated in log space; `lambda^k / k!`
/// overflows f64 well before the mass converges otherwise.
const POISSON_LOG_SPACE_LAMBDA: f64 = 10.0;

/// Service times are integer units with a strictly positive floor.
const MIN_SERVICE_UNITS: f64 = 1.0;

/// Cumulative Poisson arrival-count table, `cumulative[k] = P(N <= k)`.
#[derive(Clone, Debug)]
pub struct PoissonTable {
    cumulative: Vec<f64>,
}

impl PoissonTable {
    pub fn build(lambda: f64) -> Self {
        let mut cumulative = Vec::new();
        let mut mass = 0.0;
        let mut log_factorial = 0.0;
        let mut k = 0usize;

        while 1.0 - mass > POISSON_MASS_EPSILON && k < POISSON_MAX_TERMS {
            if k >= 2 {
                log_factorial += (k as f64).ln();
            }
            let pmf = if lambda > POISSON_LOG_SPACE_LAMBDA {
                (-lambda + k as f64 * lambda.ln() - log_factorial).exp()
            } else {
                (-lambda).exp() * lambda.powi(k as i32) / factorial(k)
            };
            mass += pmf;
            cumulative.push(mass.min(1.0));
            k += 1;
        }

        // Pin the tail so inversion always lands inside the table.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Self { cumulative }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Invert a uniform draw into the bracketing interval's count,
    /// clamped to a minimum spacing of one unit.
    pub fn invert(&self, u: f64) -> u64 {
        let k = self.cumulative.partition_point(|&mass| mass <= u);
        (k as u64).max(1)
    }

    /// Expected inter-arrival spacing under the min-1 clamp; feeds the
    /// stability check.
    pub fn mean_spacing(&self) -> f64 {
        let mut mean = 0.0;
        let mut previous = 0.0;
        for (k, &mass) in self.cumulative.iter().enumerate() {
            mean += k.max(1) as f64 * (mass - previous);
            previous = mass;
        }
        mean
    }
}

fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Continuous exponential inter-arrival spacing, rounded to 2 decimals.
/// Simultaneous arrivals (a rounded 0) are legal.
pub fn exponential_interarrival(lambda: f64, rng: &mut dyn RngCore) -> f64 {
    let u = uniform01(rng);
    round2(-(1.0 - u).ln() / lambda)
}

/// One service-time sample, rounded to the nearest unit and floored at 1.
pub fn sample_service(dist: &Distribution, rng: &mut dyn RngCore) -> Result<f64> {
    let raw = match *dist {
        Distribution::Exponential { mean } => {
            let u = uniform01(rng);
            -mean * (1.0 - u).ln()
        }
        Distribution::Uniform { min, max } => min + (max - min) * uniform01(rng),
        Distribution::Normal { mean, std_dev } => {
            let u1 = uniform01(rng);
            let u2 = uniform01(rng);
            mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
        }
        Distribution::Gamma { .. } => return Err(Error::GammaNotSimulable),
    };
    Ok(raw.round().max(MIN_SERVICE_UNITS))
}

/// Uniform integer priority in `[min, max]`, lower = more urgent.
pub fn sample_priority(range: &PriorityRange, rng: &mut dyn RngCore) -> i64 {
    let u = uniform01(rng);
    (range.min as f64 + u * (range.max - range.min) as f64).round() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
