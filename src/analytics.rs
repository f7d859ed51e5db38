use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Distribution;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QueueModel {
    Mmc,
    Mgc,
    Ggc,
}

impl QueueModel {
    /// Multiplier applied to the Erlang-C queue length: the plain M/M/C
    /// form is the baseline, the general variants scale it by the
    /// arrival/service variability.
    fn variability_factor(&self, ca2: f64, cs2: f64) -> f64 {
        match self {
            QueueModel::Mmc => 1.0,
            QueueModel::Mgc => (1.0 + cs2) / 2.0,
            QueueModel::Ggc => (ca2 + cs2) / 2.0,
        }
    }
}

impl std::fmt::Display for QueueModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueueModel::Mmc => "M/M/C",
            QueueModel::Mgc => "M/G/C",
            QueueModel::Ggc => "G/G/C",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AnalyticReport {
    pub model: QueueModel,
    pub servers: usize,
    pub lambda: f64,
    pub mu: f64,
    pub rho: f64,
    pub ca2: f64,
    pub cs2: f64,
    pub p_zero: f64,
    pub lq: f64,
    pub l: f64,
    pub wq: f64,
    pub w: f64,
    pub idle: f64,
}

/// Steady-state queue metrics for the chosen model. `ca2` is the squared
/// coefficient of variation of the arrival process (1 for Poisson
/// arrivals; derived from the arrival distribution for G/G/C).
pub fn evaluate(
    model: QueueModel,
    num_servers: usize,
    lambda: f64,
    ca2: f64,
    service: &Distribution,
) -> Result<AnalyticReport> {
    if num_servers < 1 {
        return Err(Error::ServersZero);
    }
    if lambda <= 0.0 {
        return Err(Error::InvalidArrivalRate(lambda));
    }
    validate_distribution(service)?;
    let mean_service = service.mean();
    if mean_service <= 0.0 {
        return Err(Error::InvalidServiceMean(mean_service));
    }

    let mu = 1.0 / mean_service;
    let c = num_servers as f64;
    let rho = lambda / (c * mu);
    if rho >= 1.0 {
        return Err(Error::UnstableSystem(rho));
    }
    let cs2 = service.scv();

    let p_zero = erlang_p_zero(num_servers, rho);
    let offered = lambda / mu;
    let lq_mmc =
        p_zero * offered.powi(num_servers as i32) * rho / (factorial(num_servers) * (1.0 - rho).powi(2));
    let lq = lq_mmc * model.variability_factor(ca2, cs2);
    let l = lq + offered;
    let wq = lq / lambda;
    let w = wq + mean_service;

    Ok(AnalyticReport {
        model,
        servers: num_servers,
        lambda,
        mu,
        rho,
        ca2,
        cs2,
        p_zero,
        lq,
        l,
        wq,
        w,
        idle: 1.0 - rho,
    })
}

/// Rate and Ca² of a general inter-arrival distribution (G/G/C input).
pub fn interarrival_params(arrival: &Distribution) -> Result<(f64, f64)> {
    validate_distribution(arrival)?;
    let mean = arrival.mean();
    if mean <= 0.0 {
        return Err(Error::InvalidArrivalRate(mean));
    }
    Ok((1.0 / mean, arrival.scv()))
}

pub(crate) fn validate_distribution(dist: &Distribution) -> Result<()> {
    match *dist {
        Distribution::Exponential { mean } => {
            if mean <= 0.0 {
                return Err(Error::InvalidServiceMean(mean));
            }
        }
        Distribution::Uniform { min, max } => {
            if min >= max {
                return Err(Error::InvalidUniformBounds { min, max });
            }
        }
        Distribution::Normal { std_dev, .. } => {
            if std_dev <= 0.0 {
                return Err(Error::InvalidStdDev(std_dev));
            }
        }
        Distribution::Gamma { alpha, beta } => {
            if alpha <= 0.0 || beta <= 0.0 {
                return Err(Error::InvalidGammaParams { alpha, beta });
            }
        }
    }
    Ok(())
}

/// Erlang-C idle probability,
/// `P0 = 1 / [sum_{n<c} (c rho)^n / n! + (c rho)^c / (c! (1 - rho))]`.
fn erlang_p_zero(c: usize, rho: f64) -> f64 {
    let offered = c as f64 * rho;
    let mut sum = 0.0;
    for n in 0..c {
        sum += offered.powi(n as i32) / factorial(n);
    }
    let tail = offered.powi(c as i32) / (factorial(c) * (1.0 - rho));
    1.0 / (sum + tail)
}

fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn mmc_fixture_matches_hand_computation() {
        // lambda = 2, mean service 0.5 (mu = 2), c = 2 => rho = 0.5,
        // P0 = 1/3, Lq = 1/3, L = 4/3, Wq = 1/6, W = 2/3.
        let report = evaluate(
            QueueModel::Mmc,
            2,
            2.0,
            1.0,
            &Distribution::Exponential { mean: 0.5 },
        )
        .unwrap();
        assert!((report.rho - 0.5).abs() < TOL);
        assert!((report.p_zero - 1.0 / 3.0).abs() < TOL);
        assert!((report.lq - 1.0 / 3.0).abs() < TOL);
        assert!((report.l - 4.0 / 3.0).abs() < TOL);
        assert!((report.wq - 1.0 / 6.0).abs() < TOL);
        assert!((report.w - 2.0 / 3.0).abs() < TOL);
        assert!((report.idle - 0.5).abs() < TOL);
    }

    #[test]
    fn mgc_with_exponential_service_reduces_to_mmc() {
        let service = Distribution::Exponential { mean: 0.5 };
        let mmc = evaluate(QueueModel::Mmc, 2, 2.0, 1.0, &service).unwrap();
        let mgc = evaluate(QueueModel::Mgc, 2, 2.0, 1.0, &service).unwrap();
        assert!((mmc.lq - mgc.lq).abs() < TOL);
        assert!((mmc.wq - mgc.wq).abs() < TOL);
    }

    #[test]
    fn ggc_with_unit_variability_reduces_to_mmc() {
        let service = Distribution::Exponential { mean: 0.5 };
        let mmc = evaluate(QueueModel::Mmc, 3, 4.0, 1.0, &service).unwrap();
        let ggc = evaluate(QueueModel::Ggc, 3, 4.0, 1.0, &service).unwrap();
        assert!((mmc.lq - ggc.lq).abs() < TOL);
    }

    #[test]
    fn gamma_service_scales_the_queue_by_its_scv() {
        // alpha = 2 => Cs^2 = 0.5, factor (1 + 0.5) / 2 = 0.75.
        let gamma = Distribution::Gamma {
            alpha: 2.0,
            beta: 4.0,
        };
        let exponential = Distribution::Exponential { mean: 0.5 };
        let base = evaluate(QueueModel::Mmc, 2, 2.0, 1.0, &exponential).unwrap();
        let general = evaluate(QueueModel::Mgc, 2, 2.0, 1.0, &gamma).unwrap();
        assert!((general.lq - base.lq * 0.75).abs() < TOL);
    }

    #[test]
    fn unstable_system_is_rejected_up_front() {
        let result = evaluate(
            QueueModel::Mmc,
            1,
            5.0,
            1.0,
            &Distribution::Exponential { mean: 0.5 },
        );
        assert!(matches!(result, Err(Error::UnstableSystem(_))));
    }

    #[test]
    fn invalid_uniform_bounds_are_rejected() {
        let result = evaluate(
            QueueModel::Ggc,
            1,
            0.1,
            1.0,
            &Distribution::Uniform { min: 8.0, max: 2.0 },
        );
        assert!(matches!(result, Err(Error::InvalidUniformBounds { .. })));
    }

    #[test]
    fn interarrival_params_from_uniform_distribution() {
        let (rate, ca2) =
            interarrival_params(&Distribution::Uniform { min: 2.0, max: 8.0 }).unwrap();
        assert!((rate - 0.2).abs() < TOL);
        // variance (8-2)^2/12 = 3 over mean^2 = 25.
        assert!((ca2 - 0.12).abs() < TOL);
    }
}
