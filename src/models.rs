use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default = "default_servers")]
    pub num_servers: usize,
    pub arrival: ArrivalConfig,
    pub service: Distribution,
    #[serde(default)]
    pub priority: Option<PriorityRange>,
    pub input: InputMode,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArrivalConfig {
    pub lambda: f64,
    #[serde(default)]
    pub method: ArrivalMethod,
}

/// How Poisson arrivals are turned into inter-arrival spacing: `Table`
/// inverts the discrete cumulative-probability table (integer spacing),
/// `Exponential` samples `-ln(1-u)/lambda` directly (continuous spacing).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ArrivalMethod {
    #[default]
    Table,
    Exponential,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Distribution {
    Exponential { mean: f64 },
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
    Gamma { alpha: f64, beta: f64 },
}

impl Distribution {
    /// Analytic mean, used for the stability check and the closed forms.
    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Exponential { mean } => mean,
            Distribution::Uniform { min, max } => (min + max) / 2.0,
            Distribution::Normal { mean, .. } => mean,
            Distribution::Gamma { alpha, beta } => alpha / beta,
        }
    }

    /// Squared coefficient of variation (variance over mean squared).
    pub fn scv(&self) -> f64 {
        match *self {
            Distribution::Exponential { .. } => 1.0,
            Distribution::Uniform { min, max } => {
                let mean = (min + max) / 2.0;
                let variance = (max - min).powi(2) / 12.0;
                variance / mean.powi(2)
            }
            Distribution::Normal { mean, std_dev } => (std_dev * std_dev) / mean.powi(2),
            Distribution::Gamma { alpha, .. } => 1.0 / alpha,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PriorityRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum InputMode {
    FixedCount {
        customers: usize,
    },
    TimeHorizon {
        #[serde(rename = "horizon-minutes")]
        horizon_minutes: f64,
    },
}

fn default_servers() -> usize {
    1
}
