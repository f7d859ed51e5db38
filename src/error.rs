use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("servers must be >= 1")]
    ServersZero,
    #[error("arrival rate must be > 0 (got {0})")]
    InvalidArrivalRate(f64),
    #[error("uniform bounds require min < max (got {min}..{max})")]
    InvalidUniformBounds { min: f64, max: f64 },
    #[error("normal std dev must be > 0 (got {0})")]
    InvalidStdDev(f64),
    #[error("gamma shape and rate must be > 0 (got alpha={alpha}, beta={beta})")]
    InvalidGammaParams { alpha: f64, beta: f64 },
    #[error("gamma service times are analytic-only and cannot be simulated")]
    GammaNotSimulable,
    #[error("service mean must be > 0 (got {0})")]
    InvalidServiceMean(f64),
    #[error("priority range requires 1 <= min <= max (got {min}..{max})")]
    InvalidPriorityRange { min: i64, max: i64 },
    #[error("customers must be greater than 0")]
    CustomersZero,
    #[error("time horizon must be > 0 minutes (got {0})")]
    InvalidHorizon(f64),
    #[error("exactly one of customers/horizon must be given")]
    AmbiguousInputMode,
    #[error("system is unstable: rho = {0:.3} >= 1")]
    UnstableSystem(f64),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("invalid distribution spec '{0}': expected kind:param[:param]")]
    InvalidDistributionSpec(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
