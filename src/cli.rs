use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analytics::{self, AnalyticReport, QueueModel};
use crate::config::load_config;
use crate::error::{Error, Result};
use crate::models::{
    ArrivalConfig, ArrivalMethod, Distribution, InputMode, PriorityRange, SimConfig,
};

#[derive(Parser, Debug)]
#[command(name = "queue-sim", about = "Queueing-theory simulator and calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the discrete-event preemptive-priority simulation
    Simulate(SimulateArgs),
    /// Evaluate the closed-form queue metrics
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, help = "Config file (.toml or .json); overrides the other flags")]
    pub config: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    pub servers: usize,
    #[arg(long, help = "Poisson arrival rate")]
    pub lambda: Option<f64>,
    #[arg(long, value_enum, default_value = "table")]
    pub arrival_method: ArrivalMethodArg,
    #[arg(
        long,
        help = "Service distribution: exponential:MEAN, uniform:MIN:MAX or normal:MEAN:SD"
    )]
    pub service: Option<String>,
    #[arg(long, help = "Priority range MIN:MAX; omit for a single class")]
    pub priority: Option<String>,
    #[arg(long, help = "Generate exactly this many customers")]
    pub customers: Option<usize>,
    #[arg(long, help = "Generate arrivals up to this horizon in minutes")]
    pub horizon: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value = "human")]
    pub format: FormatArg,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(long, value_enum)]
    pub model: ModelArg,
    #[arg(long, default_value_t = 1)]
    pub servers: usize,
    #[arg(long, help = "Poisson arrival rate (mmc/mgc)")]
    pub lambda: Option<f64>,
    #[arg(long, help = "Inter-arrival distribution for ggc, e.g. uniform:2:8")]
    pub arrival: Option<String>,
    #[arg(
        long,
        help = "Service distribution: exponential:MEAN, uniform:MIN:MAX, normal:MEAN:SD or gamma:ALPHA:BETA"
    )]
    pub service: String,
    #[arg(long, value_enum, default_value = "human")]
    pub format: ReportFormatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ArrivalMethodArg {
    Table,
    Exponential,
}

impl From<ArrivalMethodArg> for ArrivalMethod {
    fn from(value: ArrivalMethodArg) -> Self {
        match value {
            ArrivalMethodArg::Table => ArrivalMethod::Table,
            ArrivalMethodArg::Exponential => ArrivalMethod::Exponential,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModelArg {
    Mmc,
    Mgc,
    Ggc,
}

impl From<ModelArg> for QueueModel {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::Mmc => QueueModel::Mmc,
            ModelArg::Mgc => QueueModel::Mgc,
            ModelArg::Ggc => QueueModel::Ggc,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ReportFormatArg {
    Human,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

/// Assembles the simulation config: a config file wins outright,
/// otherwise the flags must spell out a complete setup.
pub fn build_sim_config(args: &SimulateArgs) -> Result<SimConfig> {
    if let Some(path) = &args.config {
        return load_config(path);
    }

    let lambda = args
        .lambda
        .ok_or_else(|| Error::Cli("--lambda is required without --config".to_string()))?;
    let service = args
        .service
        .as_deref()
        .ok_or_else(|| Error::Cli("--service is required without --config".to_string()))?;
    let input = match (args.customers, args.horizon) {
        (Some(customers), None) => InputMode::FixedCount { customers },
        (None, Some(horizon_minutes)) => InputMode::TimeHorizon { horizon_minutes },
        _ => return Err(Error::AmbiguousInputMode),
    };

    Ok(SimConfig {
        num_servers: args.servers,
        arrival: ArrivalConfig {
            lambda,
            method: args.arrival_method.into(),
        },
        service: parse_distribution(service)?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        input,
        seed: args.seed,
    })
}

pub fn evaluate_analysis(args: &AnalyzeArgs) -> Result<AnalyticReport> {
    let model: QueueModel = args.model.into();
    let service = parse_distribution(&args.service)?;
    let (lambda, ca2) = match model {
        QueueModel::Mmc | QueueModel::Mgc => {
            let lambda = args
                .lambda
                .ok_or_else(|| Error::Cli(format!("--lambda is required for {model}")))?;
            (lambda, 1.0)
        }
        QueueModel::Ggc => {
            let spec = args
                .arrival
                .as_deref()
                .ok_or_else(|| Error::Cli("--arrival is required for G/G/C".to_string()))?;
            analytics::interarrival_params(&parse_distribution(spec)?)?
        }
    };
    analytics::evaluate(model, args.servers, lambda, ca2, &service)
}

pub fn parse_distribution(spec: &str) -> Result<Distribution> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let invalid = || Error::InvalidDistributionSpec(spec.to_string());
    let param = |idx: usize| -> Result<f64> {
        parts
            .get(idx)
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(invalid)
    };

    match parts.first().copied() {
        Some("exponential") if parts.len() == 2 => Ok(Distribution::Exponential { mean: param(1)? }),
        Some("uniform") if parts.len() == 3 => Ok(Distribution::Uniform {
            min: param(1)?,
            max: param(2)?,
        }),
        Some("normal") if parts.len() == 3 => Ok(Distribution::Normal {
            mean: param(1)?,
            std_dev: param(2)?,
        }),
        Some("gamma") if parts.len() == 3 => Ok(Distribution::Gamma {
            alpha: param(1)?,
            beta: param(2)?,
        }),
        _ => Err(invalid()),
    }
}

pub fn parse_priority(spec: &str) -> Result<PriorityRange> {
    let invalid = || Error::Cli(format!("invalid priority range '{spec}': expected MIN:MAX"));
    let (min, max) = spec.split_once(':').ok_or_else(invalid)?;
    Ok(PriorityRange {
        min: min.trim().parse().map_err(|_| invalid())?,
        max: max.trim().parse().map_err(|_| invalid())?,
    })
}
