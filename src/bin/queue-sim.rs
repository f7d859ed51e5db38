use queue_sim::cli::{self, Command};
use queue_sim::engine;
use queue_sim::error::Result;
use queue_sim::output::{self, formatter_for};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::parse_args()?;
    match cli.command {
        Command::Simulate(args) => {
            let config = cli::build_sim_config(&args)?;
            let result = engine::run_simulation(&config)?;
            let formatter = formatter_for(&args.format);
            print!("{}", formatter.write(&result));
        }
        Command::Analyze(args) => {
            let report = cli::evaluate_analysis(&args)?;
            print!("{}", output::format_report(&report, &args.format));
        }
    }
    Ok(())
}
