use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use mcbench_engine::{run_sweep, Config, MonteCarlo};

mod builtin;

#[derive(Parser, Debug)]
#[command(name = "mcbench", about = "Monte Carlo method-comparison harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single configuration to completion.
    Run(RunArgs),
    /// Sweep the Cartesian grid of sequence-valued DGP options.
    Sweep(RunArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// YAML or JSON file exposing the run configuration.
    #[arg(long)]
    config: PathBuf,
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_yaml::from_str(&contents)?;
    Ok(Config::from_value(&value)?)
}

fn real_main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let registry = builtin::registry();
    match cli.command {
        Command::Run(args) => {
            let config = load_config(&args.config)?;
            MonteCarlo::new(&registry, config)?.run()?;
        }
        Command::Sweep(args) => {
            let config = load_config(&args.config)?;
            run_sweep(&registry, &config)?;
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = real_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
