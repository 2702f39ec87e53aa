use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stewart_ik::config::{CONFIG_ENV, PlatformConfig};
use stewart_ik::messages::{ActuationReport, PoseCommand, RuntimeHealth};
use stewart_ik::platform::GeometryModel;
use stewart_ik::runtime;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Servo angles for a six-leg rotary platform
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Rig description (JSON). Falls back to $STEWART_CONFIG, then the built-in rig.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a single pose and print the actuation report
    Solve {
        #[arg(long, allow_hyphen_values = true)]
        pitch: f64,
        #[arg(long, allow_hyphen_values = true)]
        roll: f64,
        /// Interpret pitch and roll as degrees
        #[arg(long)]
        degrees: bool,
    },
    /// Read pose commands from stdin, write reports to stdout
    Run,
    /// Print the precomputed joint positions
    Geometry,
}

fn load_config(path: Option<PathBuf>) -> Result<PlatformConfig, BoxError> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            info!("Loading rig description from {}", path.display());
            Ok(PlatformConfig::load(&path)?)
        }
        None => Ok(PlatformConfig::default()),
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (RUST_LOG=debug for per-leg output); stdout carries the reports
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32, BoxError> {
    let config = load_config(cli.config)?;
    let model = GeometryModel::new(&config)?;

    match cli.command {
        Command::Solve {
            pitch,
            roll,
            degrees,
        } => {
            let cmd = PoseCommand {
                pitch,
                roll,
                degrees,
            };
            let pose = cmd.pose();
            let report = if pose.is_finite() {
                ActuationReport::from_result(&model.solve_pose(&pose))
            } else {
                ActuationReport::bad_command(format!("non-finite pose {:?}", pose))
            };
            println!("{}", serde_json::to_string(&report)?);
            Ok(if report.health == RuntimeHealth::Ok { 0 } else { 2 })
        }
        Command::Run => {
            runtime::run_stdio(model).await?;
            Ok(0)
        }
        Command::Geometry => {
            let legs: Vec<_> = model
                .legs()
                .iter()
                .enumerate()
                .map(|(i, leg)| {
                    json!({
                        "leg": i,
                        "base": leg.base,
                        "platform": leg.platform,
                        "motor_orientation": leg.motor_orientation,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "constants": model.constants(),
                    "translation": model.translation(),
                    "legs": legs,
                }))?
            );
            Ok(0)
        }
    }
}
