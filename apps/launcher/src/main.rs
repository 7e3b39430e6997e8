use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, HttpSimulationApi, LauncherController, Settings};
use shared::{
    domain::{SessionId, SessionStatus},
    orientation::{degrees_to_radians, Orientation, Quaternion, Rpy},
};
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

#[derive(Parser, Debug)]
#[command(name = "sim-launcher", about = "Configure, launch and monitor robot simulations")]
struct Cli {
    /// Settings file (defaults to ./launcher.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the simulation API base url.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Print session status as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the service health endpoint.
    Health,
    /// List object and environment types offered by the service.
    Catalog,
    /// Show running sessions, or a single session.
    Status { session_id: Option<String> },
    /// Stop one session.
    Stop { session_id: String },
    /// Stop every session.
    StopAll,
    /// Convert between roll-pitch-yaw and quaternion.
    Convert {
        #[command(subcommand)]
        input: ConvertInput,
    },
    /// Interactive launcher session with background status polling.
    Shell,
}

#[derive(Subcommand, Debug)]
enum ConvertInput {
    Rpy {
        #[arg(allow_hyphen_values = true)]
        roll: f64,
        #[arg(allow_hyphen_values = true)]
        pitch: f64,
        #[arg(allow_hyphen_values = true)]
        yaw: f64,
        /// Angles are given in degrees.
        #[arg(long)]
        degrees: bool,
    },
    Quat {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        #[arg(allow_hyphen_values = true)]
        z: f64,
        #[arg(allow_hyphen_values = true)]
        w: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Convert { input } => convert(input)?,
        Command::Health => {
            let (controller, _) = connect(&cli)?;
            let health = controller.check_health().await;
            println!("API: {health}");
        }
        Command::Catalog => {
            let (controller, _) = connect(&cli)?;
            controller
                .refresh_catalog()
                .await
                .context("failed to fetch catalogs")?;
            let state = controller.snapshot().await;
            print!("{}", render::catalog(&state));
        }
        Command::Status { session_id: None } => {
            let (controller, _) = connect(&cli)?;
            controller
                .poll_sessions()
                .await
                .context("failed to fetch session status")?;
            let state = controller.snapshot().await;
            print_sessions(state.sessions(), cli.json)?;
        }
        Command::Status {
            session_id: Some(id),
        } => {
            let (controller, _) = connect(&cli)?;
            let sessions = controller.session_status(&SessionId::new(id.as_str())).await?;
            print_sessions(&sessions, cli.json)?;
        }
        Command::Stop { session_id } => {
            let (controller, _) = connect(&cli)?;
            controller.stop_session(&SessionId::new(session_id.as_str())).await?;
            print_notice(&controller).await;
        }
        Command::StopAll => {
            let (controller, _) = connect(&cli)?;
            controller.stop_all().await?;
            print_notice(&controller).await;
        }
        Command::Shell => {
            let (controller, settings) = connect(&cli)?;
            shell::run(controller, settings.poll_interval).await?;
        }
    }

    Ok(())
}

fn connect(cli: &Cli) -> Result<(Arc<LauncherController>, Settings)> {
    let settings = build_settings(cli)?;
    tracing::debug!(api = %settings.api_root(), "loaded settings");
    let api = HttpSimulationApi::new(&settings).context("failed to build HTTP client")?;
    let controller = LauncherController::new(Arc::new(api), settings.catalog.clone());
    Ok((controller, settings))
}

fn build_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(url) = &cli.api_url {
        settings
            .set_api_base_url(url)
            .context("invalid --api-url")?;
    }
    Ok(settings)
}

fn print_sessions(sessions: &BTreeMap<SessionId, SessionStatus>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(sessions)?);
    } else {
        print!("{}", render::sessions(sessions, None));
    }
    Ok(())
}

async fn print_notice(controller: &LauncherController) {
    if let Some(notice) = controller.snapshot().await.notice() {
        println!("{}", render::notice(notice));
    }
}

fn convert(input: &ConvertInput) -> Result<()> {
    let orientation = match *input {
        ConvertInput::Rpy {
            roll,
            pitch,
            yaw,
            degrees,
        } => {
            let rpy = if degrees {
                Rpy::new(
                    degrees_to_radians(roll),
                    degrees_to_radians(pitch),
                    degrees_to_radians(yaw),
                )
            } else {
                Rpy::new(roll, pitch, yaw)
            };
            Orientation::from_rpy(rpy)?
        }
        ConvertInput::Quat { x, y, z, w } => {
            let raw = Quaternion::new(x, y, z, w);
            if !raw.is_finite() {
                bail!("quaternion components must be finite");
            }
            Orientation::from_quaternion(raw)?
        }
    };
    print!("{}", render::orientation(&orientation));
    Ok(())
}
