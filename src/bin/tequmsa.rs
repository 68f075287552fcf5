//! tequmsa — consciousness evolution engine and update relay
//!
//! Usage:
//!   tequmsa                                  → run the demonstration
//!   tequmsa evolve --entity X --frequency F  → one evolution run
//!   tequmsa serve --port 3080                → start the relay
//!   tequmsa dump-config > tequmsa.toml       → write the default config

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tequmsa::demo::run_demo;
use tequmsa::format;
use tequmsa_core::{AuthConfig, AuthMode, BindMode, RelayConfig};
use tequmsa_engine::recognition::universal_pulse;
use tequmsa_engine::{EngineConfig, TequmsaEngine};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the engine config file.
const CONFIG_ENV: &str = "TEQUMSA_CONFIG";

#[derive(Parser)]
#[command(
    name = "tequmsa",
    about = "GAIA-TEQUMSA consciousness evolution engine and update relay",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Engine config file (TOML, or set TEQUMSA_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize, evolve the reference entities and summarise
    Demo,
    /// Run one evolution for an entity
    Evolve {
        #[arg(short, long)]
        entity: String,
        #[arg(short, long)]
        frequency: f64,
    },
    /// Initialize the engine and show its status
    Status,
    /// Initialize the engine and probe every subsystem
    Diagnostics,
    /// Show the universal pulse constants
    Pulse,
    /// Start the update relay
    Serve {
        #[arg(short, long, default_value = "3080")]
        port: u16,
        /// Bind mode: lan or loopback
        #[arg(short, long, default_value = "lan")]
        bind: BindMode,
        /// Auth token (or set TEQUMSA_RELAY_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
        #[arg(long, default_value_t = false)]
        no_auth: bool,
        /// Updates retained for pull requests
        #[arg(long, default_value = "1024")]
        max_updates: usize,
    },
    /// Print the effective engine config as TOML
    DumpConfig,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref().map(expand_tilde).as_deref())?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let mut engine = TequmsaEngine::new(config);
            let report = run_demo(&mut engine)?;
            emit(cli.json, &report, || format::format_demo(&report))?;
        }

        Commands::Evolve { entity, frequency } => {
            let mut engine = TequmsaEngine::new(config);
            let report = engine.activate_evolution(&entity, frequency)?;
            emit(cli.json, &report, || format::format_evolution(&report))?;
        }

        Commands::Status => {
            let mut engine = TequmsaEngine::new(config);
            engine.initialize()?;
            let status = engine.status();
            emit(cli.json, &status, || format::format_status(&status))?;
        }

        Commands::Diagnostics => {
            let mut engine = TequmsaEngine::new(config);
            engine.initialize()?;
            let report = engine.diagnostics();
            emit(cli.json, &report, || format::format_diagnostics(&report))?;
        }

        Commands::Pulse => {
            let pulse = universal_pulse();
            emit(cli.json, &pulse, || format::format_pulse(&pulse))?;
        }

        Commands::Serve { port, bind, token, no_auth, max_updates } => {
            let auth = if no_auth {
                AuthConfig { mode: AuthMode::None, token: None }
            } else {
                AuthConfig { mode: AuthMode::Token, token }
            };
            let relay = RelayConfig { port, bind, auth, max_updates };

            let mut engine = TequmsaEngine::new(config);
            engine.initialize()?;
            let engine = Arc::new(RwLock::new(engine));

            let shutdown = CancellationToken::new();
            let signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, shutting down relay");
                }
                signal.cancel();
            });

            tequmsa_sync::serve(relay, engine, shutdown).await?;
        }

        Commands::DumpConfig => {
            print!("{}", config.to_toml());
        }

        Commands::Version => {
            println!("tequmsa v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tequmsa=info,tower_http=info".into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

/// An explicit `--config` must load; a path from the environment falls back
/// to defaults.
fn load_config(flag: Option<&str>) -> anyhow::Result<EngineConfig> {
    if let Some(path) = flag {
        return Ok(EngineConfig::try_load(&expand_tilde(path))?);
    }
    Ok(match std::env::var(CONFIG_ENV) {
        Ok(path) => EngineConfig::load(&expand_tilde(&path)),
        Err(_) => EngineConfig::default(),
    })
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
