use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "svcad")]
#[command(about = "Advertise a broker's service catalog to the registry", long_about = None)]
struct Cli {
    /// Treat unused config keys as an error instead of a warning.
    #[arg(long, global = true, default_value_t = false)]
    strict_config: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass against the registry.
    Advertise {
        /// Layered config paths in merge order (base -> env -> overrides)
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Fetch the registry snapshot and print what a pass would write. No writes.
    Plan {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Run passes periodically until interrupted.
    Watch {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Override /advertiser/interval_secs
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Stop after this many passes
        #[arg(long)]
        max_passes: Option<u64>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let strict = cli.strict_config;

    match cli.cmd {
        Commands::Advertise { config_paths } => {
            commands::advertise::advertise_once(config_paths, strict).await?;
        }

        Commands::Plan { config_paths } => {
            commands::plan::plan(config_paths, strict).await?;
        }

        Commands::Watch {
            config_paths,
            interval_secs,
            max_passes,
        } => {
            commands::advertise::watch(config_paths, strict, interval_secs, max_passes).await?;
        }

        Commands::ConfigHash { paths } => {
            let loaded = svcad_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr so `plan` output stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
