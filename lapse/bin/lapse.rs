//! Run messages through the forced-expiration send chain
//!
//! - `lapse check <MESSAGES>` sends each message described in a RON file
//!   through the chain and prints what happened to it
//! - `lapse config` prints the effective policy

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lapse::{Lapse, MessageSpec};
use lapse_common::logging;

#[derive(Parser, Debug)]
#[command(name = "lapse")]
#[command(about = "Force expirations on transient broker destinations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (RON); overrides `LAPSE_CONFIG`
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a batch of messages through the chain and report each decision
    Check {
        /// RON file holding a list of messages
        messages: PathBuf,
    },
    /// Print the effective policy
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let lapse = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { messages } => {
            let content = tokio::fs::read_to_string(&messages).await.map_err(|e| {
                anyhow::anyhow!("Failed to read messages from {}: {e}", messages.display())
            })?;
            let specs: Vec<MessageSpec> = ron::from_str(&content)?;

            let host = lapse.build()?;
            let reports = host.check(specs).await;
            for report in &reports {
                println!("{report}");
            }

            let stamped = reports.iter().filter(|report| report.stamped()).count();
            println!(
                "{stamped} of {} stamped, {} stored",
                reports.len(),
                host.store().len()
            );
        }
        Commands::Config => {
            let policy = ron::ser::to_string_pretty(&lapse.policy, ron::ser::PrettyConfig::default())?;
            println!("{policy}");
            println!(
                "zero expiration override: {:?}",
                lapse.policy.zero_expiration_override()
            );
            match lapse.policy.ttl_ceiling() {
                Some(ceiling) => println!("ttl ceiling: {ceiling:?} (not enforced)"),
                None => println!("ttl ceiling: none"),
            }
            println!("regions: {}", lapse.regions.len());
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<Lapse> {
    let Some(config_path) = find_config_file(explicit)? else {
        return Ok(Lapse::default());
    };

    let config_content = std::fs::read_to_string(&config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config from {}: {}",
            config_path.display(),
            e
        )
    })?;

    Ok(ron::from_str(&config_content)?)
}

/// Find the configuration file using the following precedence:
/// 1. `--config`
/// 2. `LAPSE_CONFIG` environment variable
/// 3. ./lapse.config.ron (current working directory)
/// 4. /etc/lapse/lapse.config.ron (system-wide config)
///
/// With none of these present the built-in defaults are used.
fn find_config_file(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("LAPSE_CONFIG").ok().map(PathBuf::from));

    if let Some(path) = requested {
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!("Configuration file does not exist: {}", path.display());
    }

    let default_paths = [
        PathBuf::from("./lapse.config.ron"),
        PathBuf::from("/etc/lapse/lapse.config.ron"),
    ];

    Ok(default_paths.into_iter().find(|path| path.exists()))
}
