//! Tallykeeper - named counters with an optional reference photo
//!
#![doc = "Main entry point for the Tallykeeper CLI."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tallykeeper::cli::{Cli, Commands};
use tallykeeper::commands;
use tallykeeper::commands::sessions;
use tallykeeper::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/tallykeeper.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let store = commands::open_store(&config)?;
    tracing::debug!(
        path = %config.storage.path.display(),
        key = %config.storage.key,
        "Opened session store"
    );

    match cli.command {
        Commands::List { json } => {
            tracing::info!("Listing sessions");
            sessions::list_sessions(store, &config, json).await?;
        }
        Commands::Create { name } => {
            tracing::info!("Creating session");
            sessions::create_session(store, &config, &name).await?;
        }
        Commands::Show { id, json } => {
            tracing::debug!("Showing session {}", id);
            sessions::show_session(store, &config, &id, json).await?;
        }
        Commands::Increment { id } => {
            tracing::debug!("Incrementing session {}", id);
            sessions::increment_session(store, &config, &id).await?;
        }
        Commands::Reset { id, yes } => {
            tracing::info!("Resetting session {}", id);
            sessions::reset_session(store, &config, &id, yes).await?;
        }
        Commands::Rename { id, name } => {
            tracing::info!("Renaming session {}", id);
            sessions::rename_session(store, &config, &id, &name).await?;
        }
        Commands::Image { id, path } => {
            tracing::info!("Attaching image to session {}", id);
            if let Some(p) = &path {
                tracing::debug!("Image source: {}", p.display());
            }
            sessions::attach_image(store, &config, &id, path).await?;
        }
        Commands::Delete { id, yes } => {
            tracing::info!("Deleting session {}", id);
            sessions::delete_session(store, &config, &id, yes).await?;
        }
        Commands::Verify => {
            tracing::info!("Verifying stored sessions");
            commands::verify::run_verify(&store).await?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "tallykeeper=debug"
    } else {
        "tallykeeper=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
