//! apartment-watch CLI
//!
//! One invocation runs one check cycle and exits; schedule it with cron or
//! a systemd timer.

use std::path::PathBuf;

use apartment_watch::{
    config::{MailEnv, StoreEnv, load_dotenv},
    error::Result,
    models::Config,
    pipeline,
    services::{LogNotifier, Notifier, PageExtractor, SmtpNotifier},
    storage::{FileStore, RedisStore, StateStore},
};
use clap::{Parser, Subcommand};

/// apartment-watch - Rental listing change notifier
#[derive(Parser, Debug)]
#[command(
    name = "apartment-watch",
    version,
    about = "Checks rental listing pages for new apartments"
)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one check cycle over every target
    Check {
        /// Log the notification instead of mailing it
        #[arg(long)]
        dry_run: bool,

        /// Keep state in a JSON file instead of Redis
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Print the change report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured targets
    Targets,

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // `validate` checks the file itself, so it never falls back to defaults.
    let config = match cli.command {
        Command::Validate => Config::load(&cli.config),
        _ => Config::load_or_default(&cli.config),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config from {:?}: {}", cli.config, e);
            return Err(e);
        }
    };

    match cli.command {
        Command::Check {
            dry_run,
            state_file,
            json,
        } => {
            load_dotenv();
            config.validate()?;
            let registry = config.registry()?;

            // Resolve every credential before touching any target.
            let store: Box<dyn StateStore> = match &state_file {
                Some(path) => {
                    log::info!("Using state file {}", path.display());
                    Box::new(FileStore::new(path))
                }
                None => Box::new(RedisStore::connect(&StoreEnv::from_env()?).await?),
            };
            let notifier: Box<dyn Notifier> = if dry_run {
                Box::new(LogNotifier)
            } else {
                Box::new(SmtpNotifier::new(&MailEnv::from_env()?)?)
            };
            let extractor = PageExtractor::from_config(&config.crawler)?;

            let outcome = pipeline::run_check(
                &config,
                &registry,
                &extractor,
                store.as_ref(),
                notifier.as_ref(),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            }
        }

        Command::Targets => {
            let registry = config.registry()?;
            log::info!("{} target(s) configured", registry.len());
            for target in registry.iter() {
                println!(
                    "{}\t{}\t{}\tsize={}\t{:?}",
                    target.name, target.url, target.selector, target.size_threshold, target.filter
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} targets)", config.targets.len());
        }
    }

    Ok(())
}
