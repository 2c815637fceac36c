//! Sentry-Pushover CLI - runs the dispatcher as a host hook.
//!
//! This is the main binary entry point. See the `sentry_pushover` library
//! for the core functionality.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sentry_pushover::{
    Config, Dispatcher, Event, FileOptionStore, Level, Project, PushoverSettings,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentry-pushover")]
#[command(version, about = "Pushover notifications for new error groups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one event (JSON) through the notification gate
    Notify {
        /// Event JSON file (reads stdin when omitted)
        #[arg(long)]
        event: Option<PathBuf>,
        /// The event's group already existed
        #[arg(long)]
        repeat: bool,
    },
    /// Store Pushover settings for a project
    Configure {
        /// Project slug
        #[arg(long)]
        project: String,
        /// Your user key. See https://pushover.net/
        #[arg(long)]
        userkey: String,
        /// Application API token. See https://pushover.net/apps/
        #[arg(long)]
        apikey: String,
        /// Don't send notifications for events below this level
        #[arg(long, default_value = "ERROR")]
        severity: String,
        /// High-priority notifications, also bypasses quiet hours
        #[arg(long)]
        priority: bool,
    },
    /// Show whether a project is set up
    Status {
        /// Project slug
        #[arg(long)]
        project: String,
    },
    /// Print the effective configuration, optionally updating config.json first
    Config {
        /// Web UI URL prefix used for group links
        #[arg(long)]
        set_url_prefix: Option<String>,
        /// Pushover message-submission endpoint
        #[arg(long)]
        set_api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        set_timeout: Option<u64>,
    },
}

fn main() -> Result<()> {
    // Log to stderr, or to SENTRY_PUSHOVER_LOG_FILE when set
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    logger.format_timestamp_secs();
    if let Ok(path) = std::env::var("SENTRY_PUSHOVER_LOG_FILE") {
        let log_file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create log file at {}", path))?;
        logger.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    logger.init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Notify { event, repeat } => {
            let event = read_event(event.as_deref())?;
            let options = FileOptionStore::open(config.options_file()?)?;
            let dispatcher = Dispatcher::from_config(&config, options)?;

            // Delivery failures are logged, never surfaced as a failing exit status
            let outcome = dispatcher.on_new_event(&event, !repeat);
            println!("{}", outcome);
        }
        Commands::Configure {
            project,
            userkey,
            apikey,
            severity,
            priority,
        } => {
            let settings = PushoverSettings {
                user_key: Some(userkey),
                api_key: Some(apikey),
                severity: Some(severity),
                priority,
            };
            settings.validate()?;

            let mut options = FileOptionStore::open(config.options_file()?)?;
            settings.store(&mut options, &project_ref(&project));
            options.save()?;
            println!("Saved Pushover settings for {} to {}", project, options.path().display());
        }
        Commands::Status { project } => {
            let options = FileOptionStore::open(config.options_file()?)?;
            let settings = PushoverSettings::load(&options, &project_ref(&project));
            let threshold = settings.threshold();
            let threshold_label = Level::from_numeric(threshold)
                .map(|level| format!(" ({})", level))
                .unwrap_or_default();

            println!("Project:   {}", project);
            println!("Set up:    {}", if settings.is_setup() { "yes" } else { "no" });
            println!("Threshold: {}{}", threshold, threshold_label);
            println!("Priority:  {}", settings.priority_flag());
        }
        Commands::Config {
            set_url_prefix,
            set_api_url,
            set_timeout,
        } => {
            let mut config = config;
            if set_url_prefix.is_some() || set_api_url.is_some() || set_timeout.is_some() {
                // Only file values are persisted, never environment overrides
                let mut stored = Config::load_from(&Config::config_path()?)?;
                if let Some(url_prefix) = set_url_prefix {
                    stored.url_prefix = url_prefix;
                }
                if let Some(api_url) = set_api_url {
                    stored.api_url = api_url;
                }
                if let Some(timeout) = set_timeout {
                    stored.timeout_secs = timeout;
                }
                stored.normalize();
                let path = stored.save()?;
                log::info!("Saved configuration to {}", path.display());
                config = Config::load()?;
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Options are keyed by slug, so the numeric id is irrelevant here.
fn project_ref(slug: &str) -> Project {
    Project::new(0, slug)
}

fn read_event(path: Option<&std::path::Path>) -> Result<Event> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid event JSON")
}
