mod cli;
mod commands;

use std::path::Path;
use std::process::ExitCode;

use paneline_common::{ConfigError, PanelineError};
use paneline_config::schema::PanelineConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::Command;

fn load_config(path: Option<&Path>) -> Result<PanelineConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = paneline_config::load_from_path(path)?;
            paneline_config::validation::validate(&config)?;
            Ok(config)
        }
        None => paneline_config::load_config(),
    }
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(e) => {
            eprintln!("invalid log level {directive:?} ({e}); using info");
            filter.add_directive(LevelFilter::INFO.into())
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(command: Command, config: &PanelineConfig) -> Result<(), PanelineError> {
    match command {
        Command::Demo {
            view,
            payload_bytes,
            updates,
        } => {
            let summary = commands::demo::run(config, &view, payload_bytes, updates).await?;
            println!("{summary}");
        }
        Command::Stage { view, file } => {
            let target = commands::stage::run(config, &view, &file)?;
            println!("{}", target.url);
        }
        Command::Config => {
            println!("{}", paneline_config::config_to_json(config));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Config comes first so its log level can seed the filter; a load
    // failure is reported once logging is up.
    let loaded = load_config(args.config.as_deref());
    let config_level = loaded
        .as_ref()
        .map(|config| config.logging.level)
        .unwrap_or_default();
    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| format!("paneline={}", config_level.as_str()));
    init_logging(&directive);

    tracing::info!("Paneline v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        PanelineConfig::default()
    });

    match run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
