use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paneline: parent/child dialog messaging core.
#[derive(Parser, Debug)]
#[command(name = "paneline", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a full open, handshake, update and close cycle over the
    /// in-process loopback platform.
    Demo {
        /// View name passed to the child.
        #[arg(long, default_value = "demo")]
        view: String,

        /// Approximate size of the launch payload in bytes.
        #[arg(long, default_value_t = 512)]
        payload_bytes: usize,

        /// Number of updates sent after the handshake.
        #[arg(long, default_value_t = 2)]
        updates: u32,
    },

    /// Stage a JSON payload with the configured store and print the launch URL.
    Stage {
        #[arg(long)]
        view: String,

        /// File holding the JSON payload.
        #[arg(long)]
        file: PathBuf,
    },

    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_defaults() {
        let args = Args::try_parse_from(["paneline", "demo"]).unwrap();
        match args.command {
            Command::Demo {
                view,
                payload_bytes,
                updates,
            } => {
                assert_eq!(view, "demo");
                assert_eq!(payload_bytes, 512);
                assert_eq!(updates, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(args.config.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "paneline",
            "stage",
            "--view",
            "diff",
            "--file",
            "p.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(args.command, Command::Stage { ref view, .. } if view == "diff"));
    }

    #[test]
    fn stage_requires_file() {
        assert!(Args::try_parse_from(["paneline", "stage", "--view", "diff"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
