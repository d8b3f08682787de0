//! CLI command definitions and dispatch for the `waymark` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a
//! verb pattern (`waymark resolve`, `waymark validate`, `waymark serve`).

pub mod resolve;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Deterministic skill routing for request text.
#[derive(Parser)]
#[command(name = "waymark", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory of skill documents (*.md).
    #[arg(short, long, env = "WAYMARK_SKILLS", default_value = "skills", global = true)]
    pub skills: PathBuf,

    /// Router config TOML (default: router.toml in the skills directory).
    #[arg(long, env = "WAYMARK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve request text into a delegation plan.
    Resolve {
        /// The request text to route.
        text: String,

        /// Pre-supplied decision-tree answer, `skill-id/node-id=token`.
        /// Repeatable.
        #[arg(long = "answer", value_name = "KEY=TOKEN")]
        answers: Vec<String>,

        /// Context tag folded into matching as extra request tokens.
        /// Repeatable.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Prompt for decision-tree answers instead of taking defaults.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Validate the skill directory without serving; exits non-zero on
    /// any violation.
    Validate,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
