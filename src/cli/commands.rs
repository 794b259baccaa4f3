use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `echo-gate` - approve, then run, what your local assistant proposes.
#[derive(Parser, Debug)]
#[command(name = "echo-gate")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(
    about = "Review and approve assistant-proposed commands before they touch your machine.",
    long_about = None
)]
pub struct Cli {
    /// Config file to use (default: ~/.echo-gate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session: propose, review and approve actions
    Chat,

    /// Build a plan from text and print it
    Plan {
        /// What you want done
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,

        /// Approve and execute the plan right away
        #[arg(short, long)]
        yes: bool,
    },

    /// Permit commands starting with PREFIX
    Allow {
        /// Command prefix, matched with a plain `starts_with`
        prefix: String,
    },

    /// Check whether a command would be allowed
    Check {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List allowed command prefixes
    Allowlist,

    /// Show the most recent executed actions
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}
