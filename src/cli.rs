//! Command-line interface for ezjail-reconcile
//!
//! Uses clap with derive for type-safe CLI parsing

use crate::jail::{DesiredState, DiskType};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// ezjail-reconcile - converge FreeBSD jails managed by ezjail-admin
#[derive(Parser)]
#[command(name = "ezjail-reconcile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Bring a jail to the desired state and print a JSON result
    Apply {
        /// Jail name
        name: String,

        /// Desired state
        #[arg(short, long, value_enum, default_value_t = DesiredState::Present)]
        state: DesiredState,

        /// Disk type for a newly created jail (default: simple)
        #[arg(short, long, value_enum)]
        disktype: Option<DiskType>,

        /// Address list for a newly created jail (e.g. lo1|127.0.1.1,em0|10.0.0.5)
        #[arg(short, long)]
        ip_addr: Option<String>,

        /// Report what would change without running mutating commands
        #[arg(long)]
        check: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "ezjail-reconcile", &mut std::io::stdout());
    }
}
