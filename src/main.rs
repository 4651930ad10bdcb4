//! ezjail-reconcile - declarative state for FreeBSD jails
//!
//! Converges a single jail managed by ezjail-admin to a desired state and
//! reports the outcome as JSON.

mod cli;
mod error;
mod ezjail;
mod jail;
mod manifest;
mod report;

use cli::{Cli, Commands};
use error::Result;
use ezjail::{EzjailAdmin, SystemRunner};
use jail::{DesiredState, IpSpec, JailName, Reconciler, Request};
use manifest::ReconcileConfig;
use report::Report;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let report = match cli.command {
        Commands::Completion { shell } => {
            Cli::generate_completion(shell);
            return;
        }
        Commands::Apply {
            name,
            state,
            disktype,
            ip_addr,
            check,
        } => {
            let apply = ApplyArgs {
                name,
                state,
                disktype,
                ip_addr,
                check,
            };
            apply.run(cli.config.as_deref())
        }
    };

    if let Err(e) = report.write_to(std::io::stdout().lock()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    std::process::exit(report.exit_code());
}

/// Log to stderr; stdout carries the JSON report
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Arguments of the `apply` command
struct ApplyArgs {
    name: String,
    state: DesiredState,
    disktype: Option<jail::DiskType>,
    ip_addr: Option<String>,
    check: bool,
}

impl ApplyArgs {
    /// Run the reconciliation, turning fatal errors into a failed report
    fn run(self, config_path: Option<&std::path::Path>) -> Report {
        let state = self.state;
        let name = match JailName::new(self.name.clone()) {
            Ok(name) => name,
            Err(e) => return Report::from_error(None, Some(state), &e),
        };

        match self.reconcile(&name, config_path) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(jail = %name, error = %e, "reconciliation aborted");
                Report::from_error(Some(&name), Some(state), &e)
            }
        }
    }

    fn reconcile(&self, name: &JailName, config_path: Option<&std::path::Path>) -> Result<Report> {
        let config = match config_path {
            Some(path) => manifest::load(path)?,
            None => ReconcileConfig::default(),
        };

        let disktype = self
            .disktype
            .or(config.defaults.disktype)
            .unwrap_or_default();

        let mut request = Request::new(name.clone(), self.state).disktype(disktype);
        if let Some(ip) = &self.ip_addr {
            request = request.ip(IpSpec::parse(ip)?);
        }

        let path = ezjail::locate(config.tool.path.as_deref())?;
        tracing::debug!(path = %path.display(), "using ezjail-admin");

        let reconciler = Reconciler::new(EzjailAdmin::new(path, SystemRunner)).check_mode(self.check);
        let result = reconciler.reconcile(&request)?;

        Ok(Report::from_result(name, self.state, &result))
    }
}
