//! ezjail-admin invocation
//!
//! Provides:
//! - Discovery of the `ezjail-admin` executable
//! - A [`CommandRunner`] seam so process execution can be replaced in tests
//! - Typed wrappers for the subcommands the reconciler issues

use crate::error::{Error, Result};
use crate::jail::{DiskType, IpSpec, JailName};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the executable searched for on `PATH`
pub const EZJAIL_ADMIN: &str = "ezjail-admin";

/// Outcome of one external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code (`None` when the process was killed by a signal)
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// Exit code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Diagnostic text as the tool printed it: stdout followed by stderr
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs an external program to completion
pub trait CommandRunner {
    /// Execute `program` with `args`, capturing its output
    ///
    /// Returns an error only when the process could not be spawned; a
    /// non-zero exit is reported through [`ExecutionResult::code`].
    fn run(&self, program: &Path, args: &[&str]) -> Result<ExecutionResult>;
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<ExecutionResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::CommandSpawn {
                command: render(program, args),
                source: e,
            })?;

        Ok(ExecutionResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Locate the ezjail-admin executable
///
/// A configured path wins and must point at an existing file. Otherwise the
/// executable is searched for on `PATH`.
pub fn locate(configured: Option<&Path>) -> Result<PathBuf> {
    locate_in(configured, std::env::var_os("PATH"))
}

/// Locate the ezjail-admin executable using an explicit search path
pub fn locate_in<P: AsRef<OsStr>>(configured: Option<&Path>, search_path: Option<P>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(Error::ToolNotFound(path.display().to_string())),
        // The name has no separator, so the working directory is never consulted
        None => which::which_in(EZJAIL_ADMIN, search_path, "/")
            .map_err(|_| Error::ToolNotFound(EZJAIL_ADMIN.to_string())),
    }
}

/// Typed front end for the ezjail-admin subcommands
pub struct EzjailAdmin<R: CommandRunner> {
    /// Resolved path to the executable
    path: PathBuf,
    runner: R,
}

impl<R: CommandRunner> EzjailAdmin<R> {
    /// Create a front end for an already located executable
    pub fn new(path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            path: path.into(),
            runner,
        }
    }

    fn invoke(&self, args: &[&str]) -> Result<ExecutionResult> {
        tracing::debug!(command = %render(&self.path, args), "running ezjail-admin");
        let result = self.runner.run(&self.path, args)?;
        tracing::debug!(code = ?result.code, "ezjail-admin finished");
        Ok(result)
    }

    /// `ezjail-admin config -r test <name>`
    ///
    /// Read-only. Exit code 0 means the jail exists; everything else,
    /// including a failure to spawn the tool, means it does not.
    pub fn exists(&self, name: &JailName) -> bool {
        match self.invoke(&["config", "-r", "test", name.as_str()]) {
            Ok(result) => result.success(),
            Err(e) => {
                tracing::warn!(jail = %name, error = %e, "existence check failed");
                false
            }
        }
    }

    /// `ezjail-admin create -c <disktype> <name> <ip_addr>`
    pub fn create(&self, name: &JailName, disktype: DiskType, ip: &IpSpec) -> Result<ExecutionResult> {
        self.invoke(&["create", "-c", disktype.as_arg(), name.as_str(), ip.as_str()])
    }

    /// `ezjail-admin start <name>`
    pub fn start(&self, name: &JailName) -> Result<ExecutionResult> {
        self.invoke(&["start", name.as_str()])
    }

    /// `ezjail-admin stop <name>`
    pub fn stop(&self, name: &JailName) -> Result<ExecutionResult> {
        self.invoke(&["stop", name.as_str()])
    }
}

/// Render a command line for logs and error messages
fn render(program: &Path, args: &[&str]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner shared by the tests of this crate

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays queued results and records every invocation
    #[derive(Default)]
    pub struct FakeRunner {
        responses: RefCell<VecDeque<Result<ExecutionResult>>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue an exit code with the given output
        pub fn respond(self, code: i32, stdout: &str, stderr: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(ExecutionResult {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }));
            self
        }

        /// Queue a spawn failure
        pub fn fail_spawn(self) -> Self {
            self.responses.borrow_mut().push_back(Err(Error::CommandSpawn {
                command: EZJAIL_ADMIN.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }));
            self
        }

        /// Arguments of every invocation so far, in order
        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }

        /// Subcommand of every invocation so far (`config`, `create`, ...)
        pub fn subcommands(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|args| args.first().cloned())
                .collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, _program: &Path, args: &[&str]) -> Result<ExecutionResult> {
            self.calls
                .borrow_mut()
                .push(args.iter().map(|a| a.to_string()).collect());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected ezjail-admin call: {:?}", args))
        }
    }

    // Lets a test keep the runner after handing a reference to EzjailAdmin
    impl CommandRunner for &FakeRunner {
        fn run(&self, program: &Path, args: &[&str]) -> Result<ExecutionResult> {
            <FakeRunner as CommandRunner>::run(self, program, args)
        }
    }
}
