//! Idempotent state reconciliation
//!
//! Maps (observed existence, desired state) to at most one chain of
//! ezjail-admin commands and reports whether anything changed. The decision
//! itself is the pure [`plan`] function; [`Reconciler`] executes it.

use crate::error::{Error, Result};
use crate::ezjail::{CommandRunner, ExecutionResult, EzjailAdmin};
use std::fmt;

use super::types::{DesiredState, DiskType, IpSpec, JailName};

/// What the caller asked for
#[derive(Debug, Clone)]
pub struct Request {
    pub name: JailName,
    pub state: DesiredState,
    /// Only used when the jail has to be created
    pub disktype: DiskType,
    /// Required when the jail has to be created
    pub ip: Option<IpSpec>,
}

impl Request {
    pub fn new(name: JailName, state: DesiredState) -> Self {
        Self {
            name,
            state,
            disktype: DiskType::default(),
            ip: None,
        }
    }

    pub fn disktype(mut self, disktype: DiskType) -> Self {
        self.disktype = disktype;
        self
    }

    pub fn ip(mut self, ip: IpSpec) -> Self {
        self.ip = Some(ip);
        self
    }
}

/// Corrective action chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create the jail, then start it when `start` is set
    Create { start: bool },
    /// Start the jail (re-issued even when it is already running)
    Start,
    /// Stop the jail
    Stop,
    /// Remove the jail
    Destroy,
    /// Already converged
    Nothing,
}

/// Decide the corrective action
pub fn plan(state: DesiredState, exists: bool) -> Action {
    match (state, exists) {
        (DesiredState::Present, false) => Action::Create { start: false },
        (DesiredState::Running, false) => Action::Create { start: true },
        (DesiredState::Present | DesiredState::Running, true) => Action::Start,
        (DesiredState::Absent, true) => Action::Destroy,
        (DesiredState::Stopped, true) => Action::Stop,
        (DesiredState::Absent | DesiredState::Stopped, false) => Action::Nothing,
    }
}

/// Jail operations that exist in the model but are not available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Destroy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Destroy => write!(f, "destroy"),
        }
    }
}

/// Why a reconciliation failed
///
/// Runtime failures carry the tool's stdout followed by its stderr.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("Could not create jail. {0}")]
    Create(String),

    #[error("Could not start jail. {0}")]
    Start(String),

    #[error("Could not stop jail. {0}")]
    Stop(String),

    #[error("Operation '{0}' is not supported")]
    Unsupported(Operation),
}

/// Result of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    changed: bool,
    failure: Option<Failure>,
}

impl ReconciliationResult {
    pub fn new(changed: bool, failure: Option<Failure>) -> Self {
        Self { changed, failure }
    }

    /// Nothing was done and nothing failed
    pub fn unchanged() -> Self {
        Self::new(false, None)
    }

    /// A mutating command succeeded (or would have, in check mode)
    pub fn applied() -> Self {
        Self::new(true, None)
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn message(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }
}

/// Converges one jail to its desired state
pub struct Reconciler<R: CommandRunner> {
    admin: EzjailAdmin<R>,
    /// Skip mutating commands and report them as changes
    check_mode: bool,
}

impl<R: CommandRunner> Reconciler<R> {
    pub fn new(admin: EzjailAdmin<R>) -> Self {
        Self {
            admin,
            check_mode: false,
        }
    }

    /// Enable check mode (dry run)
    pub fn check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Whether the jail is known to ezjail
    pub fn exists(&self, name: &JailName) -> bool {
        self.admin.exists(name)
    }

    /// Bring the jail to the requested state
    ///
    /// The existence check always runs, also in check mode. Errors are
    /// reserved for problems that stop the run before a result exists: a
    /// missing address on a real create or a tool that cannot be executed.
    /// Check mode never reads the address.
    pub fn reconcile(&self, request: &Request) -> Result<ReconciliationResult> {
        let exists = self.exists(&request.name);
        let action = plan(request.state, exists);

        tracing::debug!(
            jail = %request.name,
            state = %request.state,
            exists,
            ?action,
            "planned reconciliation"
        );

        let result = match action {
            Action::Create { .. } if self.check_mode => ReconciliationResult::applied(),
            Action::Create { start } => {
                let ip = request.ip.as_ref().ok_or_else(|| Error::MissingParameter {
                    param: "ip_addr".to_string(),
                    jail: request.name.to_string(),
                })?;
                self.create(&request.name, request.disktype, ip, start)?
            }
            Action::Start => self.start(&request.name)?,
            Action::Stop => self.stop(&request.name)?,
            Action::Destroy => self.destroy(&request.name),
            Action::Nothing => ReconciliationResult::unchanged(),
        };

        match result.failure() {
            Some(failure) => tracing::warn!(jail = %request.name, changed = result.changed(), "{}", failure),
            None => tracing::info!(jail = %request.name, changed = result.changed(), "reconciled"),
        }

        Ok(result)
    }

    /// Create the jail and optionally start it
    ///
    /// A failed create stops the chain. A failed start after a successful
    /// create is reported as changed and failed; the new jail is kept.
    pub fn create(
        &self,
        name: &JailName,
        disktype: DiskType,
        ip: &IpSpec,
        then_start: bool,
    ) -> Result<ReconciliationResult> {
        if self.check_mode {
            return Ok(ReconciliationResult::applied());
        }

        let created = self.admin.create(name, disktype, ip)?;
        if !created.success() {
            return Ok(ReconciliationResult::new(
                false,
                Some(Failure::Create(created.combined_output())),
            ));
        }

        if !then_start {
            return Ok(ReconciliationResult::applied());
        }

        let started = self.admin.start(name)?;
        Ok(ReconciliationResult::new(true, failure_from(&started, Failure::Start)))
    }

    /// Start the jail
    pub fn start(&self, name: &JailName) -> Result<ReconciliationResult> {
        if self.check_mode {
            return Ok(ReconciliationResult::applied());
        }

        let result = self.admin.start(name)?;
        Ok(outcome(&result, Failure::Start))
    }

    /// Stop the jail
    pub fn stop(&self, name: &JailName) -> Result<ReconciliationResult> {
        if self.check_mode {
            return Ok(ReconciliationResult::applied());
        }

        let result = self.admin.stop(name)?;
        Ok(outcome(&result, Failure::Stop))
    }

    /// Remove the jail
    ///
    /// Not implemented: always reports [`Failure::Unsupported`], in check
    /// mode as well.
    pub fn destroy(&self, name: &JailName) -> ReconciliationResult {
        tracing::debug!(jail = %name, "destroy requested");
        ReconciliationResult::new(false, Some(Failure::Unsupported(Operation::Destroy)))
    }
}

fn failure_from(result: &ExecutionResult, kind: fn(String) -> Failure) -> Option<Failure> {
    if result.success() {
        None
    } else {
        Some(kind(result.combined_output()))
    }
}

/// Result of a single mutating command
fn outcome(result: &ExecutionResult, kind: fn(String) -> Failure) -> ReconciliationResult {
    let failure = failure_from(result, kind);
    ReconciliationResult::new(failure.is_none(), failure)
}
