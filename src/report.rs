//! Result document written to stdout
//!
//! One JSON object per invocation. The presence of `failed` tells the caller
//! to treat the run as an error; `changed` alone never does.

use crate::error::{Error, Result};
use crate::jail::{DesiredState, JailName, ReconciliationResult};
use serde::Serialize;
use std::io::Write;

/// Structured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<JailName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<DesiredState>,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Report {
    /// Report for a completed reconciliation
    pub fn from_result(name: &JailName, state: DesiredState, result: &ReconciliationResult) -> Self {
        Self {
            name: Some(name.clone()),
            state: Some(state),
            changed: result.changed(),
            failed: result.failed().then_some(true),
            msg: result.message(),
        }
    }

    /// Report for a run aborted before a result existed
    pub fn from_error(name: Option<&JailName>, state: Option<DesiredState>, error: &Error) -> Self {
        Self {
            name: name.cloned(),
            state,
            changed: false,
            failed: Some(true),
            msg: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    /// Process exit status matching the report
    pub fn exit_code(&self) -> i32 {
        if self.is_failed() { 1 } else { 0 }
    }

    /// Write the report as a single JSON line
    pub fn write_to(&self, mut out: impl Write) -> Result<()> {
        serde_json::to_writer(&mut out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jail::reconcile::Failure;
    use serde_json::{Value, json};

    fn www() -> JailName {
        JailName::new("www").unwrap()
    }

    fn to_value(report: &Report) -> Value {
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_success_omits_failure_keys() {
        let result = ReconciliationResult::applied();
        let report = Report::from_result(&www(), DesiredState::Running, &result);

        assert_eq!(
            to_value(&report),
            json!({"name": "www", "state": "running", "changed": true})
        );
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_unchanged_is_success() {
        let report = Report::from_result(&www(), DesiredState::Stopped, &ReconciliationResult::unchanged());

        assert_eq!(
            to_value(&report),
            json!({"name": "www", "state": "stopped", "changed": false})
        );
        assert!(!report.is_failed());
    }

    #[test]
    fn test_failure_sets_failed_and_msg() {
        let result = ReconciliationResult::new(true, Some(Failure::Start("no such device".into())));
        let report = Report::from_result(&www(), DesiredState::Running, &result);

        assert_eq!(
            to_value(&report),
            json!({
                "name": "www",
                "state": "running",
                "changed": true,
                "failed": true,
                "msg": "Could not start jail. no such device"
            })
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_fatal_error_report() {
        let err = Error::ToolNotFound("ezjail-admin".to_string());
        let report = Report::from_error(None, None, &err);

        assert_eq!(
            to_value(&report),
            json!({
                "changed": false,
                "failed": true,
                "msg": "Failed to find required executable 'ezjail-admin'"
            })
        );
        assert_eq!(report.exit_code(), 1);
    }
}
