//! Jail management module
//!
//! This module provides:
//! - Validated request types (name, desired state, disk type, addresses)
//! - The reconciliation decision and its execution against ezjail-admin

pub mod reconcile;
pub mod types;

// Re-exports
pub use reconcile::{ReconciliationResult, Reconciler, Request};
pub use types::{DesiredState, DiskType, IpSpec, JailName};
