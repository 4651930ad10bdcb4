//! Jail request types
//!
//! Validated values the reconciler consumes: the jail name, the desired
//! state, the disk type used on creation and the ezjail address list.

use crate::error::{Error, Result};
use clap::ValueEnum;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Name of a jail as known to ezjail-admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct JailName(String);

impl JailName {
    /// Validate and wrap a jail name
    ///
    /// The name is handed to the tool as one argument and names a directory
    /// under the jail root, so it must be non-empty, free of whitespace and
    /// free of path separators.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::InvalidParameter {
                param: "name".to_string(),
                message: "jail name must not be empty".to_string(),
            });
        }

        if name.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(Error::InvalidParameter {
                param: "name".to_string(),
                message: format!(
                    "jail name '{}' must not contain whitespace or '/'",
                    name
                ),
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JailName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State the caller wants the jail to end up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    /// Jail exists (started as a re-assert when it already exists)
    #[default]
    Present,
    /// Jail does not exist
    Absent,
    /// Jail exists and is running
    Running,
    /// Jail is stopped (nothing to do if it does not exist)
    Stopped,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
            DesiredState::Running => "running",
            DesiredState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Backing store for a newly created jail (`ezjail-admin create -c`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DiskType {
    /// Plain directory
    #[default]
    Simple,
    /// Image encrypted with gbde
    Bde,
    /// Image encrypted with geli
    Eli,
    /// Dedicated ZFS dataset
    Zfs,
}

impl DiskType {
    /// Argument value understood by `ezjail-admin create -c`
    pub fn as_arg(&self) -> &'static str {
        match self {
            DiskType::Simple => "simple",
            DiskType::Bde => "bde",
            DiskType::Eli => "eli",
            DiskType::Zfs => "zfs",
        }
    }
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Address list for a new jail, in ezjail's `[iface|]addr[/prefix],...` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpSpec(String);

impl IpSpec {
    /// Parse and validate an ezjail address list
    ///
    /// Each comma-separated entry may carry an interface prefix
    /// (`em0|10.0.0.5`) and a prefix length (`10.0.0.5/24`). The input
    /// text is kept so the tool receives exactly what the caller wrote.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidParameter {
            param: "ip_addr".to_string(),
            message,
        };

        if spec.trim().is_empty() {
            return Err(invalid("address list must not be empty".to_string()));
        }

        for entry in spec.split(',') {
            let address = match entry.split_once('|') {
                Some((iface, addr)) => {
                    if iface.is_empty() || iface.chars().any(char::is_whitespace) {
                        return Err(invalid(format!("bad interface in '{}'", entry)));
                    }
                    addr
                }
                None => entry,
            };

            let valid = if address.contains('/') {
                address.parse::<IpNet>().is_ok()
            } else {
                address.parse::<IpAddr>().is_ok()
            };

            if !valid {
                return Err(invalid(format!("'{}' is not an IP address", address)));
            }
        }

        Ok(Self(spec.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
