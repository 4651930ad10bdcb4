//! Configuration file parsing for ezjail-reconcile
//!
//! Parses an optional TOML file using serde. Every key is optional; an
//! empty file yields the built-in defaults.

use crate::error::{Error, Result};
use crate::jail::DiskType;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from a file
pub fn load(path: &Path) -> Result<ReconcileConfig> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: ReconcileConfig = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Location of the external tool
    #[serde(default)]
    pub tool: ToolConfig,

    /// Defaults applied when the command line leaves a value out
    #[serde(default)]
    pub defaults: Defaults,
}

impl ReconcileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.tool.path
            && !path.is_absolute()
        {
            return Err(Error::ConfigValidation(format!(
                "tool.path must be absolute, got '{}'",
                path.display()
            )));
        }

        Ok(())
    }
}

/// `[tool]` section
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Explicit path to ezjail-admin (searched on PATH when unset)
    pub path: Option<PathBuf>,
}

/// `[defaults]` section
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Disk type for new jails
    pub disktype: Option<DiskType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config() {
        let config: ReconcileConfig = toml::from_str("").unwrap();
        assert!(config.tool.path.is_none());
        assert!(config.defaults.disktype.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[tool]
path = "/usr/local/bin/ezjail-admin"

[defaults]
disktype = "zfs"
"#;

        let config: ReconcileConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.tool.path.as_deref(),
            Some(Path::new("/usr/local/bin/ezjail-admin"))
        );
        assert_eq!(config.defaults.disktype, Some(DiskType::Zfs));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
[defaults]
disktype = "simple"
flavour = "default"
"#;
        assert!(toml::from_str::<ReconcileConfig>(toml).is_err());
    }

    #[test]
    fn test_unknown_disktype_rejected() {
        let toml = r#"
[defaults]
disktype = "ufs"
"#;
        assert!(toml::from_str::<ReconcileConfig>(toml).is_err());
    }

    #[test]
    fn test_relative_tool_path_rejected() {
        let toml = r#"
[tool]
path = "bin/ezjail-admin"
"#;
        let config: ReconcileConfig = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(Error::ConfigValidation(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ndisktype = \"eli\"").unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.defaults.disktype, Some(DiskType::Eli));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/ezjail-reconcile.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tool").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
