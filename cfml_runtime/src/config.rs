//! Engine configuration
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! document yields `EngineConfig::default()`.
//!
//! ```toml
//! name = "web"
//! null_support = true
//! division_precision = 20
//! dot_notation_upper_case = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::decimal::DEFAULT_DIVISION_PRECISION;
use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Label used in log output
    pub name: String,
    /// When set, the `null` keyword is a real null value; otherwise it is
    /// looked up as a variable named `null`.
    pub null_support: bool,
    /// Significant digits kept by non-terminating divisions
    pub division_precision: u32,
    /// Upper-case literal member names in dot notation (`a.b` reads key `B`)
    pub dot_notation_upper_case: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            null_support: false,
            division_precision: DEFAULT_DIVISION_PRECISION,
            dot_notation_upper_case: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document
    pub fn from_toml_str(text: &str) -> RuntimeResult<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| RuntimeError::config(e.to_string()))?;
        if config.division_precision == 0 {
            return Err(RuntimeError::config(
                "division_precision must be at least 1",
            ));
        }
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            RuntimeError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Stable digest of every setting; equal configurations share a digest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        // field order is fixed by the struct definition
        let encoded = serde_json::to_string(self).unwrap_or_default();
        hasher.update(encoded.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_document() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str("null_support = true\n").unwrap();
        assert!(config.null_support);
        assert_eq!(config.division_precision, DEFAULT_DIVISION_PRECISION);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            EngineConfig::from_toml_str("division_precision = 0"),
            Err(RuntimeError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("null_support = \"maybe\""),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"web\"\ndivision_precision = 20").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "web");
        assert_eq!(config.division_precision, 20);

        assert!(EngineConfig::load(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_fingerprint() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.null_support = true;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
