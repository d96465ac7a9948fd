//! `lend.toml` configuration.
//!
//! ```toml
//! [output]
//! format = "table"
//!
//! [log]
//! filter = "lending_core=debug"
//!
//! [verification]
//! otp_code = "123456"
//!
//! [instacash]
//! amount = "2500"
//! term_months = 12
//! annual_rate_percent = "9.99"
//! expires_in_hours = 48
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use lending_core::offers::catalog::InstaCashOffer;

use crate::OutputFormat;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "lend.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LendConfig {
    pub output: OutputConfig,
    pub log: LogConfig,
    pub verification: VerificationConfig,
    pub instacash: InstaCashOffer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Used when `--output` is not passed.
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Passcode accepted by `prequalify`.
    pub otp_code: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            otp_code: "123456".to_string(),
        }
    }
}

impl LendConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise `lend.toml` is used if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
