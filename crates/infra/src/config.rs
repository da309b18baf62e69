//! Settings loaded from environment variables, and the data directory layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use invoicer_core::CurrencyCode;

use crate::rates::DEFAULT_RATES_URL;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_WKHTMLTOPDF: &str = "wkhtmltopdf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What `invoice_{number}.*` files are written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactFormat {
    #[default]
    Pdf,
    Html,
}

impl FromStr for ArtifactFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown artifact format {other:?}, expected pdf or html")),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        })
    }
}

/// Runtime settings.
///
/// Reads from environment variables:
/// - `INVOICER_DATA_DIR`: root of config, history, invoices and backups (default: `data`)
/// - `INVOICER_BASE_CURRENCY`: currency journal amounts are recorded in (default: `USD`)
/// - `INVOICER_RATES_URL`: Frankfurter-compatible rate service (default: `https://api.frankfurter.app`)
/// - `INVOICER_ARTIFACT_FORMAT`: `pdf` or `html` (default: `pdf`)
/// - `INVOICER_WKHTMLTOPDF`: HTML to PDF converter binary (default: `wkhtmltopdf`)
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub base_currency: CurrencyCode,
    pub rates_url: String,
    pub artifact_format: ArtifactFormat,
    pub wkhtmltopdf: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Settings::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_currency = match var("INVOICER_BASE_CURRENCY") {
            Some(value) => value
                .parse::<CurrencyCode>()
                .map_err(|e| ConfigError::InvalidVar {
                    name: "INVOICER_BASE_CURRENCY",
                    value,
                    reason: e.to_string(),
                })?,
            None => defaults.base_currency,
        };

        let artifact_format = match var("INVOICER_ARTIFACT_FORMAT") {
            Some(value) => value
                .parse::<ArtifactFormat>()
                .map_err(|reason| ConfigError::InvalidVar {
                    name: "INVOICER_ARTIFACT_FORMAT",
                    value,
                    reason,
                })?,
            None => defaults.artifact_format,
        };

        Ok(Self {
            data_dir: var("INVOICER_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            base_currency,
            rates_url: var("INVOICER_RATES_URL").unwrap_or(defaults.rates_url),
            artifact_format,
            wkhtmltopdf: var("INVOICER_WKHTMLTOPDF")
                .map(PathBuf::from)
                .unwrap_or(defaults.wkhtmltopdf),
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.data_dir.join("config")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history").join("history.json")
    }

    pub fn counter_file(&self) -> PathBuf {
        self.config_dir().join("invoice_number.txt")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("invoices")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backup")
    }

    /// Create the data, config, history, output and backup directories if missing.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        let history_dir = self
            .history_file()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.data_dir.clone());
        for dir in [
            self.data_dir.clone(),
            self.config_dir(),
            history_dir,
            self.output_dir(),
            self.backup_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Io { path: dir, source })?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            base_currency: CurrencyCode::default(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            artifact_format: ArtifactFormat::default(),
            wkhtmltopdf: PathBuf::from(DEFAULT_WKHTMLTOPDF),
        }
    }
}
