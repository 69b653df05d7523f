//! `~/.passbook/config.toml`
//!
//! ```toml
//! [output]
//! format = "csv"
//! write_empty = true
//!
//! [hdfc]
//! withdrawal_min_gap = 90.0
//! ```

use anyhow::{Context, Result};
use passbook_ingest::{ExtractorConfig, HdfcConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputSection,
    pub hdfc: HdfcConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
    /// Write an empty array when nothing was extracted
    pub write_empty: bool,
}

impl Config {
    pub fn extractor(&self) -> ExtractorConfig {
        ExtractorConfig { hdfc: self.hdfc }
    }
}

pub fn passbook_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".passbook"))
}

/// Load `explicit`, or the default file when it exists. Only an explicit
/// path is required to exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let Ok(home) = passbook_home() else {
                return Ok(Config::default());
            };
            let p = home.join("config.toml");
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}
