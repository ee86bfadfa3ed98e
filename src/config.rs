//! Runtime configuration.
//!
//! Read from `~/.config/wbi-edu/config.json` (or the platform equivalent) when the
//! file exists, otherwise the built-in defaults apply. Every field is optional in
//! the file.

use crate::api::{DEFAULT_BASE_URL, WDI_SOURCE};
use crate::cache::DEFAULT_TTL_HOURS;
use crate::catalog::{DEFAULT_END_YEAR, DEFAULT_START_YEAR, default_countries};
use crate::loader::DEFAULT_CACHE_FILE;
use crate::models::DateSpec;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "wbi-edu";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub countries: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub cache_file: PathBuf,
    pub memo_ttl_hours: i64,
    pub base_url: String,
    /// API source id; `None` requests each indicator separately.
    pub source: Option<u32>,
    /// TrueType font used for chart text.
    pub font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            memo_ttl_hours: DEFAULT_TTL_HOURS,
            base_url: DEFAULT_BASE_URL.to_string(),
            source: Some(WDI_SOURCE),
            font_path: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            return Err(anyhow!("config: `countries` must not be empty"));
        }
        if self.start_year > self.end_year {
            return Err(anyhow!(
                "config: start_year {} is after end_year {}",
                self.start_year,
                self.end_year
            ));
        }
        if self.memo_ttl_hours < 0 {
            return Err(anyhow!("config: memo_ttl_hours must not be negative"));
        }
        Ok(())
    }

    pub fn date_range(&self) -> DateSpec {
        DateSpec::Range {
            start: self.start_year,
            end: self.end_year,
        }
    }
}
