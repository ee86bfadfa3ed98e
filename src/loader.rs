//! Two-tier data acquisition: the live API first, the local cache file when the
//! API cannot be used.

use crate::cache::MemoCache;
use crate::catalog::IndicatorCatalog;
use crate::models::{DataPoint, DateSpec};
use crate::storage;
use crate::table::ObservationTable;
use anyhow::{Result, bail};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known location of the fallback snapshot, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = "education_data_clean.csv";

/// A remote statistical source returning long-format observations.
pub trait DataSource {
    fn fetch_observations(
        &self,
        indicators: &[String],
        countries: &[String],
        date: DateSpec,
    ) -> Result<Vec<DataPoint>>;
}

/// Source that always fails; used to run from the cache file only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl DataSource for Offline {
    fn fetch_observations(
        &self,
        _: &[String],
        _: &[String],
        _: DateSpec,
    ) -> Result<Vec<DataPoint>> {
        bail!("offline mode: remote source disabled")
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no data available: remote load failed ({remote}) and no cache file at {}", path.display())]
    NoData { remote: String, path: PathBuf },
    #[error("remote load failed ({remote}) and cache file {} could not be read: {detail}", path.display())]
    CacheUnreadable {
        remote: String,
        path: PathBuf,
        detail: String,
    },
}

impl LoadError {
    /// Whether processing must stop because there is no table to work with.
    pub fn is_blocking(&self) -> bool {
        matches!(self, LoadError::NoData { .. } | LoadError::CacheUnreadable { .. })
    }
}

/// Where a loaded table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Remote,
    Memoized,
    /// The remote load failed with `reason`; the table is the cache file's content.
    CacheFile { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: ObservationTable,
    pub origin: DataOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub indicators: Vec<String>,
    pub countries: Vec<String>,
    pub date: DateSpec,
}

pub struct Loader {
    source: Box<dyn DataSource>,
    cache_file: PathBuf,
    memo: MemoCache<LoadKey, ObservationTable>,
}

impl Loader {
    pub fn new(source: Box<dyn DataSource>, cache_file: impl Into<PathBuf>) -> Self {
        Self::with_memo(source, cache_file, MemoCache::default())
    }

    pub fn with_memo(
        source: Box<dyn DataSource>,
        cache_file: impl Into<PathBuf>,
        memo: MemoCache<LoadKey, ObservationTable>,
    ) -> Self {
        Self {
            source,
            cache_file: cache_file.into(),
            memo,
        }
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Load the observation table for `countries` over `date`.
    ///
    /// The remote source is asked once. On success the table is written to the cache
    /// file and memoized; on any failure the cache file is returned as-is.
    pub fn load(
        &mut self,
        catalog: &IndicatorCatalog,
        countries: &[String],
        date: DateSpec,
    ) -> Result<LoadOutcome, LoadError> {
        if countries.is_empty() {
            return Err(LoadError::InvalidRequest("at least one country required".into()));
        }
        let key = LoadKey {
            indicators: catalog.codes(),
            countries: countries.to_vec(),
            date,
        };
        if let Some(hit) = self.memo.get(&key) {
            log::debug!(
                "using memoized table ({} rows, {} min old)",
                hit.value.len(),
                hit.age_minutes_at(Utc::now())
            );
            return Ok(LoadOutcome {
                table: hit.value.clone(),
                origin: DataOrigin::Memoized,
            });
        }

        match self.load_remote(catalog, &key) {
            Ok(table) => {
                log::info!("loaded {} rows from the remote source", table.len());
                self.memo.insert(key, table.clone());
                Ok(LoadOutcome {
                    table,
                    origin: DataOrigin::Remote,
                })
            }
            Err(e) => {
                let reason = format!("{e:#}");
                log::warn!("remote load failed: {reason}");
                let table = self.load_cache(catalog, &reason)?;
                Ok(LoadOutcome {
                    table,
                    origin: DataOrigin::CacheFile { reason },
                })
            }
        }
    }

    fn load_remote(&self, catalog: &IndicatorCatalog, key: &LoadKey) -> Result<ObservationTable> {
        let mut points = self
            .source
            .fetch_observations(&key.indicators, &key.countries, key.date)?;
        let fetched = points.len();
        points.retain(|p| key.date.contains(p.year));
        if points.len() < fetched {
            log::debug!(
                "dropped {} observations outside {}",
                fetched - points.len(),
                key.date.to_query_param()
            );
        }
        if points.is_empty() {
            bail!("remote source returned no observations");
        }
        let table = ObservationTable::from_long(&points, catalog);
        if table.is_empty() {
            bail!("remote source returned no observations for the catalog indicators");
        }
        if let Err(e) = storage::save_table_csv(&table, &self.cache_file) {
            log::warn!("could not write cache file {}: {e:#}", self.cache_file.display());
        }
        Ok(table)
    }

    fn load_cache(
        &self,
        catalog: &IndicatorCatalog,
        remote: &str,
    ) -> Result<ObservationTable, LoadError> {
        if !self.cache_file.exists() {
            log::error!("no cache file at {}", self.cache_file.display());
            return Err(LoadError::NoData {
                remote: remote.to_string(),
                path: self.cache_file.clone(),
            });
        }
        let table = storage::load_table_csv(&self.cache_file).map_err(|e| {
            LoadError::CacheUnreadable {
                remote: remote.to_string(),
                path: self.cache_file.clone(),
                detail: format!("{e:#}"),
            }
        })?;
        // Unversioned snapshot: report drift, return it untouched.
        if table.columns() != catalog.names().as_slice() {
            log::warn!(
                "cache columns {:?} differ from the indicator catalog {:?}",
                table.columns(),
                catalog.names()
            );
        }
        log::info!("loaded {} rows from {}", table.len(), self.cache_file.display());
        Ok(table)
    }
}
