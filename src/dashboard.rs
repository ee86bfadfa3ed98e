//! Dashboard view: everything the front end renders for one filter selection.

use crate::catalog::{IndicatorCatalog, display_label};
use crate::stats::{GiniSeries, gini_by_year};
use crate::table::ObservationTable;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year range preselected when the table covers it.
pub const DEFAULT_YEARS: (i32, i32) = (2010, 2023);
/// Number of countries preselected.
pub const DEFAULT_COUNTRY_COUNT: usize = 3;

/// User-chosen filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub countries: Vec<String>,
    pub years: (i32, i32),
    /// Indicator short name.
    pub indicator: String,
}

impl Selection {
    /// First countries of the table, default years clamped to the table, first indicator.
    pub fn default_for(table: &ObservationTable, catalog: &IndicatorCatalog) -> Self {
        let countries = table
            .countries()
            .into_iter()
            .take(DEFAULT_COUNTRY_COUNT)
            .collect();
        let years = match table.year_bounds() {
            Some((lo, hi)) => (
                DEFAULT_YEARS.0.clamp(lo, hi),
                DEFAULT_YEARS.1.clamp(lo, hi),
            ),
            None => DEFAULT_YEARS,
        };
        let indicator = catalog.names().into_iter().next().unwrap_or_default();
        Self {
            countries,
            years,
            indicator,
        }
    }

    /// File name offered for the raw-data download.
    pub fn export_file_name(&self) -> String {
        format!("{}_{}_{}.csv", self.indicator, self.years.0, self.years.1)
    }
}

/// One row of the raw-data export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub country: String,
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub country: String,
    pub country_name: String,
    pub value: f64,
}

/// Country values for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub year: i32,
    pub entries: Vec<MapEntry>,
}

/// Lowest and highest value of the selected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub year: i32,
    pub min: MapEntry,
    pub max: MapEntry,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: Selection,
    pub indicator_code: String,
    pub filtered: ObservationTable,
    pub gini: GiniSeries,
    /// `None` when the selected end year has no values.
    pub map: Option<MapFrame>,
    /// One frame per year with at least one value, ascending.
    pub frames: Vec<MapFrame>,
    pub export: Vec<ExportRow>,
    pub extremes: Option<Extremes>,
    /// Selected country codes with no row in the table.
    pub unknown_countries: Vec<String>,
}

impl DashboardView {
    pub fn build(
        table: &ObservationTable,
        catalog: &IndicatorCatalog,
        selection: &Selection,
    ) -> Result<Self> {
        let indicator_code = catalog
            .code_for(&selection.indicator)
            .ok_or_else(|| anyhow!("unknown indicator `{}`", selection.indicator))?
            .to_string();
        let (from, to) = selection.years;
        let unknown_countries = table.unknown_countries(&selection.countries);
        if !unknown_countries.is_empty() {
            log::warn!(
                "selected countries not in the data: {}",
                unknown_countries.join(", ")
            );
        }
        let filtered = table.filter(&selection.countries, from, to);
        let gini = gini_by_year(&filtered, &selection.indicator)?;
        let idx = filtered.column_index(&selection.indicator)?;

        let mut by_year: BTreeMap<i32, Vec<MapEntry>> = BTreeMap::new();
        let mut export = Vec::new();
        for row in filtered.rows() {
            let Some(value) = row.values[idx] else {
                continue;
            };
            by_year.entry(row.year).or_default().push(MapEntry {
                country: row.country.clone(),
                country_name: row.country_name.clone(),
                value,
            });
            export.push(ExportRow {
                country: row.country.clone(),
                year: row.year,
                value,
            });
        }

        let frames: Vec<MapFrame> = by_year
            .into_iter()
            .map(|(year, entries)| MapFrame { year, entries })
            .collect();
        let map = frames.iter().find(|f| f.year == to).cloned();
        let extremes = map.as_ref().and_then(extremes_of);

        Ok(Self {
            selection: selection.clone(),
            indicator_code,
            filtered,
            gini,
            map,
            frames,
            export,
            extremes,
            unknown_countries,
        })
    }

    pub fn indicator_label(&self) -> String {
        display_label(&self.selection.indicator)
    }

    /// Sentences describing the lowest and highest country, or a notice when the
    /// selected year has no data.
    pub fn summary_lines(&self) -> Vec<String> {
        let label = self.indicator_label();
        match &self.extremes {
            Some(e) => vec![
                format!(
                    "In {}, {} had the lowest value of {}: {:.2}",
                    e.year, e.min.country, label, e.min.value
                ),
                format!(
                    "In {}, {} had the highest value of {}: {:.2}",
                    e.year, e.max.country, label, e.max.value
                ),
            ],
            None => vec![format!(
                "No usable data for {} in {}.",
                label, self.selection.years.1
            )],
        }
    }
}

/// First entry wins on ties.
fn extremes_of(frame: &MapFrame) -> Option<Extremes> {
    let mut it = frame.entries.iter();
    let first = it.next()?;
    let (mut min, mut max) = (first, first);
    for e in it {
        if e.value < min.value {
            min = e;
        }
        if e.value > max.value {
            max = e;
        }
    }
    Some(Extremes {
        year: frame.year,
        min: min.clone(),
        max: max.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(c: &str, v: f64) -> MapEntry {
        MapEntry {
            country: c.into(),
            country_name: c.into(),
            value: v,
        }
    }

    #[test]
    fn extremes_keep_first_on_ties() {
        let frame = MapFrame {
            year: 2020,
            entries: vec![
                entry("A", 2.0),
                entry("B", 1.0),
                entry("C", 1.0),
                entry("D", 5.0),
                entry("E", 5.0),
            ],
        };
        let e = extremes_of(&frame).unwrap();
        assert_eq!(e.min.country, "B");
        assert_eq!(e.max.country, "D");
        assert!(extremes_of(&MapFrame { year: 2020, entries: vec![] }).is_none());
    }
}
