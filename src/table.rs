//! Wide observation table: one row per (country, year), one column per indicator.

use crate::catalog::IndicatorCatalog;
use crate::models::DataPoint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown indicator column `{0}`")]
    UnknownColumn(String),
    #[error("row has {found} values but the table has {expected} indicator columns")]
    RowWidth { expected: usize, found: usize },
}

/// One country-year row. `values[i]` belongs to the table's `columns[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub country: String,
    pub country_name: String,
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Pivot long-format API rows into the wide table, renaming indicator codes to
    /// the catalog's short names. Codes outside the catalog are dropped.
    pub fn from_long(points: &[DataPoint], catalog: &IndicatorCatalog) -> Self {
        let columns = catalog.names();
        let width = columns.len();
        let mut pivot: BTreeMap<(String, i32), Observation> = BTreeMap::new();

        for p in points {
            let Some(name) = catalog.name_for(&p.indicator_id) else {
                log::debug!("ignoring observation for unknown indicator {}", p.indicator_id);
                continue;
            };
            let Some(col) = columns.iter().position(|c| c == name) else {
                continue;
            };
            let code = p.country_code().to_string();
            let row = pivot
                .entry((code.clone(), p.year))
                .or_insert_with(|| Observation {
                    country: code,
                    country_name: p.country_name.clone(),
                    year: p.year,
                    values: vec![None; width],
                });
            if p.value.is_some() {
                row.values[col] = p.value;
            }
        }

        Self {
            columns,
            rows: pivot.into_values().collect(),
        }
    }

    pub fn push(&mut self, row: Observation) -> Result<(), TableError> {
        if row.values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: row.values.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let years = self.years();
        Some((*years.first()?, *years.last()?))
    }

    /// Distinct country codes in order of first appearance.
    pub fn countries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.country.as_str()))
            .map(|r| r.country.clone())
            .collect()
    }

    pub fn year_slice(&self, year: i32) -> impl Iterator<Item = &Observation> {
        self.rows.iter().filter(move |r| r.year == year)
    }

    /// Rows whose country is in `countries` and whose year lies in `from..=to`.
    /// Country codes match case-insensitively.
    pub fn filter(&self, countries: &[String], from: i32, to: i32) -> Self {
        let wanted: HashSet<String> = countries
            .iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| {
                    (from..=to).contains(&r.year)
                        && wanted.contains(&r.country.to_ascii_uppercase())
                })
                .cloned()
                .collect(),
        }
    }

    /// Entries of `countries` with no row in the table, in the given order.
    pub fn unknown_countries(&self, countries: &[String]) -> Vec<String> {
        let known: HashSet<String> = self
            .rows
            .iter()
            .map(|r| r.country.to_ascii_uppercase())
            .collect();
        countries
            .iter()
            .filter(|c| !known.contains(&c.trim().to_ascii_uppercase()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dp(ind: &str, iso2: &str, iso3: &str, year: i32, v: Option<f64>) -> DataPoint {
        DataPoint {
            indicator_id: ind.into(),
            country_id: iso2.into(),
            country_name: format!("{iso3} land"),
            country_iso3: iso3.into(),
            year,
            value: v,
        }
    }

    #[test]
    fn pivot_long_to_wide() {
        let cat = IndicatorCatalog::new([("A", "a"), ("B", "b")]).unwrap();
        let points = vec![
            dp("A", "SN", "SEN", 2011, Some(2.0)),
            dp("B", "SN", "SEN", 2011, None),
            dp("A", "KE", "KEN", 2010, Some(1.0)),
            dp("B", "KE", "KEN", 2010, Some(10.0)),
            dp("X", "KE", "KEN", 2010, Some(99.0)),
        ];
        let t = ObservationTable::from_long(&points, &cat);
        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0].country, "KE");
        assert_eq!(t.rows()[0].values, vec![Some(1.0), Some(10.0)]);
        assert_eq!(t.rows()[1].values, vec![Some(2.0), None]);
        assert_eq!(t.year_bounds(), Some((2010, 2011)));
        assert_eq!(t.year_slice(2011).map(|r| r.country.as_str()).collect::<Vec<_>>(), ["SN"]);
    }

    #[test]
    fn filter_matches_requested_codes() {
        let cat = IndicatorCatalog::new([("A", "a")]).unwrap();
        let points = vec![
            dp("A", "SN", "SEN", 2010, Some(1.0)),
            dp("A", "KE", "KEN", 2010, Some(2.0)),
        ];
        let t = ObservationTable::from_long(&points, &cat);
        let picked = t.filter(&["ke".into()], 2000, 2020);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.rows()[0].country, "KE");
        assert_eq!(t.unknown_countries(&["KE".into(), "KEN".into()]), vec!["KEN"]);
    }

    #[test]
    fn push_checks_width() {
        let mut t = ObservationTable::new(vec!["a".into()]);
        let err = t
            .push(Observation {
                country: "KEN".into(),
                country_name: "Kenya".into(),
                year: 2000,
                values: vec![None, None],
            })
            .unwrap_err();
        assert_eq!(err, TableError::RowWidth { expected: 1, found: 2 });
    }
}
