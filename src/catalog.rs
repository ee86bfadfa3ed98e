//! Indicator catalog: a fixed, two-way mapping between World Bank indicator codes
//! and the short column names used throughout the crate.

use crate::models::DateSpec;
use std::collections::HashMap;
use thiserror::Error;

/// WDI education indicators tracked by the dashboard, in display order.
pub const EDUCATION_INDICATORS: [(&str, &str); 5] = [
    ("SE.PRM.ENRR", "primary_enrollment_rate"),
    ("SE.ENR.PRSC.FM.ZS", "primary_gender_parity"),
    ("SE.PRM.CMPT.ZS", "primary_completion_rate"),
    ("SE.XPD.TOTL.GD.ZS", "education_spending_gdp"),
    ("SE.SCH.LIFE", "school_life_expectancy"),
];

/// West/Central Africa, East Africa and South Asia (ISO2).
pub const DEFAULT_COUNTRIES: [&str; 20] = [
    "BF", "BJ", "CI", "CM", "GN", "ML", "NE", "SN", "TG", "KE", "UG", "TZ", "ZM", "ET", "NG",
    "BD", "IN", "PK", "NP", "LK",
];

pub const DEFAULT_START_YEAR: i32 = 2000;
pub const DEFAULT_END_YEAR: i32 = 2023;

pub fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

pub fn default_date_range() -> DateSpec {
    DateSpec::Range {
        start: DEFAULT_START_YEAR,
        end: DEFAULT_END_YEAR,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("indicator catalog is empty")]
    Empty,
    #[error("indicator code `{0}` appears more than once")]
    DuplicateCode(String),
    #[error("short name `{name}` is used by both `{first}` and `{second}`")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    #[error("blank code or short name in entry ({code:?}, {name:?})")]
    Blank { code: String, name: String },
}

/// Bidirectional code ↔ short-name lookup. Injective by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorCatalog {
    entries: Vec<(String, String)>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl IndicatorCatalog {
    /// Build a catalog from `(code, short_name)` pairs, failing on any collision.
    pub fn new<I, C, N>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut by_code: HashMap<String, usize> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (code, name) in pairs {
            let (code, name) = (code.into(), name.into());
            if code.trim().is_empty() || name.trim().is_empty() {
                return Err(CatalogError::Blank { code, name });
            }
            if by_code.contains_key(&code) {
                return Err(CatalogError::DuplicateCode(code));
            }
            if let Some(&idx) = by_name.get(&name) {
                return Err(CatalogError::DuplicateName {
                    name,
                    first: entries[idx].0.clone(),
                    second: code,
                });
            }
            let idx = entries.len();
            by_code.insert(code.clone(), idx);
            by_name.insert(name.clone(), idx);
            entries.push((code, name));
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            entries,
            by_code,
            by_name,
        })
    }

    /// The fixed education catalog.
    pub fn education() -> Self {
        Self::new(EDUCATION_INDICATORS).expect("built-in catalog is injective")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(|&i| self.entries[i].1.as_str())
    }

    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|&i| self.entries[i].0.as_str())
    }

    /// Indicator codes in catalog order.
    pub fn codes(&self) -> Vec<String> {
        self.entries.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Short names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(_, n)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Human label for a short name: `primary_completion_rate` -> `primary completion rate`.
pub fn display_label(short_name: &str) -> String {
    short_name.replace('_', " ")
}

/// Label with the first letter upper-cased, for chart titles.
pub fn title_label(short_name: &str) -> String {
    let label = display_label(short_name);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}
