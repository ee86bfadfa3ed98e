use anyhow::{Context, Error, Result};
use serde::{Deserialize, Serialize};

/// How to specify dates in API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateSpec {
    /// Single year like 2020
    Year(i32),
    /// Inclusive range like 2000..=2023
    Range { start: i32, end: i32 },
}

impl DateSpec {
    pub fn to_query_param(&self) -> String {
        match *self {
            DateSpec::Year(y) => y.to_string(),
            DateSpec::Range { start, end } => format!("{}:{}", start, end),
        }
    }

    /// First and last year covered, in ascending order.
    pub fn bounds(&self) -> (i32, i32) {
        match *self {
            DateSpec::Year(y) => (y, y),
            DateSpec::Range { start, end } => (start.min(end), start.max(end)),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&year)
    }
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    pub value: String,
}

/// Raw entry from the API (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub indicator: CodeName,
    pub country: CodeName,
    #[serde(default)]
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
}

/// Long-format observation: one indicator value for one country and year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub indicator_id: String,
    pub country_id: String, // typically ISO2
    pub country_name: String,
    pub country_iso3: String,
    pub year: i32,
    pub value: Option<f64>,
}

impl DataPoint {
    /// Code used to identify the country in tables. This is the API id (ISO2 for
    /// countries), the same code space as the request; ISO3 only when the id is blank.
    pub fn country_code(&self) -> &str {
        if self.country_id.trim().is_empty() {
            &self.country_iso3
        } else {
            &self.country_id
        }
    }
}

impl TryFrom<Entry> for DataPoint {
    type Error = Error;

    fn try_from(e: Entry) -> Result<Self> {
        // Dates are plain years for annual indicators; keep the leading year otherwise ("2020M01").
        let year = e
            .date
            .get(..4)
            .and_then(|y| y.parse::<i32>().ok())
            .with_context(|| {
                format!(
                    "malformed date {:?} for {} / {}",
                    e.date, e.country.id, e.indicator.id
                )
            })?;
        Ok(Self {
            indicator_id: e.indicator.id,
            country_id: e.country.id,
            country_name: e.country.value,
            country_iso3: e.countryiso3code,
            year,
            value: e.value,
        })
    }
}
