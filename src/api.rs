//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! This module focuses on the `country/{codes}/indicator/{codes}` endpoint and returns
//! results as long-format `models::DataPoint` rows. Pagination is handled automatically.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
//! - When requesting **multiple indicators** at once, the API requires a `source` parameter
//!   (`source=2` for WDI). Without one, each indicator is requested on its own.
//! - Requests are attempted once. Recovery from a failed fetch is the loader's job.
//!
//! Typical usage:
//! ```no_run
//! # use wbi_edu::{Client, DateSpec};
//! let client = Client::new()?;
//! let rows = client.fetch(
//!     &["SN".into()],
//!     &["SE.PRM.ENRR".into()],
//!     Some(DateSpec::Range { start: 2010, end: 2020 }),
//!     Some(2),
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```
use crate::loader::DataSource;
use crate::models::{DataPoint, DateSpec, Entry, Meta};
use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// World Development Indicators source id.
pub const WDI_SOURCE: u32 = 2;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    pub source: Option<u32>,
    http: HttpClient,
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Split one page of the API response into its metadata and entries.
///
/// The API returns `[Meta, [Entry, ...]]`, or an object carrying `message` in
/// position 0 when the request was rejected.
pub fn parse_page(v: &Value) -> Result<(Meta, Vec<Entry>)> {
    let arr = v
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("unexpected response shape: not a top-level array"))?;
    if arr.is_empty() {
        bail!("unexpected response: empty array");
    }
    if arr[0].get("message").is_some() {
        bail!("world bank api error: {}", arr[0]);
    }

    let meta: Meta = serde_json::from_value(arr[0].clone()).context("parse meta")?;
    let entries: Vec<Entry> = match arr.get(1) {
        Some(Value::Null) | None => vec![],
        Some(list) => serde_json::from_value(list.clone()).context("parse entries")?,
    };
    Ok((meta, entries))
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wbi_edu/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            source: Some(WDI_SOURCE),
            http,
        })
    }

    pub fn source(mut self, source: Option<u32>) -> Self {
        self.source = source;
        self
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let r = self.http.get(url).send().context("network error")?;
        if !r.status().is_success() {
            bail!("request failed with HTTP {}", r.status());
        }
        r.json().context("decode json")
    }

    /// Fetch indicator observations.
    ///
    /// - `countries`: ISO2 (e.g., "SN") or ISO3 (e.g., "SEN") or aggregates. Multiple accepted.
    /// - `indicators`: e.g., "SE.PRM.ENRR". Multiple accepted.
    /// - `date`: A single year or inclusive range.
    /// - `source`: Optional numeric source id (e.g., 2 for WDI). When `None` and multiple
    ///   indicators are requested, each indicator is fetched separately and merged.
    pub fn fetch(
        &self,
        countries: &[String],
        indicators: &[String],
        date: Option<DateSpec>,
        source: Option<u32>,
    ) -> Result<Vec<DataPoint>> {
        if countries.is_empty() {
            bail!("at least one country/region code required");
        }
        if indicators.is_empty() {
            bail!("at least one indicator code required");
        }

        if indicators.len() > 1 && source.is_none() {
            let mut all_points = Vec::new();
            for indicator in indicators {
                let points = self.fetch(countries, std::slice::from_ref(indicator), date, None)?;
                all_points.extend(points);
            }
            return Ok(all_points);
        }

        let country_spec = enc_join(countries.iter().map(|s| s.as_str()));
        let indicator_spec = enc_join(indicators.iter().map(|s| s.as_str()));

        let mut url = format!(
            "{}/country/{}/indicator/{}?format=json&per_page=1000",
            self.base_url, country_spec, indicator_spec
        );
        if let Some(d) = date {
            url.push_str(&format!("&date={}", d.to_query_param()));
        }
        if let Some(s) = source {
            url.push_str(&format!("&source={}", s));
        }

        // Safety cap to avoid pathological jobs
        let max_pages = 1000u32;

        let mut page = 1u32;
        let mut out: Vec<DataPoint> = Vec::new();
        loop {
            if page > max_pages {
                bail!("page limit exceeded ({})", max_pages);
            }
            let page_url = format!("{}&page={}", url, page);
            log::debug!("GET {}", page_url);
            let v = self
                .get_json(&page_url)
                .with_context(|| format!("GET {}", page_url))?;
            let (meta, entries) = parse_page(&v)?;
            for entry in entries {
                out.push(DataPoint::try_from(entry)?);
            }

            if page >= meta.pages {
                break;
            }
            page += 1;
        }

        Ok(out)
    }
}

impl DataSource for Client {
    fn fetch_observations(
        &self,
        indicators: &[String],
        countries: &[String],
        date: DateSpec,
    ) -> Result<Vec<DataPoint>> {
        self.fetch(countries, indicators, Some(date), self.source)
    }
}
