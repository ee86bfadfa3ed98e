//! wbi-edu
//!
//! Education-inequality dashboard core built on World Bank indicator data.
//! Pairs with the `wbi-edu` CLI.
//!
//! ### Features
//! - Fetch the WDI education indicators for a fixed country set and year range
//! - Fall back to the last saved CSV snapshot when the API is unreachable
//! - Gini coefficient per year across the selected countries
//! - Filtered views, raw-data export and SVG/PNG charts
//!
//! ### Example
//! ```no_run
//! use wbi_edu::{Client, IndicatorCatalog, Loader, Selection};
//! use wbi_edu::catalog::{default_countries, default_date_range};
//!
//! let catalog = IndicatorCatalog::education();
//! let mut loader = Loader::new(Box::new(Client::new()?), "education_data_clean.csv");
//! let loaded = loader.load(&catalog, &default_countries(), default_date_range())?;
//! let selection = Selection::default_for(&loaded.table, &catalog);
//! let view = wbi_edu::DashboardView::build(&loaded.table, &catalog, &selection)?;
//! for p in &view.gini.points {
//!     println!("{} {:?}", p.year, p.gini);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod loader;
pub mod models;
pub mod stats;
pub mod storage;
pub mod table;
pub mod viz;

pub use api::Client;
pub use catalog::IndicatorCatalog;
pub use dashboard::{DashboardView, Selection};
pub use loader::{DataOrigin, DataSource, LoadError, Loader};
pub use models::{DataPoint, DateSpec};
pub use stats::{GiniSeries, gini, gini_by_year};
pub use table::ObservationTable;
