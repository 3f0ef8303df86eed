//! Metro Ingest Library
//!
//! Data ingestion for a metro-area site-selection analysis. Two independent
//! loaders produce tables keyed on the 5-character county FIPS code:
//!
//! - [`load_crosswalk`] reads the Census county-to-CBSA delineation file and
//!   normalizes it to `cbsa_code`, `cbsa_name`, `fips_county`
//! - [`fetch_statistics`] pulls County Business Patterns employment and
//!   establishment counts for a set of NAICS codes, with an optional CSV cache
//!
//! The analysis layer joins the two on `fips_county` and feeds the result,
//! together with a [`ScoringScenario`], to its scoring model.

pub mod config;
pub mod constants;
pub mod crosswalk;
pub mod error;
pub mod logging;
pub mod models;
pub mod stats;

// Re-export commonly used types
pub use config::{CrosswalkConfig, FetchConfig, ScoringScenario};
pub use crosswalk::{CrosswalkLoader, load_crosswalk};
pub use error::{IngestError, Result};
pub use models::{
    CoercionReport, Crosswalk, CrosswalkRecord, IndustryRecord, IndustryStats, StatsSource,
};
pub use stats::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
pub use stats::{FetchRequest, StatisticsFetcher, fetch_statistics};
