//! Error handling for crosswalk loading and statistics fetching.
//!
//! Every structural, credential or remote problem is fatal and surfaces
//! here with a message a person can act on. Numeric coercion failures are
//! not errors; see [`crate::models::CoercionReport`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Crosswalk not found: {path}")]
    NotFound { path: PathBuf },

    #[error(
        "Crosswalk missing expected columns {missing:?}. Found columns: {found:?}. \
         Try changing the header row offset if the file format differs."
    )]
    SchemaMismatch {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error(
        "CENSUS_API_KEY is not set. In your terminal run:\n  export CENSUS_API_KEY='YOUR_KEY'\n\
         then pass the key to the fetcher."
    )]
    MissingCredential,

    #[error("Request for industry code {industry_code} failed{}: {reason}", status_suffix(.status))]
    RemoteFailure {
        industry_code: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Malformed response for industry code {industry_code}: {reason}")]
    MalformedResponse {
        industry_code: String,
        reason: String,
    },

    #[error(
        "No CBP data returned for year {year} and industry codes {industry_codes:?}. \
         Check your API key, year, and NAICS codes."
    )]
    NoData {
        year: u16,
        industry_codes: Vec<String>,
    },

    #[error("Cache file {path} is missing columns {missing:?}. Found columns: {found:?}")]
    CacheSchema {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to read spreadsheet {path}: {reason}")]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with HTTP status {}", code),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
