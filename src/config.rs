//! Configuration management and validation.
//!
//! Provides configuration structures for crosswalk reading, statistics
//! fetching, and the site-selection scenario handed to the scoring layer.

use crate::constants::{
    self, BASE_WEIGHTS, CANDIDATE_METROS, CROSSWALK_HEADER_ROW, EXISTING_HUBS, api_fields,
};
use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::debug;

/// Settings for reading the county-to-CBSA delineation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkConfig {
    /// Zero-based row index holding the column headers
    pub header_row: usize,
}

impl Default for CrosswalkConfig {
    fn default() -> Self {
        Self {
            header_row: CROSSWALK_HEADER_ROW,
        }
    }
}

impl CrosswalkConfig {
    /// Use a different header row offset
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }
}

/// Settings for the County Business Patterns API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// API root; the request URL is `{base_url}/{year}/{dataset}`
    pub base_url: String,

    /// Dataset path segment
    pub dataset: String,

    /// Query parameter used to select the industry classification
    pub industry_field: String,

    /// Fields requested through the `get` parameter
    pub fields: Vec<String>,

    /// Geography clause passed through the `for` parameter
    pub geography: String,

    /// Upper bound on each request in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            dataset: constants::DEFAULT_DATASET.to_string(),
            industry_field: api_fields::NAICS2017.to_string(),
            fields: api_fields::DEFAULT_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            geography: constants::DEFAULT_GEOGRAPHY.to_string(),
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FetchConfig {
    /// Point requests at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Use a different classification vintage, e.g. `NAICS2012`
    pub fn with_industry_field(mut self, industry_field: impl Into<String>) -> Self {
        let industry_field = industry_field.into();
        for field in self.fields.iter_mut() {
            if *field == self.industry_field {
                *field = industry_field.clone();
            }
        }
        self.industry_field = industry_field;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint for a given year
    pub fn endpoint(&self, year: u16) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            year,
            self.dataset
        )
    }

    /// Check the configuration can produce valid requests
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(IngestError::Configuration {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(IngestError::Configuration {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        for required in [
            api_fields::EMP,
            api_fields::ESTAB,
            api_fields::STATE,
            api_fields::COUNTY,
        ] {
            if !self.fields.iter().any(|f| f == required) {
                return Err(IngestError::Configuration {
                    message: format!("requested fields must include {}", required),
                });
            }
        }
        Ok(())
    }
}

/// Immutable site-selection scenario consumed by the scoring layer
///
/// The pipeline never scores anything itself. The scenario lives here so
/// that the labels the scoring layer expects and the data the pipeline
/// produces are configured side by side, and so tests can swap in
/// alternate scenarios without touching shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioFields")]
pub struct ScoringScenario {
    candidates: Vec<String>,
    hubs: Vec<String>,
    weights: BTreeMap<String, f64>,
}

/// Unvalidated shape of a serialized scenario
#[derive(Deserialize)]
struct ScenarioFields {
    candidates: Vec<String>,
    hubs: Vec<String>,
    weights: BTreeMap<String, f64>,
}

impl TryFrom<ScenarioFields> for ScoringScenario {
    type Error = IngestError;

    fn try_from(fields: ScenarioFields) -> Result<Self> {
        Self::new(fields.candidates, fields.hubs, fields.weights)
    }
}

impl Default for ScoringScenario {
    fn default() -> Self {
        Self {
            candidates: CANDIDATE_METROS.iter().map(|m| m.to_string()).collect(),
            hubs: EXISTING_HUBS.iter().map(|h| h.to_string()).collect(),
            weights: BASE_WEIGHTS
                .iter()
                .map(|(dimension, weight)| (dimension.to_string(), *weight))
                .collect(),
        }
    }
}

impl ScoringScenario {
    /// Build and validate a scenario
    pub fn new(
        candidates: Vec<String>,
        hubs: Vec<String>,
        weights: BTreeMap<String, f64>,
    ) -> Result<Self> {
        let scenario = Self {
            candidates,
            hubs,
            weights,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Same metros, different weights
    pub fn with_weights(&self, weights: BTreeMap<String, f64>) -> Result<Self> {
        Self::new(self.candidates.clone(), self.hubs.clone(), weights)
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn hubs(&self) -> &[String] {
        &self.hubs
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn weight(&self, dimension: &str) -> Option<f64> {
        self.weights.get(dimension).copied()
    }

    pub fn is_hub(&self, metro: &str) -> bool {
        self.hubs.iter().any(|h| h == metro)
    }

    /// Candidates that are not already hubs
    pub fn expansion_candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .filter(|c| !self.is_hub(c))
            .map(String::as_str)
    }

    /// Hubs must be candidates, candidates must be unique, weights finite
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if !seen.insert(candidate.as_str()) {
                return Err(IngestError::Configuration {
                    message: format!("duplicate candidate metro: {}", candidate),
                });
            }
        }

        for hub in &self.hubs {
            if !seen.contains(hub.as_str()) {
                return Err(IngestError::Configuration {
                    message: format!("hub {} is not a candidate metro", hub),
                });
            }
        }

        if let Some((dimension, _)) = self.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(IngestError::Configuration {
                message: format!("weight for {} is not finite", dimension),
            });
        }

        debug!(
            "Scenario validated: {} candidates, {} hubs, {} weighted dimensions",
            self.candidates.len(),
            self.hubs.len(),
            self.weights.len()
        );
        Ok(())
    }
}
