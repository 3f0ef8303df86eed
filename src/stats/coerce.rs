//! Numeric normalization for count fields.
//!
//! CBP suppresses or flags some cells with non-numeric placeholders. Those
//! become zero here, and every zeroing is tallied in a [`CoercionReport`].

use crate::models::{CoercionReport, IndustryRecord, SourceCounts};

/// Parse a non-negative count; `None` when the cell is not a usable number
///
/// Integral strings parse directly. Decimal strings are accepted when finite
/// and non-negative and are truncated toward zero.
pub fn parse_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Some(value);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 => {
            Some(value.trunc() as u64)
        }
        _ => None,
    }
}

/// Builds [`IndustryRecord`]s from raw text cells, counting zeroed values
#[derive(Debug, Default)]
pub struct RecordBuilder {
    report: CoercionReport,
    source_counts: Vec<SourceCounts>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        &mut self,
        employment: &str,
        establishments: &str,
        industry_code: &str,
        state_id: &str,
        county_fips: &str,
    ) -> IndustryRecord {
        let employment_count = parse_count(employment).unwrap_or_else(|| {
            self.report.employment_zeroed += 1;
            0
        });
        let establishment_count = parse_count(establishments).unwrap_or_else(|| {
            self.report.establishment_zeroed += 1;
            0
        });
        self.source_counts.push(SourceCounts {
            employment: employment.to_string(),
            establishments: establishments.to_string(),
        });

        IndustryRecord {
            employment_count,
            establishment_count,
            industry_code: industry_code.to_string(),
            state_id: state_id.trim().to_string(),
            county_fips: county_fips.trim().to_string(),
        }
    }

    pub fn report(&self) -> CoercionReport {
        self.report
    }

    /// Raw count cells of every built record, in build order
    pub(crate) fn into_source_counts(self) -> Vec<SourceCounts> {
        self.source_counts
    }
}
