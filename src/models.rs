//! Core data structures for crosswalk and industry statistics tables.
//!
//! Records are plain typed rows; the table wrappers keep row order and
//! convert to polars frames for the analysis layer to join on
//! `fips_county`.

use crate::constants::{crosswalk_columns, stats_columns};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One county's membership in a core-based statistical area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkRecord {
    pub cbsa_code: String,
    pub cbsa_name: String,
    pub fips_county: String,
}

/// County-to-CBSA mapping in source row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crosswalk {
    records: Vec<CrosswalkRecord>,
}

impl Crosswalk {
    pub fn new(records: Vec<CrosswalkRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CrosswalkRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CrosswalkRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record for a county; the source lists each county once
    pub fn metro_for_county(&self, fips_county: &str) -> Option<&CrosswalkRecord> {
        self.records.iter().find(|r| r.fips_county == fips_county)
    }

    /// Frame with `cbsa_code`, `cbsa_name`, `fips_county` string columns
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            crosswalk_columns::CBSA_CODE => self.records.iter().map(|r| r.cbsa_code.as_str()).collect::<Vec<_>>(),
            crosswalk_columns::CBSA_NAME => self.records.iter().map(|r| r.cbsa_name.as_str()).collect::<Vec<_>>(),
            crosswalk_columns::FIPS_COUNTY => self.records.iter().map(|r| r.fips_county.as_str()).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Employment and establishment counts for one county and one industry code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryRecord {
    pub employment_count: u64,
    pub establishment_count: u64,
    pub industry_code: String,
    pub state_id: String,
    pub county_fips: String,
}

impl IndustryRecord {
    /// State and county codes joined into the crosswalk key
    pub fn fips_county(&self) -> String {
        format!("{}{}", self.state_id, self.county_fips)
    }
}

/// Cells that failed numeric coercion and were recorded as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionReport {
    pub employment_zeroed: usize,
    pub establishment_zeroed: usize,
}

impl CoercionReport {
    pub fn total(&self) -> usize {
        self.employment_zeroed + self.establishment_zeroed
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: CoercionReport) {
        self.employment_zeroed += other.employment_zeroed;
        self.establishment_zeroed += other.establishment_zeroed;
    }
}

/// Count cells as the source sent them, before coercion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SourceCounts {
    pub employment: String,
    pub establishments: String,
}

/// Where a statistics table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsSource {
    Remote,
    Cache,
}

/// Industry statistics for every requested code, concatenated in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryStats {
    pub(crate) records: Vec<IndustryRecord>,
    pub(crate) coercion: CoercionReport,
    /// Raw count text per record, persisted to the cache so reads re-coerce it
    pub(crate) source_counts: Vec<SourceCounts>,
    pub(crate) empty_codes: Vec<String>,
    pub(crate) source: StatsSource,
}

impl IndustryStats {
    pub fn records(&self) -> &[IndustryRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<IndustryRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn coercion(&self) -> CoercionReport {
        self.coercion
    }

    /// Codes the API answered with no rows
    pub fn empty_codes(&self) -> &[String] {
        &self.empty_codes
    }

    pub fn source(&self) -> StatsSource {
        self.source
    }

    /// Frame with numeric counts, string identifiers and the derived `fips_county` key
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            stats_columns::EMPLOYMENT_COUNT => self.records.iter().map(|r| r.employment_count).collect::<Vec<u64>>(),
            stats_columns::ESTABLISHMENT_COUNT => self.records.iter().map(|r| r.establishment_count).collect::<Vec<u64>>(),
            stats_columns::INDUSTRY_CODE => self.records.iter().map(|r| r.industry_code.as_str()).collect::<Vec<_>>(),
            stats_columns::STATE_ID => self.records.iter().map(|r| r.state_id.as_str()).collect::<Vec<_>>(),
            stats_columns::COUNTY_FIPS => self.records.iter().map(|r| r.county_fips.as_str()).collect::<Vec<_>>(),
            stats_columns::FIPS_COUNTY => self.records.iter().map(|r| r.fips_county()).collect::<Vec<String>>(),
        )?;
        Ok(df)
    }

    /// Cache schema frame; counts are the source text so a re-read counts the same zeroings
    pub(crate) fn to_cache_frame(&self) -> Result<DataFrame> {
        let (employment, establishments): (Vec<String>, Vec<String>) = self
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| match self.source_counts.get(idx) {
                Some(raw) => (raw.employment.clone(), raw.establishments.clone()),
                None => (
                    record.employment_count.to_string(),
                    record.establishment_count.to_string(),
                ),
            })
            .unzip();

        let df = df!(
            stats_columns::EMPLOYMENT_COUNT => employment,
            stats_columns::ESTABLISHMENT_COUNT => establishments,
            stats_columns::INDUSTRY_CODE => self.records.iter().map(|r| r.industry_code.as_str()).collect::<Vec<_>>(),
            stats_columns::STATE_ID => self.records.iter().map(|r| r.state_id.as_str()).collect::<Vec<_>>(),
            stats_columns::COUNTY_FIPS => self.records.iter().map(|r| r.county_fips.as_str()).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Column cells as text, nulls as empty strings
pub(crate) fn text_values(column: &Column) -> Result<Vec<String>> {
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}
