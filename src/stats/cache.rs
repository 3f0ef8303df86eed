//! CSV cache for fetched industry statistics.
//!
//! The file holds exactly the cache schema columns. Count columns keep the
//! text the API sent, placeholders included. Reads keep every cell as text
//! and then run the same count coercion as fresh responses, so a cache hit
//! and a cache miss produce identical tables and coercion reports.

use super::coerce::RecordBuilder;
use crate::constants::stats_columns;
use crate::error::{IngestError, Result};
use crate::models::{IndustryStats, StatsSource, text_values};

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Overwrite `path` with the cache schema columns of `stats`
pub fn write_cache(path: &Path, stats: &IndustryStats) -> Result<()> {
    let mut df = stats.to_cache_frame()?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    debug!("Wrote {} rows to cache {}", df.height(), path.display());
    Ok(())
}

/// Load a cache file written by [`write_cache`]
pub fn read_cache(path: &Path) -> Result<IndustryStats> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let found: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing: Vec<String> = stats_columns::CACHE_SCHEMA
        .iter()
        .filter(|column| !found.iter().any(|f| f == *column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::CacheSchema {
            path: path.to_path_buf(),
            missing,
            found,
        });
    }

    let employment = text_values(df.column(stats_columns::EMPLOYMENT_COUNT)?)?;
    let establishments = text_values(df.column(stats_columns::ESTABLISHMENT_COUNT)?)?;
    let codes = text_values(df.column(stats_columns::INDUSTRY_CODE)?)?;
    let states = text_values(df.column(stats_columns::STATE_ID)?)?;
    let counties = text_values(df.column(stats_columns::COUNTY_FIPS)?)?;

    let mut builder = RecordBuilder::new();
    let records = (0..df.height())
        .map(|row| {
            builder.build(
                &employment[row],
                &establishments[row],
                &codes[row],
                &states[row],
                &counties[row],
            )
        })
        .collect();

    debug!("Read {} rows from cache {}", df.height(), path.display());

    Ok(IndustryStats {
        records,
        coercion: builder.report(),
        source_counts: builder.into_source_counts(),
        empty_codes: Vec::new(),
        source: StatsSource::Cache,
    })
}
