//! County-to-CBSA crosswalk loading and normalization.
//!
//! Reads the delineation file (CSV through polars, workbooks through
//! calamine) with its header at a fixed row offset, validates that the
//! required columns survived the read, and normalizes them into
//! [`CrosswalkRecord`]s keyed on a zero-padded 5-character county FIPS.

use crate::config::CrosswalkConfig;
use crate::constants::{
    COUNTY_FIPS_WIDTH, DELIMITED_EXTENSIONS, WORKBOOK_EXTENSIONS, crosswalk_source,
};
use crate::error::{IngestError, Result};
use crate::models::{Crosswalk, CrosswalkRecord, text_values};

use calamine::{Reader, open_workbook_auto};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Load the crosswalk with default settings
pub fn load_crosswalk(filepath: impl AsRef<Path>) -> Result<Crosswalk> {
    CrosswalkLoader::new().load(filepath)
}

/// Loader for county-to-CBSA delineation files
#[derive(Debug, Clone, Default)]
pub struct CrosswalkLoader {
    config: CrosswalkConfig,
}

impl CrosswalkLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CrosswalkConfig) -> Self {
        self.config = config;
        self
    }

    /// Read, validate and normalize the file at `filepath`
    pub fn load(&self, filepath: impl AsRef<Path>) -> Result<Crosswalk> {
        let path = filepath.as_ref();
        if !path.exists() {
            return Err(IngestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let sheet = self.read_sheet(path)?;
        debug!(
            "Read crosswalk {}: {} rows x {} columns (header row {})",
            path.display(),
            sheet.height(),
            sheet.width(),
            self.config.header_row
        );

        let crosswalk = normalize_sheet(&sheet)?;
        debug!("Normalized {} crosswalk records", crosswalk.len());
        Ok(crosswalk)
    }

    fn read_sheet(&self, path: &Path) -> Result<DataFrame> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
            read_delimited(path, self.config.header_row)
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            read_workbook(path, self.config.header_row)
        } else {
            Err(IngestError::Spreadsheet {
                path: path.to_path_buf(),
                reason: format!("unsupported file extension '{}'", extension),
            })
        }
    }
}

/// Read a delimited file with every cell kept as text
///
/// Older delineation files are Latin-1; bytes that are not UTF-8 become
/// replacement characters instead of failing the read.
fn read_delimited(path: &Path, header_row: usize) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(header_row)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Read the first worksheet of a workbook, header at `header_row`
fn read_workbook(path: &Path, header_row: usize) -> Result<DataFrame> {
    let spreadsheet_error = |reason: String| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no worksheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows().skip(header_row);
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
        None => Vec::new(),
    };
    let header = unique_names(header);

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); header.len()];
    for cells in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            values.push(cells.get(idx).map(|c| c.to_string()).unwrap_or_default());
        }
    }

    let columns: Vec<Column> = header
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Blank and repeated header cells get positional suffixes so the frame can hold them
fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = if name.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            };
            if seen.insert(name.clone()) {
                name
            } else {
                let renamed = format!("{}_duplicated_{}", name, idx);
                seen.insert(renamed.clone());
                renamed
            }
        })
        .collect()
}

/// Validate required columns and build trimmed, padded records
fn normalize_sheet(sheet: &DataFrame) -> Result<Crosswalk> {
    let found: Vec<String> = sheet
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_string())
        .collect();

    let missing: Vec<String> = crosswalk_source::REQUIRED
        .iter()
        .filter(|required| !found.iter().any(|f| f == *required))
        .map(|required| required.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::SchemaMismatch { missing, found });
    }

    let column_values = |required: &str| -> Result<Vec<String>> {
        let idx = found
            .iter()
            .position(|f| f == required)
            .unwrap_or_default();
        text_values(&sheet.get_columns()[idx])
    };

    let codes = column_values(crosswalk_source::CBSA_CODE)?;
    let titles = column_values(crosswalk_source::CBSA_TITLE)?;
    let fips = column_values(crosswalk_source::FIPS)?;

    let records = codes
        .into_iter()
        .zip(titles)
        .zip(fips)
        .map(|((code, title), fips)| CrosswalkRecord {
            cbsa_code: code.trim().to_string(),
            cbsa_name: title.trim().to_string(),
            fips_county: pad_county_fips(&fips),
        })
        .collect();

    Ok(Crosswalk::new(records))
}

/// Trim and left-pad with zeros to the county FIPS width
pub fn pad_county_fips(raw: &str) -> String {
    format!("{:0>width$}", raw.trim(), width = COUNTY_FIPS_WIDTH)
}
