//! Parsing of County Business Patterns API responses.
//!
//! The API answers with a JSON array of rows where the first row holds the
//! column names. Rows are located by header name, so field order in the
//! response does not matter.

use super::coerce::RecordBuilder;
use super::transport::ApiResponse;
use crate::constants::api_fields;
use crate::error::{IngestError, Result};
use crate::models::{CoercionReport, IndustryRecord, SourceCounts};

use serde_json::Value;

/// Records parsed from one response, with their coercion tally
#[derive(Debug)]
pub struct ParsedTable {
    pub records: Vec<IndustryRecord>,
    pub coercion: CoercionReport,
    pub(crate) source_counts: Vec<SourceCounts>,
}

/// Positions of the fields we keep
#[derive(Debug)]
struct FieldIndex {
    employment: usize,
    establishments: usize,
    state: usize,
    county: usize,
}

impl FieldIndex {
    fn resolve(header: &[String], industry_code: &str) -> Result<Self> {
        let position = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| header.iter().position(|h| h == name))
        };

        let lookups = [
            (api_fields::EMP, position(&[api_fields::EMP])),
            (api_fields::ESTAB, position(&[api_fields::ESTAB])),
            (
                api_fields::STATE,
                position(&[api_fields::STATE, api_fields::GEO_STATE]),
            ),
            (
                api_fields::COUNTY,
                position(&[api_fields::COUNTY, api_fields::GEO_COUNTY]),
            ),
        ];

        let missing: Vec<&str> = lookups
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();

        match lookups {
            [
                (_, Some(employment)),
                (_, Some(establishments)),
                (_, Some(state)),
                (_, Some(county)),
            ] => Ok(Self {
                employment,
                establishments,
                state,
                county,
            }),
            _ => Err(malformed(
                industry_code,
                format!(
                    "header is missing fields {:?}; found {:?}",
                    missing, header
                ),
            )),
        }
    }
}

/// Parse one response; `Ok(None)` when the API had no rows for this code
///
/// `industry_code` is stamped onto every record regardless of what the
/// response echoes back.
pub fn parse_table(industry_code: &str, response: &ApiResponse) -> Result<Option<ParsedTable>> {
    // 204 No Content is how the API reports an empty selection
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(None);
    }

    let rows: Vec<Vec<Value>> = serde_json::from_str(&response.body).map_err(|e| {
        malformed(
            industry_code,
            format!("body is not a JSON array of rows: {}", e),
        )
    })?;

    let mut rows = rows.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(None),
    };

    let data: Vec<Vec<Value>> = rows.collect();
    if data.is_empty() {
        return Ok(None);
    }

    let fields = FieldIndex::resolve(&header, industry_code)?;
    let mut builder = RecordBuilder::new();
    let mut records = Vec::with_capacity(data.len());

    for (row_num, row) in data.iter().enumerate() {
        if row.len() != header.len() {
            return Err(malformed(
                industry_code,
                format!(
                    "row {} has {} cells but the header has {}",
                    row_num + 1,
                    row.len(),
                    header.len()
                ),
            ));
        }

        records.push(builder.build(
            &cell_text(&row[fields.employment]),
            &cell_text(&row[fields.establishments]),
            industry_code,
            &cell_text(&row[fields.state]),
            &cell_text(&row[fields.county]),
        ));
    }

    Ok(Some(ParsedTable {
        records,
        coercion: builder.report(),
        source_counts: builder.into_source_counts(),
    }))
}

/// Text of a JSON cell; the API sends strings but nulls and bare numbers do occur
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn malformed(industry_code: &str, reason: String) -> IngestError {
    IngestError::MalformedResponse {
        industry_code: industry_code.to_string(),
        reason,
    }
}
