//! County Business Patterns statistics fetcher.
//!
//! Issues one blocking request per industry code, strictly in order, and
//! concatenates the results. The batch is all-or-nothing: the first failed
//! request aborts the fetch and nothing is written to the cache. Codes the
//! API answers with no rows are skipped and listed in
//! [`IndustryStats::empty_codes`].

pub mod cache;
pub mod coerce;
pub mod response;
pub mod transport;

#[cfg(test)]
pub mod tests;

use self::response::parse_table;
use self::transport::{ApiRequest, HttpTransport, ReqwestTransport};

use crate::config::FetchConfig;
use crate::constants::api_fields;
use crate::error::{IngestError, Result};
use crate::models::{CoercionReport, IndustryStats, StatsSource};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Longest slice of an error body carried into a `RemoteFailure`
const ERROR_BODY_LIMIT: usize = 200;

/// Parameters of one fetch operation
#[derive(Clone, Default)]
pub struct FetchRequest {
    pub year: u16,
    pub industry_codes: Vec<String>,
    pub api_key: Option<String>,
    pub cache_path: Option<PathBuf>,
    pub force_refresh: bool,
}

impl FetchRequest {
    pub fn new<S: AsRef<str>>(year: u16, industry_codes: &[S]) -> Self {
        Self {
            year,
            industry_codes: industry_codes
                .iter()
                .map(|code| code.as_ref().to_string())
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Cache location; callers pick distinct paths for distinct years and code sets
    pub fn with_cache_path(mut self, cache_path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(cache_path.into());
        self
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("year", &self.year)
            .field("industry_codes", &self.industry_codes)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cache_path", &self.cache_path)
            .field("force_refresh", &self.force_refresh)
            .finish()
    }
}

/// Fetch with the default configuration over a `reqwest` blocking client
pub fn fetch_statistics<S: AsRef<str>>(
    year: u16,
    industry_codes: &[S],
    api_key: Option<&str>,
    cache_path: Option<&Path>,
    force_refresh: bool,
) -> Result<IndustryStats> {
    let mut request = FetchRequest::new(year, industry_codes).with_force_refresh(force_refresh);
    request.api_key = api_key.map(str::to_string);
    request.cache_path = cache_path.map(Path::to_path_buf);

    StatisticsFetcher::with_default_transport()?.fetch(&request)
}

/// Fetcher over any [`HttpTransport`]
#[derive(Debug)]
pub struct StatisticsFetcher<T: HttpTransport> {
    transport: T,
    config: FetchConfig,
}

impl StatisticsFetcher<ReqwestTransport> {
    /// Default configuration with a client honouring its timeout
    pub fn with_default_transport() -> Result<Self> {
        let config = FetchConfig::default();
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self { transport, config })
    }
}

impl<T: HttpTransport> StatisticsFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: FetchConfig::default(),
        }
    }

    /// Replace the configuration. The transport's timeout is fixed when it is built.
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serve from cache when allowed, otherwise fetch every code and refresh the cache
    pub fn fetch(&self, request: &FetchRequest) -> Result<IndustryStats> {
        let api_key = request
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(IngestError::MissingCredential)?;

        self.config.validate()?;

        if let Some(cache_path) = &request.cache_path {
            if let Some(parent) = cache_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            if cache_path.exists() && !request.force_refresh {
                info!("Loading CBP statistics from cache {}", cache_path.display());
                return cache::read_cache(cache_path);
            }
        }

        let stats = self.fetch_remote(request.year, &request.industry_codes, api_key)?;

        if let Some(cache_path) = &request.cache_path {
            cache::write_cache(cache_path, &stats)?;
            info!(
                "Cached {} CBP rows at {}",
                stats.len(),
                cache_path.display()
            );
        }

        Ok(stats)
    }

    fn fetch_remote(
        &self,
        year: u16,
        industry_codes: &[String],
        api_key: &str,
    ) -> Result<IndustryStats> {
        let endpoint = self.config.endpoint(year);
        info!(
            "Fetching CBP {} for {} industry codes from {}",
            year,
            industry_codes.len(),
            endpoint
        );

        let mut tables = Vec::new();
        let mut source_counts = Vec::new();
        let mut coercion = CoercionReport::default();
        let mut empty_codes = Vec::new();

        for code in industry_codes {
            let request = self.build_request(&endpoint, code, api_key);
            debug!("Requesting {:?}", request);

            let response =
                self.transport
                    .get(&request)
                    .map_err(|e| IngestError::RemoteFailure {
                        industry_code: code.clone(),
                        status: None,
                        reason: e.to_string(),
                    })?;

            if !response.is_success() {
                return Err(IngestError::RemoteFailure {
                    industry_code: code.clone(),
                    status: Some(response.status),
                    reason: failure_reason(response.status, &response.body),
                });
            }

            match parse_table(code, &response)? {
                Some(table) => {
                    if !table.coercion.is_clean() {
                        warn!(
                            "NAICS {}: {} employment and {} establishment cells were non-numeric and set to 0",
                            code,
                            table.coercion.employment_zeroed,
                            table.coercion.establishment_zeroed
                        );
                    }
                    debug!("NAICS {}: {} county rows", code, table.records.len());
                    coercion.merge(table.coercion);
                    source_counts.extend(table.source_counts);
                    tables.push(table.records);
                }
                None => {
                    warn!("NAICS {}: no data returned for {}", code, year);
                    empty_codes.push(code.clone());
                }
            }
        }

        if tables.is_empty() {
            return Err(IngestError::NoData {
                year,
                industry_codes: industry_codes.to_vec(),
            });
        }

        let records: Vec<_> = tables.into_iter().flatten().collect();
        info!(
            "Fetched {} CBP rows ({} codes without data)",
            records.len(),
            empty_codes.len()
        );

        Ok(IndustryStats {
            records,
            coercion,
            source_counts,
            empty_codes,
            source: StatsSource::Remote,
        })
    }

    fn build_request(&self, endpoint: &str, industry_code: &str, api_key: &str) -> ApiRequest {
        ApiRequest::new(endpoint)
            .with_param(api_fields::GET_PARAM, self.config.fields.join(","))
            .with_param(api_fields::FOR_PARAM, self.config.geography.as_str())
            .with_param(self.config.industry_field.as_str(), industry_code)
            .with_param(api_fields::KEY_PARAM, api_key)
    }
}

/// Trimmed start of the error body, or the status' canonical reason when empty
fn failure_reason(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string();
    }
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
