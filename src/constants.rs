//! Application constants for the metro ingestion pipeline
//!
//! Column names on both sides of every normalization step, the default
//! statistics endpoint, and the base site-selection scenario.

// =============================================================================
// Crosswalk
// =============================================================================

/// Zero-based row index of the header in the county-to-CBSA delineation file
pub const CROSSWALK_HEADER_ROW: usize = 3;

/// Fixed width of a county FIPS identifier (2-digit state + 3-digit county)
pub const COUNTY_FIPS_WIDTH: usize = 5;

/// Source column names in the delineation file
pub mod crosswalk_source {
    pub const CBSA_CODE: &str = "CBSA Code";
    pub const CBSA_TITLE: &str = "CBSA Title";
    pub const FIPS: &str = "FIPS";

    /// Columns that must be present after reading, in output order
    pub const REQUIRED: &[&str] = &[CBSA_CODE, CBSA_TITLE, FIPS];
}

/// Canonical crosswalk column names
pub mod crosswalk_columns {
    pub const CBSA_CODE: &str = "cbsa_code";
    pub const CBSA_NAME: &str = "cbsa_name";
    pub const FIPS_COUNTY: &str = "fips_county";
}

/// File extensions read through the CSV reader; everything else goes to calamine
pub const DELIMITED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Workbook extensions calamine can open
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

// =============================================================================
// County Business Patterns API
// =============================================================================

/// Root of the Census data API; year and dataset are appended per request
pub const DEFAULT_BASE_URL: &str = "https://api.census.gov/data";

/// County Business Patterns dataset name
pub const DEFAULT_DATASET: &str = "cbp";

/// Geography clause selecting every county
pub const DEFAULT_GEOGRAPHY: &str = "county:*";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Field names as requested from and echoed by the API
pub mod api_fields {
    pub const EMP: &str = "EMP";
    pub const ESTAB: &str = "ESTAB";
    pub const NAICS2017: &str = "NAICS2017";
    pub const STATE: &str = "STATE";
    pub const COUNTY: &str = "COUNTY";

    /// Geography echo appended by the `for` clause
    pub const GEO_STATE: &str = "state";
    pub const GEO_COUNTY: &str = "county";

    /// Query parameter carrying the credential
    pub const KEY_PARAM: &str = "key";
    /// Query parameter carrying the field list
    pub const GET_PARAM: &str = "get";
    /// Query parameter carrying the geography clause
    pub const FOR_PARAM: &str = "for";

    pub const DEFAULT_FIELDS: &[&str] = &[EMP, ESTAB, NAICS2017, STATE, COUNTY];
}

/// Cache artifact schema, in column order
pub mod stats_columns {
    pub const EMPLOYMENT_COUNT: &str = "employment_count";
    pub const ESTABLISHMENT_COUNT: &str = "establishment_count";
    pub const INDUSTRY_CODE: &str = "industry_code";
    pub const STATE_ID: &str = "state_id";
    pub const COUNTY_FIPS: &str = "county_fips";

    /// Derived join key, present in frames but not persisted
    pub const FIPS_COUNTY: &str = "fips_county";

    pub const CACHE_SCHEMA: &[&str] = &[
        EMPLOYMENT_COUNT,
        ESTABLISHMENT_COUNT,
        INDUSTRY_CODE,
        STATE_ID,
        COUNTY_FIPS,
    ];
}

// =============================================================================
// Site-selection scenario
// =============================================================================

/// Candidate metros considered by the base scenario
pub const CANDIDATE_METROS: &[&str] = &[
    "San Diego, CA",
    "Los Angeles, CA",
    "Inland Empire, CA",
    "Phoenix, AZ",
    "Tucson, AZ",
    "El Paso, TX",
    "Laredo, TX",
    "McAllen, TX",
    "Brownsville, TX",
    "San Antonio, TX",
    "Austin, TX",
    "Dallas-Fort Worth, TX",
    "Houston, TX",
    "Monterrey, MX",
];

/// Existing hubs (points of presence) in the base scenario
pub const EXISTING_HUBS: &[&str] = &["Phoenix, AZ", "Dallas-Fort Worth, TX", "San Diego, CA"];

/// Base scenario weights; `capex_friction` is a penalty
pub const BASE_WEIGHTS: &[(&str, f64)] = &[
    ("demand", 0.30),
    ("enterprise_fit", 0.20),
    ("cloud_adjacency", 0.20),
    ("resilience", 0.15),
    ("capex_friction", -0.15),
];
