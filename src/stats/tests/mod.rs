//! Tests for the statistics fetcher
//!
//! Requests go through a scripted in-memory transport keyed by industry
//! code, which also records every request it receives.

pub mod fetch;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use std::cell::RefCell;
use std::collections::HashMap;

pub const TEST_KEY: &str = "test-key-123";

/// Scripted transport answering by the `NAICS2017` query parameter
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: HashMap<String, Result<ApiResponse, String>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, industry_code: &str, status: u16, body: &str) -> Self {
        self.replies
            .insert(industry_code.to_string(), Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(mut self, industry_code: &str, reason: &str) -> Self {
        self.replies
            .insert(industry_code.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());

        let code = request.param("NAICS2017").unwrap_or_default();
        match self.replies.get(code) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(reason)) => Err(reason.clone().into()),
            None => Ok(ApiResponse::new(204, "")),
        }
    }
}

/// JSON body with the standard CBP header and the given rows
pub fn cbp_body(rows: &[[&str; 5]]) -> String {
    let mut all = vec![
        r#"["EMP","ESTAB","NAICS2017","STATE","COUNTY","state","county"]"#.to_string(),
    ];
    for [emp, estab, naics, state, county] in rows {
        all.push(format!(
            r#"["{emp}","{estab}","{naics}","{state}","{county}","{state}","{county}"]"#
        ));
    }
    format!("[{}]", all.join(","))
}

/// Header row with no data
pub fn header_only_body() -> String {
    cbp_body(&[])
}
