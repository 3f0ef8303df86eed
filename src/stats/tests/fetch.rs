//! Remote fetch behaviour: credentials, request shape, failures and merging

use super::{ScriptedTransport, TEST_KEY, cbp_body, header_only_body};
use crate::config::FetchConfig;
use crate::error::IngestError;
use crate::models::StatsSource;
use crate::stats::{FetchRequest, StatisticsFetcher};

fn two_code_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .respond(
            "518",
            200,
            &cbp_body(&[
                ["1520", "41", "518", "06", "073"],
                ["880", "12", "518", "04", "013"],
            ]),
        )
        .respond("5112", 200, &cbp_body(&[["310", "8", "5112", "48", "201"]]))
}

#[test]
fn test_missing_credential_makes_no_calls() {
    let transport = two_code_transport();
    let fetcher = StatisticsFetcher::new(&transport);

    for key in [None, Some(""), Some("   ")] {
        let mut request = FetchRequest::new(2021, &["518", "5112"]);
        request.api_key = key.map(str::to_string);

        assert!(matches!(
            fetcher.fetch(&request),
            Err(IngestError::MissingCredential)
        ));
    }
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_one_request_per_code_in_order() {
    let transport = two_code_transport();
    let fetcher = StatisticsFetcher::new(&transport);

    let stats = fetcher
        .fetch(&FetchRequest::new(2021, &["518", "5112"]).with_api_key(TEST_KEY))
        .unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(stats.len(), 3);
    assert_eq!(stats.source(), StatsSource::Remote);
    assert!(stats.empty_codes().is_empty());

    let codes: Vec<&str> = stats
        .records()
        .iter()
        .map(|r| r.industry_code.as_str())
        .collect();
    assert_eq!(codes, vec!["518", "518", "5112"]);
    assert_eq!(stats.records()[2].fips_county(), "48201");
}

#[test]
fn test_request_shape() {
    let transport = two_code_transport();
    let fetcher = StatisticsFetcher::new(&transport);

    fetcher
        .fetch(&FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY))
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url, "https://api.census.gov/data/2021/cbp");
    assert_eq!(request.param("get"), Some("EMP,ESTAB,NAICS2017,STATE,COUNTY"));
    assert_eq!(request.param("for"), Some("county:*"));
    assert_eq!(request.param("NAICS2017"), Some("518"));
    assert_eq!(request.param("key"), Some(TEST_KEY));
}

#[test]
fn test_custom_base_url() {
    let transport = two_code_transport();
    let fetcher = StatisticsFetcher::new(&transport)
        .with_config(FetchConfig::default().with_base_url("http://127.0.0.1:9000/data"));

    fetcher
        .fetch(&FetchRequest::new(2019, &["518"]).with_api_key(TEST_KEY))
        .unwrap();

    assert_eq!(
        transport.requests()[0].url,
        "http://127.0.0.1:9000/data/2019/cbp"
    );
}

#[test]
fn test_placeholder_employment_is_zero() {
    let transport = ScriptedTransport::new().respond(
        "518",
        200,
        &cbp_body(&[["N/A", "5", "518", "06", "073"], ["40", "2", "518", "06", "075"]]),
    );
    let fetcher = StatisticsFetcher::new(&transport);

    let stats = fetcher
        .fetch(&FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY))
        .unwrap();

    assert_eq!(stats.records()[0].employment_count, 0);
    assert_eq!(stats.records()[0].establishment_count, 5);
    assert_eq!(stats.records()[1].employment_count, 40);
    assert_eq!(stats.coercion().employment_zeroed, 1);
    assert_eq!(stats.coercion().establishment_zeroed, 0);
}

#[test]
fn test_echoed_code_is_overridden() {
    let transport = ScriptedTransport::new().respond(
        "518210",
        200,
        &cbp_body(&[["12", "3", "51", "06", "073"]]),
    );
    let fetcher = StatisticsFetcher::new(&transport);

    let stats = fetcher
        .fetch(&FetchRequest::new(2021, &["518210"]).with_api_key(TEST_KEY))
        .unwrap();

    assert_eq!(stats.records()[0].industry_code, "518210");
}

#[test]
fn test_all_empty_is_no_data() {
    let transport = ScriptedTransport::new()
        .respond("518", 200, &header_only_body())
        .respond("5112", 200, &header_only_body());
    let fetcher = StatisticsFetcher::new(&transport);

    let result = fetcher.fetch(&FetchRequest::new(2021, &["518", "5112"]).with_api_key(TEST_KEY));

    match result {
        Err(IngestError::NoData {
            year,
            industry_codes,
        }) => {
            assert_eq!(year, 2021);
            assert_eq!(industry_codes, vec!["518", "5112"]);
        }
        other => panic!("Expected NoData error, got {:?}", other),
    }
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_no_codes_is_no_data() {
    let transport = ScriptedTransport::new();
    let fetcher = StatisticsFetcher::new(&transport);
    let codes: [&str; 0] = [];

    let result = fetcher.fetch(&FetchRequest::new(2021, &codes).with_api_key(TEST_KEY));

    assert!(matches!(result, Err(IngestError::NoData { .. })));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_empty_code_skipped_when_others_have_data() {
    let transport = ScriptedTransport::new()
        .respond("518", 200, &cbp_body(&[["10", "1", "518", "06", "073"]]))
        .respond("2111", 204, "");
    let fetcher = StatisticsFetcher::new(&transport);

    let stats = fetcher
        .fetch(&FetchRequest::new(2021, &["2111", "518"]).with_api_key(TEST_KEY))
        .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats.empty_codes(), ["2111".to_string()]);
}

#[test]
fn test_http_error_aborts_remaining_codes() {
    let transport = ScriptedTransport::new()
        .respond("518", 200, &cbp_body(&[["10", "1", "518", "06", "073"]]))
        .respond("5112", 400, "error: invalid 'for' argument")
        .respond("334", 200, &cbp_body(&[["7", "1", "334", "06", "073"]]));
    let fetcher = StatisticsFetcher::new(&transport);

    let result =
        fetcher.fetch(&FetchRequest::new(2021, &["518", "5112", "334"]).with_api_key(TEST_KEY));

    match result {
        Err(IngestError::RemoteFailure {
            industry_code,
            status,
            reason,
        }) => {
            assert_eq!(industry_code, "5112");
            assert_eq!(status, Some(400));
            assert!(reason.contains("invalid 'for' argument"));
        }
        other => panic!("Expected RemoteFailure error, got {:?}", other),
    }
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_empty_error_body_uses_status_reason() {
    let transport = ScriptedTransport::new().respond("518", 503, "");
    let fetcher = StatisticsFetcher::new(&transport);

    let err = fetcher
        .fetch(&FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY))
        .unwrap_err();

    assert!(err.to_string().contains("Service Unavailable"));
}

#[test]
fn test_transport_error_is_remote_failure() {
    let transport = ScriptedTransport::new().fail("518", "operation timed out");
    let fetcher = StatisticsFetcher::new(&transport);

    let result = fetcher.fetch(&FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY));

    match result {
        Err(IngestError::RemoteFailure { status, reason, .. }) => {
            assert_eq!(status, None);
            assert_eq!(reason, "operation timed out");
        }
        other => panic!("Expected RemoteFailure error, got {:?}", other),
    }
}

#[test]
fn test_invalid_config_rejected_before_requests() {
    let transport = two_code_transport();
    let fetcher =
        StatisticsFetcher::new(&transport).with_config(FetchConfig::default().with_timeout_secs(0));

    let result = fetcher.fetch(&FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY));

    assert!(matches!(result, Err(IngestError::Configuration { .. })));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_request_debug_hides_key() {
    let request = FetchRequest::new(2021, &["518"]).with_api_key(TEST_KEY);
    let rendered = format!("{:?}", request);

    assert!(!rendered.contains(TEST_KEY));
    assert!(rendered.contains("518"));
}
