// tests/sources_http_test.rs — Integration test: HTTP adapters against a local mock server

use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use resilience::core::ResilienceEngine;
use resilience::infra::config::Config;
use resilience::infra::errors::ResilienceError;
use resilience::scoring::Pillar;
use resilience::sources::gdelt::GdeltClient;
use resilience::sources::world_bank::WorldBankClient;
use resilience::sources::{Dataset, EventSource, Observation, StatisticalSource};

fn series_body(rows: serde_json::Value) -> serde_json::Value {
    json!([{"page": 1, "pages": 1, "per_page": 100, "total": 2}, rows])
}

#[tokio::test]
async fn test_world_bank_fetches_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/country/KEN/indicator/SP.DYN.LE00.IN"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(json!([
            {"date": "2023", "value": null},
            {"date": "2022", "value": 61.4}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = WorldBankClient::new(format!("{}/v2", server.uri()), 4);
    let obs = client
        .fetch_series("KEN", "SP.DYN.LE00.IN", Dataset::Development)
        .await
        .unwrap();

    assert_eq!(
        obs,
        vec![
            Observation { year: 2023, value: None },
            Observation { year: 2022, value: Some(61.4) },
        ]
    );
}

#[tokio::test]
async fn test_world_bank_governance_requests_wgi_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/country/KEN/indicator/RL.EST"))
        .and(query_param("source", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(series_body(json!([{"date": "2022", "value": -0.45}]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = WorldBankClient::new(format!("{}/v2", server.uri()), 4);
    let obs = client
        .fetch_series("KEN", "RL.EST", Dataset::Governance)
        .await
        .unwrap();
    assert_eq!(obs, vec![Observation { year: 2022, value: Some(-0.45) }]);
}

#[tokio::test]
async fn test_world_bank_http_error_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = WorldBankClient::new(server.uri(), 4);
    let err = client
        .fetch_series("KEN", "SP.DYN.LE00.IN", Dataset::Development)
        .await
        .unwrap_err();

    match &err {
        ResilienceError::Status { status, body, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(body.as_str(), "upstream down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_world_bank_unknown_indicator_message_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"message": [{
                "id": "120",
                "key": "Invalid value",
                "value": "The provided parameter value is not valid"
            }]}
        ])))
        .mount(&server)
        .await;

    let client = WorldBankClient::new(server.uri(), 4);
    let err = client
        .fetch_series("KEN", "NOT.A.CODE", Dataset::Development)
        .await
        .unwrap_err();
    assert!(matches!(err, ResilienceError::Source { .. }));
}

#[tokio::test]
async fn test_gdelt_counts_articles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/doc/doc"))
        .and(query_param("mode", "artlist"))
        .and(query_param("format", "json"))
        .and(query_param("query", "\"Kenya\" (protest)"))
        .and(query_param("timespan", "1y"))
        .and(query_param("maxrecords", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [
                {
                    "url": "https://news.example/1",
                    "title": "A",
                    "seendate": "20240101T000000Z",
                    "sourcecountry": "Kenya"
                },
                {"url": "https://news.example/2", "title": "B"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        GdeltClient::new(format!("{}/api/v2/doc/doc", server.uri()), 2).with_window("1y", 50);
    let events = client.fetch_events("\"Kenya\" (protest)").await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].source_country.as_deref(), Some("Kenya"));
    assert!(events[1].seen_at.is_none());
}

#[tokio::test]
async fn test_gdelt_empty_object_means_no_events() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = GdeltClient::new(server.uri(), 2);
    assert!(client.fetch_events("\"Kenya\" (riot)").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_gdelt_plain_text_error_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Your search contained a phrase that was too short."),
        )
        .mount(&server)
        .await;

    let client = GdeltClient::new(server.uri(), 2);
    let err = client.fetch_events("\"X\" (a)").await.unwrap_err();
    match err {
        ResilienceError::Decode { message, .. } => assert!(message.contains("too short")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_engine_from_config_against_mock_services() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/country/KEN/indicator/EG.ELC.ACCS.ZS"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(series_body(json!([{"date": "2022", "value": 76.5}]))),
        )
        .with_priority(1)
        .mount(&server)
        .await;

    // Every other series exists but has no rows.
    Mock::given(method("GET"))
        .and(path_regex(r"^/v2/country/KEN/indicator/.+$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"page": 0, "total": 0}, null])),
        )
        .mount(&server)
        .await;

    // Event search is down.
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.sources.world_bank_base_url = format!("{}/v2", server.uri());
    config.sources.gdelt_base_url = format!("{}/doc", server.uri());
    config.sources.fetch_timeout_seconds = 5;

    let engine = ResilienceEngine::from_config(&config).unwrap();
    let model = engine.model_score("KEN", "Kenya").await;

    let infra = model.pillar(Pillar::Infrastructure);
    assert!((infra.coverage - 0.25).abs() < 1e-9);
    assert!((infra.score - 76.5).abs() < 1e-9);
    assert_eq!(infra.indicators["electricity_access"].year, Some(2022));
    assert_eq!(model.pillar(Pillar::Social).coverage, 0.0);
    assert!((model.overall - 76.5 / 4.0).abs() < 1e-9);
}
