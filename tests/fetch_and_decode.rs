//! End-to-end fetch and decode against a local mock server
//!
//! Run with: cargo test --test fetch_and_decode

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{IOS_FIXTURE, MACOS_FIXTURE, load_fixture, serve, serve_json, serve_truncated};
use sofafeed::{
    CancellationToken, DecodeError, Error, FeedConfig, FeedFetcher, FeedKind, FetchArgs,
    FetchError, Ios, MacOS, Stage, fetch, fetch_and_decode, fetch_and_decode_ios,
    fetch_and_decode_kind, fetch_and_decode_macos,
};
use std::time::Duration;
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MACOS_PATH: &str = "/v1/macos_data_feed.json";
const IOS_PATH: &str = "/v1/ios_data_feed.json";

fn mirror_config(server: &MockServer) -> FeedConfig {
    FeedConfig {
        macos_url: format!("{}{MACOS_PATH}", server.uri()),
        ios_url: format!("{}{IOS_PATH}", server.uri()),
        ..Default::default()
    }
}

#[tokio::test]
async fn macos_feed_end_to_end() {
    let mock_server = serve_json(MACOS_PATH, load_fixture(MACOS_FIXTURE)).await;
    let args = FetchArgs::with_url(format!("{}{MACOS_PATH}", mock_server.uri()));

    let feed = fetch_and_decode_macos(&CancellationToken::new(), &args)
        .await
        .unwrap();

    assert_eq!(feed.os_versions.len(), 3);
    assert_eq!(feed.xprotect_payloads().unwrap().xprotect, "149");
    assert_eq!(
        feed.installation_apps().unwrap().latest_mac_ipsw.build,
        "24D60"
    );
}

#[tokio::test]
async fn ios_feed_end_to_end() {
    let mock_server = serve_json(IOS_PATH, load_fixture(IOS_FIXTURE)).await;
    let args = FetchArgs::with_url(format!("{}{IOS_PATH}", mock_server.uri()));

    let feed = fetch_and_decode_ios(&CancellationToken::new(), &args)
        .await
        .unwrap();
    assert_eq!(feed.latest("18").unwrap().build, "22D63");
}

#[tokio::test]
async fn fetcher_routes_each_kind_to_its_endpoint() {
    let mock_server = MockServer::start().await;
    for (route, fixture) in [(MACOS_PATH, MACOS_FIXTURE), (IOS_PATH, IOS_FIXTURE)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(load_fixture(fixture), "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let fetcher = FeedFetcher::new(mirror_config(&mock_server)).unwrap();
    let cancel = CancellationToken::new();

    let mac = fetcher
        .fetch_and_decode(&cancel, FeedKind::MacOS, &FetchArgs::default())
        .await
        .unwrap();
    assert_eq!(mac.kind(), FeedKind::MacOS);
    assert!(mac.models().is_some());

    let ios = fetcher
        .fetch_and_decode(&cancel, "iOS", &FetchArgs::default())
        .await
        .unwrap();
    assert_eq!(ios.kind(), FeedKind::Ios);
    assert!(ios.models().is_none());
}

#[tokio::test]
async fn generic_entry_point_decodes_requested_shape() {
    let mock_server = serve_json(MACOS_PATH, load_fixture(MACOS_FIXTURE)).await;
    let args = FetchArgs::with_url(format!("{}{MACOS_PATH}", mock_server.uri()));
    let cancel = CancellationToken::new();

    let mac = fetch_and_decode_kind::<MacOS>(&cancel, &args).await.unwrap();
    assert!(mac.model("Mac15,13").is_some());

    let as_ios = fetch_and_decode_kind::<Ios>(&cancel, &args).await.unwrap();
    assert_eq!(as_ios.update_hash, mac.update_hash);
    assert_eq!(as_ios.os_versions.len(), mac.os_versions.len());
}

#[tokio::test]
async fn requests_carry_json_accept_and_library_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(IOS_PATH))
        .and(header("Accept", "application/json"))
        .and(header_regex("User-Agent", r"^sofafeed/\d+\.\d+\.\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(load_fixture(IOS_FIXTURE), "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let args = FetchArgs::with_url(format!("{}{IOS_PATH}", mock_server.uri()));
    let bytes = fetch(&CancellationToken::new(), FeedKind::Ios, &args)
        .await
        .unwrap();
    assert_eq!(bytes.len(), load_fixture(IOS_FIXTURE).len());
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("User-Agent", "fleet-audit/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"OSVersions": []}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = FeedFetcher::new(FeedConfig {
        user_agent: "fleet-audit/1.0".into(),
        ..mirror_config(&mock_server)
    })
    .unwrap();

    let feed = fetcher
        .fetch_ios(&CancellationToken::new(), &FetchArgs::default())
        .await
        .unwrap();
    assert!(feed.os_versions.is_empty());
}

#[tokio::test]
async fn not_found_is_fetch_stage_error() {
    let mock_server = serve(MACOS_PATH, ResponseTemplate::new(404).set_body_string("gone")).await;
    let args = FetchArgs::with_url(format!("{}{MACOS_PATH}", mock_server.uri()));

    let err = fetch_and_decode(&CancellationToken::new(), "macos", &args)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Fetch);
    assert_eq!(err.error_code(), "unexpected_status");
    match err {
        Error::Fetch(fetch_err) => assert_eq!(fetch_err.status(), Some(404)),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn interrupted_body_is_fetch_stage_error() {
    let url = serve_truncated(1000, br#"{"UpdateHash": "#).await;

    let err = fetch_and_decode_ios(&CancellationToken::new(), &FetchArgs::with_url(url))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Fetch);
    assert_eq!(err.error_code(), "read_body_failed");
    match err {
        Error::Fetch(fetch_err) => {
            assert!(matches!(fetch_err, FetchError::ReadBody { .. }), "{fetch_err:?}");
            assert!(!fetch_err.is_transport());
        }
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn null_fields_decode_end_to_end() {
    let body = br#"{"UpdateHash": null, "OSVersions": [{"OSVersion": "18", "Latest": null, "SecurityReleases": [{"ProductVersion": "18.3", "CVEs": null, "UniqueCVEsCount": -1}]}]}"#;
    let mock_server = serve_json(IOS_PATH, body.to_vec()).await;
    let args = FetchArgs::with_url(format!("{}{IOS_PATH}", mock_server.uri()));

    let feed = fetch_and_decode_ios(&CancellationToken::new(), &args)
        .await
        .unwrap();
    assert_eq!(feed.update_hash, "");
    let release = feed.os_version("18").unwrap().security_release("18.3").unwrap();
    assert!(release.cves.is_empty());
    assert_eq!(release.unique_cves_count, -1);
}

#[tokio::test]
async fn unknown_discriminator_sends_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let args = FetchArgs::with_url(mock_server.uri());
    let err = fetch(&CancellationToken::new(), "android", &args)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Select);
    assert_eq!(err.error_code(), "unknown_feed_kind");
}

#[tokio::test]
async fn truncated_body_is_decode_stage_error() {
    let mut body = load_fixture(MACOS_FIXTURE);
    body.truncate(body.len() / 2);
    let mock_server = serve_json(MACOS_PATH, body).await;
    let args = FetchArgs::with_url(format!("{}{MACOS_PATH}", mock_server.uri()));

    let err = fetch_and_decode_macos(&CancellationToken::new(), &args)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Decode);
    assert!(matches!(err, Error::Decode(DecodeError::Syntax { .. })), "{err:?}");
}

#[tokio::test]
async fn bad_release_date_is_timestamp_error() {
    let body = br#"{"OSVersions": [{"OSVersion": "18", "SecurityReleases": [{"ReleaseDate": "2025-13-45"}]}]}"#;
    let mock_server = serve_json(IOS_PATH, body.to_vec()).await;
    let args = FetchArgs::with_url(format!("{}{IOS_PATH}", mock_server.uri()));

    let err = fetch_and_decode_ios(&CancellationToken::new(), &args)
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Decode(DecodeError::InvalidTimestamp { .. })),
        "{err:?}"
    );
}

#[tokio::test]
async fn caller_client_timeout_is_honoured() {
    let mock_server = serve(
        IOS_PATH,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(5))
            .set_body_raw(load_fixture(IOS_FIXTURE), "application/json"),
    )
    .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let args = FetchArgs {
        client: Some(client),
        url: Some(format!("{}{IOS_PATH}", mock_server.uri())),
    };

    let err = fetch_and_decode_ios(&CancellationToken::new(), &args)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            Error::Fetch(FetchError::Transport {
                timed_out: true,
                ..
            })
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn cancellation_stops_pipeline() {
    let mock_server = serve(
        MACOS_PATH,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(10))
            .set_body_raw(load_fixture(MACOS_FIXTURE), "application/json"),
    )
    .await;
    let args = FetchArgs::with_url(format!("{}{MACOS_PATH}", mock_server.uri()));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = fetch_and_decode_macos(&cancel, &args).await.unwrap_err();
    assert_eq!(err.error_code(), "cancelled");
    assert_eq!(err.stage(), Stage::Fetch);
}

#[tokio::test]
async fn concurrent_fetches_share_one_fetcher() {
    let mock_server = serve_json(IOS_PATH, load_fixture(IOS_FIXTURE)).await;
    let fetcher = FeedFetcher::new(mirror_config(&mock_server))
        .unwrap()
        .with_client(reqwest::Client::new());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let fetcher = fetcher.clone();
        handles.push(tokio::spawn(async move {
            fetcher
                .fetch_ios(&CancellationToken::new(), &FetchArgs::default())
                .await
        }));
    }

    for handle in handles {
        let feed = handle.await.unwrap().unwrap();
        assert_eq!(feed.os_versions.len(), 3);
    }
}
