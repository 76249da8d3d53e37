//! Feed fixtures and mock-server helpers

use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Abridged macOS feed snapshot
pub const MACOS_FIXTURE: &str = "sofafeed-macos-v1.json";

/// Abridged iOS feed snapshot
pub const IOS_FIXTURE: &str = "sofafeed-ios-v1.json";

/// Path under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Raw bytes of a fixture file
pub fn load_fixture(name: &str) -> Vec<u8> {
    let path = fixture_path(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Start a mock server answering `GET route` with `body` and status 200
pub async fn serve_json(route: &str, body: Vec<u8>) -> MockServer {
    serve(route, ResponseTemplate::new(200).set_body_raw(body, "application/json")).await
}

/// Start a mock server answering `GET route` with `template`
pub async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

/// Serve one request with a 200 whose body ends after `sent` of the `declared`
/// Content-Length bytes, then close the connection. Returns the URL to fetch.
pub async fn serve_truncated(declared: usize, sent: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {declared}\r\n\r\n"
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(sent).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/feed.json")
}
