//! Behavior of the bundled middleware.

use std::io::Read;

use skiff::middleware::{CorsConfig, compress, cors, cors_with_config, logger};
use skiff::testing::TestClient;
use skiff::{App, Ctx, Error, Method, StatusCode};

fn hello_app() -> App {
    let mut app = App::new();
    app.get("/hello", |ctx: Ctx| async move { ctx.send(StatusCode::OK, "hello world") });
    app
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn cors_sets_allow_origin_on_plain_requests() {
    let mut app = hello_app();
    app.middleware(cors());

    let client = TestClient::new(app);
    let response = client
        .request(Method::GET, "/hello")
        .header("origin", "https://example.com")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "hello world");
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(response.header("vary"), Some("Origin"));
}

#[tokio::test]
async fn cors_preflight_short_circuits_with_no_content() {
    let mut app = hello_app();
    app.middleware(cors());

    let client = TestClient::new(app);
    let response = client
        .request(Method::OPTIONS, "/hello")
        .header("origin", "https://example.com")
        .header("access-control-request-method", "GET")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().is_empty());
    let methods = response.header("access-control-allow-methods").unwrap();
    assert!(methods.contains("GET"));
    assert!(methods.contains("DELETE"));
}

#[tokio::test]
async fn cors_with_credentials_echoes_the_request_origin() {
    let mut app = hello_app();
    app.middleware(cors_with_config(CorsConfig {
        allow_credentials: true,
        ..CorsConfig::default()
    }));

    let client = TestClient::new(app);
    let response = client
        .request(Method::GET, "/hello")
        .header("origin", "https://example.com")
        .send()
        .await;
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("https://example.com")
    );
    assert_eq!(
        response.header("access-control-allow-credentials"),
        Some("true")
    );
}

#[tokio::test]
async fn cors_preflight_echoes_requested_headers_when_unconfigured() {
    let mut app = hello_app();
    app.middleware(cors());

    let client = TestClient::new(app);
    let response = client
        .request(Method::OPTIONS, "/hello")
        .header("origin", "https://example.com")
        .header("access-control-request-headers", "x-custom,content-type")
        .send()
        .await;
    assert_eq!(
        response.header("access-control-allow-headers"),
        Some("x-custom,content-type")
    );
}

#[tokio::test]
async fn cors_with_allow_list_rejects_unlisted_origins() {
    let mut app = hello_app();
    app.middleware(cors_with_config(CorsConfig {
        allow_origins: vec!["https://allowed.example".to_string()],
        ..CorsConfig::default()
    }));

    let client = TestClient::new(app);
    let response = client
        .request(Method::GET, "/hello")
        .header("origin", "https://other.example")
        .send()
        .await;
    // Unlisted origins get an empty allow-origin value.
    assert_eq!(response.header("access-control-allow-origin"), Some(""));
}

// ============================================================================
// Compression
// ============================================================================

fn gunzip(bytes: &[u8]) -> Vec<u8> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    out
}

#[tokio::test]
async fn compress_gzips_when_the_client_accepts_it() {
    let mut app = hello_app();
    app.middleware(compress());

    let client = TestClient::new(app);
    let response = client
        .request(Method::GET, "/hello")
        .header("accept-encoding", "gzip, deflate")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("content-encoding"), Some("gzip"));
    assert_eq!(gunzip(response.bytes()), b"hello world");
}

#[tokio::test]
async fn compress_is_a_noop_without_accept_encoding() {
    let mut app = hello_app();
    app.middleware(compress());

    let client = TestClient::new(app);
    let response = client.get("/hello").await;
    assert_eq!(response.header("content-encoding"), None);
    assert_eq!(response.text(), "hello world");
}

#[tokio::test]
async fn compress_leaves_empty_bodies_alone() {
    let mut app = App::new();
    app.middleware(compress());
    app.get("/empty", |ctx: Ctx| async move { ctx.send(StatusCode::NO_CONTENT, "") });

    let client = TestClient::new(app);
    let response = client
        .request(Method::GET, "/empty")
        .header("accept-encoding", "gzip")
        .send()
        .await;
    assert_eq!(response.header("content-encoding"), None);
    assert!(response.bytes().is_empty());
}

// ============================================================================
// Logger
// ============================================================================

#[tokio::test]
async fn logger_passes_responses_through() {
    let mut app = hello_app();
    app.middleware(logger());

    let client = TestClient::new(app);
    let response = client.get("/hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "hello world");
}

#[tokio::test]
async fn logger_repropagates_errors() {
    let mut app = App::new();
    app.middleware(logger());
    app.get("/boom", |_ctx: Ctx| async move { Err(Error::msg("boom")) });

    let client = TestClient::new(app);
    let response = client.get("/boom").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "boom");
}
