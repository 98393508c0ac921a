//! In-process test client.
//!
//! [`TestClient`] freezes an `App` and drives [`Engine::dispatch`]
//! directly — no sockets, no transport — so dispatch behavior can be
//! asserted deterministically.
//!
//! ```ignore
//! let mut app = App::new();
//! app.get("/hey", |ctx: Ctx| async move { ctx.send(StatusCode::OK, "hey") });
//!
//! let client = TestClient::new(app);
//! let response = client.get("/hey").await;
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.text(), "hey");
//! ```

use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::App;
use crate::context::BoxError;
use crate::dispatch::Engine;

/// Drives an engine with synthetic requests.
pub struct TestClient {
    engine: Arc<Engine>,
}

impl TestClient {
    /// Freezes `app` and wraps its engine.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self {
            engine: Arc::new(app.build()),
        }
    }

    /// Starts building a request. `path` may carry a query string.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> TestRequest {
        TestRequest {
            engine: Arc::clone(&self.engine),
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sends a bare GET.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).send().await
    }

    /// Sends a bare POST.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Method::POST, path).send().await
    }

    /// Sends a bare PUT.
    pub async fn put(&self, path: &str) -> TestResponse {
        self.request(Method::PUT, path).send().await
    }

    /// Sends a bare DELETE.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path).send().await
    }
}

/// A request under construction.
pub struct TestRequest {
    engine: Arc<Engine>,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl TestRequest {
    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = name.parse().expect("invalid test header name");
        let value: HeaderValue = value.parse().expect("invalid test header value");
        self.headers.insert(name, value);
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `payload` as the JSON body and sets the content type.
    #[must_use]
    pub fn json<T: Serialize>(mut self, payload: &T) -> Self {
        self.body = serde_json::to_vec(payload)
            .expect("test payload serializes")
            .into();
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(skiff_http::APPLICATION_JSON),
        );
        self
    }

    /// Dispatches the request and captures the response.
    pub async fn send(self) -> TestResponse {
        let (mut parts, ()) = http::Request::new(()).into_parts();
        parts.method = self.method;
        parts.uri = self.path.parse::<Uri>().expect("invalid test request path");
        parts.headers = self.headers;

        let body = Full::new(self.body)
            .map_err(|never| -> BoxError { match never {} })
            .boxed_unsync();
        let response = Arc::clone(&self.engine).dispatch(parts, body, None).await;
        TestResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }
}

/// A captured response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// One header as UTF-8, if present and decodable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The raw body.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON, panicking on mismatch.
    #[must_use]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is valid json")
    }
}
