//! Per-request context.
//!
//! A [`Ctx`] is created fresh by the dispatcher for each inbound request
//! and destroyed once the response is sent. It is exclusively owned by the
//! one execution handling that request — handlers receive clones, but a
//! clone is just another handle on the same request-scoped state, never a
//! view into another request.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use http_body_util::{BodyExt, Limited};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::Error;
use crate::response::Response;

/// Boxed error type used at the transport boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The not-yet-read request body as handed over by the transport.
pub type RequestBody = http_body_util::combinators::UnsyncBoxBody<Bytes, BoxError>;

enum BodyState {
    Pending(RequestBody),
    Read(Bytes),
}

struct ResponseSlot {
    /// Headers staged by middleware before any response is written; merged
    /// into the final response without overriding its own headers.
    staged: HeaderMap,
    written: Option<Response>,
}

struct CtxInner {
    parts: Parts,
    remote_addr: Option<SocketAddr>,
    config: Config,
    body: Mutex<BodyState>,
    route_template: OnceLock<String>,
    response: Mutex<ResponseSlot>,
}

/// Request-scoped state threaded through the middleware chain.
///
/// Cloning is cheap (`Arc` inner) and every clone refers to the same
/// request. The context exposes three families of operations:
///
/// - **request reads** — method, path, headers, matched route template,
///   parameter and query extraction, body collection and JSON binding
/// - **response emission** — [`send`](Ctx::send), [`json`](Ctx::json),
///   [`redirect`](Ctx::redirect), [`send_file`](Ctx::send_file),
///   [`attachment`](Ctx::attachment), [`save_body`](Ctx::save_body)
/// - **response rewriting** — [`set_header`](Ctx::set_header) before a
///   write, [`map_response`](Ctx::map_response) after one
///
/// Emission replaces any earlier write; the dispatcher transmits exactly
/// one response per request, the last one written.
#[derive(Clone)]
pub struct Ctx {
    inner: Arc<CtxInner>,
}

impl Ctx {
    pub(crate) fn new(
        parts: Parts,
        body: RequestBody,
        remote_addr: Option<SocketAddr>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(CtxInner {
                parts,
                remote_addr,
                config,
                body: Mutex::new(BodyState::Pending(body)),
                route_template: OnceLock::new(),
                response: Mutex::new(ResponseSlot {
                    staged: HeaderMap::new(),
                    written: None,
                }),
            }),
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.parts.method
    }

    /// The raw request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.inner.parts.uri.path()
    }

    /// The raw query string, without the leading `?`. Empty when absent.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        self.inner.parts.uri.query().unwrap_or("")
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// One request header as UTF-8, if present and decodable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// The peer address, when the request arrived over a socket.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.inner.remote_addr
    }

    /// The template of the matched route, e.g. `/auth/:name`.
    ///
    /// Empty until the chain reaches route scope: application and group
    /// middleware run before route resolution and therefore see `""`.
    #[must_use]
    pub fn route_template(&self) -> &str {
        self.inner
            .route_template
            .get()
            .map_or("", String::as_str)
    }

    pub(crate) fn set_route_template(&self, template: &str) {
        let _ = self.inner.route_template.set(template.to_string());
    }

    // ------------------------------------------------------------------
    // Parameters and query
    // ------------------------------------------------------------------

    /// A named path parameter, or `""` when it cannot be resolved.
    ///
    /// The empty-string fallback (unknown name, no matched route yet, or a
    /// segment-count mismatch) means callers cannot tell "absent" from
    /// "empty" here; use [`try_param`](Ctx::try_param) for that.
    #[must_use]
    pub fn param(&self, name: &str) -> String {
        skiff_router::extract_param(self.route_template(), self.path(), name).to_string()
    }

    /// A named path parameter, `None` when it cannot be resolved.
    #[must_use]
    pub fn try_param(&self, name: &str) -> Option<String> {
        skiff_router::try_extract_param(self.route_template(), self.path(), name)
            .map(str::to_string)
    }

    /// Every named parameter of the matched route.
    #[must_use]
    pub fn params(&self) -> HashMap<String, String> {
        skiff_router::extract_all_params(self.route_template(), self.path())
    }

    /// A query parameter, or `""` when absent. First occurrence wins.
    #[must_use]
    pub fn query(&self, name: &str) -> String {
        skiff_http::query::query_param(self.raw_query(), name)
            .unwrap_or("")
            .to_string()
    }

    /// A query parameter, `None` when absent.
    #[must_use]
    pub fn try_query(&self, name: &str) -> Option<String> {
        skiff_http::query::query_param(self.raw_query(), name).map(str::to_string)
    }

    /// The full query string as a map. Duplicate keys resolve to the last
    /// occurrence.
    #[must_use]
    pub fn query_params(&self) -> HashMap<String, String> {
        skiff_http::query::parse_query(self.raw_query())
    }

    // ------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------

    /// Collects the request body, bounded by `Config::max_body_size`.
    ///
    /// The body is read from the transport once; later calls return the
    /// cached bytes. Handlers in one chain run sequentially, so there is
    /// no concurrent first read.
    pub async fn body_bytes(&self) -> Result<Bytes, Error> {
        let state = {
            let mut slot = self.inner.body.lock();
            if let BodyState::Read(bytes) = &*slot {
                return Ok(bytes.clone());
            }
            std::mem::replace(&mut *slot, BodyState::Read(Bytes::new()))
        };
        let BodyState::Pending(body) = state else {
            return Ok(Bytes::new());
        };

        let limit = self.inner.config.max_body_size;
        // Box the collect future at a concrete lifetime so the `Send` check
        // resolves here rather than leaking a higher-ranked `From` bound for
        // the body's boxed error type into the enclosing handler future.
        let collect: std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<_, BoxError>> + Send>,
        > = Box::pin(Limited::new(body, limit).collect());
        let collected = collect.await.map_err(|err| {
            if err.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
                Error::BodyTooLarge { limit }
            } else {
                Error::Body(err.to_string())
            }
        })?;
        let bytes = collected.to_bytes();
        *self.inner.body.lock() = BodyState::Read(bytes.clone());
        Ok(bytes)
    }

    /// Reads the body and deserializes it as JSON.
    pub async fn bind_json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let bytes = self.body_bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // ------------------------------------------------------------------
    // Response emission
    // ------------------------------------------------------------------

    /// Sends raw bytes with a status. No `Content-Type` is set.
    ///
    /// Always succeeds; the `Result` return lets handlers end with
    /// `ctx.send(...)` directly.
    pub fn send(&self, status: StatusCode, body: impl Into<Bytes>) -> Result<(), Error> {
        self.write(Response::new(status).with_body(body));
        Ok(())
    }

    /// Serializes `payload` as JSON and sends it with the given status and
    /// an `application/json` content type.
    pub fn json<T: Serialize + ?Sized>(&self, status: StatusCode, payload: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(payload)?;
        self.write(
            Response::new(status)
                .with_header(
                    CONTENT_TYPE,
                    HeaderValue::from_static(skiff_http::APPLICATION_JSON),
                )
                .with_body(body),
        );
        Ok(())
    }

    /// Sends a redirect. The status must be in `300..=308`.
    pub fn redirect(&self, status: StatusCode, location: &str) -> Result<(), Error> {
        if !(300..=308).contains(&status.as_u16()) {
            return Err(Error::InvalidRedirect(status));
        }
        let value = HeaderValue::from_str(location)
            .map_err(|_| Error::msg(format!("invalid redirect location `{location}`")))?;
        self.write(Response::new(status).with_header(LOCATION, value));
        Ok(())
    }

    /// Reads a file and sends it with a content type derived from its
    /// extension. Bounded by `Config::io_timeout`.
    pub async fn send_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let timeout = self.inner.config.io_timeout;
        let bytes = tokio::time::timeout(timeout, tokio::fs::read(path))
            .await
            .map_err(|_| Error::Timeout(timeout))??;
        let content_type = skiff_http::fs::content_type_for(path);
        self.write(
            Response::new(StatusCode::OK)
                .with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
                .with_body(bytes),
        );
        Ok(())
    }

    /// Sends a file as a download with a `Content-Disposition` attachment
    /// header. An empty `filename` lets the client choose the name.
    pub async fn attachment(&self, path: impl AsRef<Path>, filename: &str) -> Result<(), Error> {
        self.send_file(path).await?;
        let header = skiff_http::fs::attachment_header(filename);
        let value = HeaderValue::from_str(&header)
            .map_err(|_| Error::msg(format!("invalid attachment filename `{filename}`")))?;
        self.map_response(|response| {
            response.headers_mut().insert(CONTENT_DISPOSITION, value);
        });
        Ok(())
    }

    /// Accepts an upload: collects the request body and writes it to
    /// `path`. Bounded by `Config::max_body_size` and `Config::io_timeout`.
    pub async fn save_body(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let bytes = self.body_bytes().await?;
        let timeout = self.inner.config.io_timeout;
        tokio::time::timeout(timeout, tokio::fs::write(path.as_ref(), &bytes))
            .await
            .map_err(|_| Error::Timeout(timeout))??;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Response rewriting
    // ------------------------------------------------------------------

    /// Sets a response header.
    ///
    /// Before any response is written the header is staged and merged into
    /// whatever response the chain eventually produces (the response's own
    /// headers win on conflict). After a write it lands on the written
    /// response directly.
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        let mut slot = self.inner.response.lock();
        match slot.written.as_mut() {
            Some(response) => {
                response.headers_mut().insert(name, value);
            }
            None => {
                slot.staged.insert(name, value);
            }
        }
    }

    /// Appends a response header, keeping existing values for the name.
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        let mut slot = self.inner.response.lock();
        match slot.written.as_mut() {
            Some(response) => {
                response.headers_mut().append(name, value);
            }
            None => {
                slot.staged.append(name, value);
            }
        }
    }

    /// Rewrites the written response in place.
    ///
    /// A no-op when nothing has been written yet, so wrapping middleware
    /// can call it unconditionally after `next.run`.
    pub fn map_response(&self, f: impl FnOnce(&mut Response)) {
        let mut slot = self.inner.response.lock();
        if let Some(response) = slot.written.as_mut() {
            f(response);
        }
    }

    /// The status of the response written so far, if any.
    #[must_use]
    pub fn response_status(&self) -> Option<StatusCode> {
        self.inner.response.lock().written.as_ref().map(Response::status)
    }

    fn write(&self, response: Response) {
        self.inner.response.lock().written = Some(response);
    }

    /// Takes the final response, merging staged headers. An untouched
    /// context yields an empty `200`, matching the underlying server's
    /// behavior when a handler writes nothing.
    pub(crate) fn finalize(&self) -> Response {
        let mut slot = self.inner.response.lock();
        let staged = std::mem::take(&mut slot.staged);
        let mut response = slot
            .written
            .take()
            .unwrap_or_else(|| Response::new(StatusCode::OK));
        let own: Vec<HeaderName> = response.headers().keys().cloned().collect();
        for (name, value) in &staged {
            if !own.contains(name) {
                response.headers_mut().append(name.clone(), value.clone());
            }
        }
        response
    }
}

impl std::fmt::Debug for Ctx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ctx")
            .field("method", &self.inner.parts.method)
            .field("path", &self.path())
            .field("route_template", &self.route_template())
            .finish_non_exhaustive()
    }
}
