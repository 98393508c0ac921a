//! Cross-origin resource sharing.
//!
//! Reference <https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS>.

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use http::{HeaderValue, Method, StatusCode};

use skiff_core::{Ctx, Error, Middleware, Next};

/// Configuration for the CORS middleware.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Origins allowed to make cross-origin requests; `"*"` allows any.
    pub allow_origins: Vec<String>,
    /// Methods advertised on preflight responses.
    pub allow_methods: Vec<Method>,
    /// Headers advertised on preflight responses. When empty, the
    /// preflight echoes the client's requested headers.
    pub allow_headers: Vec<String>,
    /// Headers exposed to the client on actual responses.
    pub expose_headers: Vec<String>,
    /// Whether credentialed requests are allowed. With a `"*"` origin
    /// list, the request's own origin is echoed back instead of `*`.
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds; 0 omits the header.
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec![
                Method::GET,
                Method::HEAD,
                Method::PUT,
                Method::PATCH,
                Method::POST,
                Method::DELETE,
            ],
            allow_headers: Vec::new(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: 0,
        }
    }
}

impl CorsConfig {
    fn resolve_origin(&self, request_origin: &str) -> String {
        for allowed in &self.allow_origins {
            if allowed == "*" && self.allow_credentials {
                return request_origin.to_string();
            }
            if allowed == "*" || allowed == request_origin {
                return allowed.clone();
            }
        }
        String::new()
    }
}

/// CORS middleware with the default config.
#[must_use]
pub fn cors() -> impl Middleware {
    cors_with_config(CorsConfig::default())
}

/// CORS middleware with an explicit config.
///
/// Preflight `OPTIONS` requests are answered directly with `204` and never
/// reach route resolution; all other requests get the response headers set
/// before the rest of the chain runs.
#[must_use]
pub fn cors_with_config(config: CorsConfig) -> impl Middleware {
    move |ctx: Ctx, next: Next| {
        let config = config.clone();
        async move {
            let request_origin = ctx.header(ORIGIN.as_str()).unwrap_or("").to_string();
            let allow_origin = header_value(&config.resolve_origin(&request_origin))?;

            if *ctx.method() != Method::OPTIONS {
                ctx.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
                ctx.append_header(VARY, HeaderValue::from_static("Origin"));
                if config.allow_credentials {
                    ctx.set_header(
                        ACCESS_CONTROL_ALLOW_CREDENTIALS,
                        HeaderValue::from_static("true"),
                    );
                }
                if !config.expose_headers.is_empty() {
                    ctx.set_header(
                        ACCESS_CONTROL_EXPOSE_HEADERS,
                        header_value(&config.expose_headers.join(","))?,
                    );
                }
                return next.run(ctx).await;
            }

            // Preflight: answer here, short-circuiting the chain.
            ctx.append_header(VARY, HeaderValue::from_static("Origin"));
            ctx.append_header(VARY, HeaderValue::from_static("Access-Control-Request-Method"));
            ctx.append_header(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
            ctx.set_header(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
            let methods = config
                .allow_methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(",");
            ctx.set_header(ACCESS_CONTROL_ALLOW_METHODS, header_value(&methods)?);
            if config.allow_credentials {
                ctx.set_header(
                    ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }
            if config.allow_headers.is_empty() {
                if let Some(requested) = ctx.header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()) {
                    if !requested.is_empty() {
                        ctx.set_header(ACCESS_CONTROL_ALLOW_HEADERS, header_value(requested)?);
                    }
                }
            } else {
                ctx.set_header(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    header_value(&config.allow_headers.join(","))?,
                );
            }
            if config.max_age > 0 {
                ctx.set_header(
                    ACCESS_CONTROL_MAX_AGE,
                    header_value(&config.max_age.to_string())?,
                );
            }
            ctx.send(StatusCode::NO_CONTENT, "")
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| Error::msg(format!("invalid header value `{value}`")))
}
