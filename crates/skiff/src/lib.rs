//! skiff — a small, middleware-first HTTP framework.
//!
//! Routes are plain templates with `:name` parameters, handlers are async
//! functions over a request context, and middleware composes at three
//! scopes (application, group, route) with explicit `Next` continuations.
//!
//! # Quick Start
//!
//! ```ignore
//! use skiff::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let mut app = App::new();
//!
//!     app.get("/hey", |ctx: Ctx| async move {
//!         ctx.send(StatusCode::OK, "hey")
//!     });
//!
//!     let mut auth = app.group("/auth");
//!     auth.get("/:name", |ctx: Ctx| async move {
//!         ctx.send(StatusCode::OK, ctx.param("name"))
//!     });
//!
//!     app.listen("127.0.0.1:3000").await
//! }
//! ```
//!
//! # Crate Structure
//!
//! - [`skiff_router`] — route template compilation and the route table
//! - [`skiff_http`] — query-string and filesystem glue
//! - [`skiff_core`] — request context, middleware chain, dispatcher,
//!   serving loop, test client
//! - this crate — the public facade plus bundled [`middleware`]

#![forbid(unsafe_code)]

// Re-export the member crates under their own names.
pub use skiff_core;
pub use skiff_http;
pub use skiff_router;

// The surface most applications touch.
pub use skiff_core::{
    App, BoxHandler, Config, Ctx, DEFAULT_IO_TIMEOUT, DEFAULT_MAX_BODY_SIZE, Endpoint, Engine,
    Error, ErrorHandler, Group, HandlerResult, HeaderMap, HeaderName, HeaderValue,
    INTERNAL_ERROR_MESSAGE, IntoRouteChain, Method, Middleware, NOT_FOUND_MESSAGE, Next, Response,
    StatusCode, Uri, serve,
};

// Re-export testing utilities.
pub use skiff_core::testing;

pub mod middleware;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::middleware::{compress, cors, logger};
    pub use crate::{
        App, Config, Ctx, Error, Group, HandlerResult, Method, Next, StatusCode,
    };
}
