//! Core of the skiff framework: request context, middleware chain, and
//! dispatcher.
//!
//! The pieces fit together like this:
//!
//! - [`App`] is the mutable, startup-phase registration surface: routes,
//!   application middleware, [`Group`]s with prefix-scoped middleware, and
//!   the not-found/error handlers
//! - [`App::build`] freezes everything into an [`Engine`], the immutable
//!   configuration object the dispatcher reads; after `listen` begins,
//!   nothing mutates it
//! - per request, the engine builds a fresh [`Ctx`] and walks the chain:
//!   application middleware, then the middleware of every group whose
//!   prefix is contained in the path, then the matched route's own chain —
//!   outermost wrapper first, endpoint last
//! - middleware receives a [`Next`] continuation; calling it continues the
//!   chain, returning without calling it short-circuits, and returning an
//!   error aborts straight to the error policy
//!
//! Transport is hyper's; this crate never parses HTTP. See
//! [`testing::TestClient`] for socketless dispatch in tests.

#![forbid(unsafe_code)]

mod app;
mod chain;
mod config;
mod context;
mod dispatch;
mod error;
mod handler;
mod response;
mod server;
pub mod testing;

pub use app::{App, Group};
pub use chain::Next;
pub use config::{Config, DEFAULT_IO_TIMEOUT, DEFAULT_MAX_BODY_SIZE};
pub use context::{BoxError, Ctx, RequestBody};
pub use dispatch::{Engine, INTERNAL_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
pub use error::Error;
pub use handler::{
    BoxFuture, BoxHandler, Endpoint, ErrorHandler, HandlerResult, IntoRouteChain, Middleware,
};
pub use response::Response;
pub use server::serve;

// Re-export the HTTP vocabulary handlers work with.
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
