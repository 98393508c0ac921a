//! The dispatcher: one entry point per inbound request.
//!
//! An [`Engine`] is the frozen form of an `App`: every registry it holds —
//! route table, application middleware, group middleware, the not-found
//! and error handlers — is built during single-threaded startup and only
//! read afterwards. That build-time/run-time split is what makes
//! concurrent dispatch safe without locks.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use http::request::Parts;

use skiff_router::RouteTable;

use crate::chain::Next;
use crate::config::Config;
use crate::context::{Ctx, RequestBody};
use crate::error::Error;
use crate::handler::{BoxHandler, Endpoint, ErrorHandler};
use crate::response::Response;

/// Body of the built-in 404 response.
pub const NOT_FOUND_MESSAGE: &str = "Not Found, Check URL";

/// Body of the built-in 500 response used when a configured error handler
/// itself fails.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Middleware registered under one group prefix, in registration order.
pub(crate) struct GroupMiddleware {
    pub(crate) prefix: String,
    pub(crate) handlers: Vec<BoxHandler>,
}

/// Immutable dispatch configuration, shared across all connections.
pub struct Engine {
    config: Config,
    app_middleware: Vec<BoxHandler>,
    groups: Vec<GroupMiddleware>,
    table: RouteTable<BoxHandler>,
    not_found: Option<Box<dyn Endpoint>>,
    error_handler: Option<Box<dyn ErrorHandler>>,
}

impl Engine {
    pub(crate) fn new(
        config: Config,
        app_middleware: Vec<BoxHandler>,
        groups: Vec<GroupMiddleware>,
        table: RouteTable<BoxHandler>,
        not_found: Option<Box<dyn Endpoint>>,
        error_handler: Option<Box<dyn ErrorHandler>>,
    ) -> Self {
        Self {
            config,
            app_middleware,
            groups,
            table,
            not_found,
            error_handler,
        }
    }

    /// The configuration requests run under.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of registered routes, across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.table.route_count()
    }

    pub(crate) fn app_middleware(&self) -> &[BoxHandler] {
        &self.app_middleware
    }

    pub(crate) fn group_handlers(&self, group: usize) -> &[BoxHandler] {
        &self.groups[group].handlers
    }

    pub(crate) fn table(&self) -> &RouteTable<BoxHandler> {
        &self.table
    }

    pub(crate) fn not_found_handler(&self) -> Option<&dyn Endpoint> {
        self.not_found.as_deref()
    }

    /// Dispatches one request and produces its single response.
    ///
    /// Builds a fresh [`Ctx`], runs the chain from application scope, and
    /// applies the error policy to any error that propagates out. The
    /// per-request state machine is strictly forward: no scope is entered
    /// twice and nothing loops back to the start.
    pub async fn dispatch(
        self: Arc<Self>,
        parts: Parts,
        body: RequestBody,
        remote_addr: Option<SocketAddr>,
    ) -> Response {
        let ctx = Ctx::new(parts, body, remote_addr, self.config.clone());
        tracing::debug!(method = %ctx.method(), path = ctx.path(), "dispatching");

        let groups = Arc::new(self.qualifying_groups(ctx.path()));
        let outcome = Next::entry(Arc::clone(&self), groups)
            .run(ctx.clone())
            .await;
        if let Err(err) = outcome {
            self.apply_error_policy(&ctx, err).await;
        }
        ctx.finalize()
    }

    /// Indexes of groups whose prefix is contained in `path` and that
    /// carry middleware, in group registration order.
    fn qualifying_groups(&self, path: &str) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, group)| {
                !group.handlers.is_empty() && path.contains(group.prefix.as_str())
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Exactly one policy decision per propagated error: the configured
    /// handler if present, else a 500 carrying the error's message. A
    /// handler that itself errors falls back to a fixed 500 body.
    async fn apply_error_policy(&self, ctx: &Ctx, err: Error) {
        match &self.error_handler {
            Some(handler) => {
                tracing::debug!(error = %err, "invoking error handler");
                if let Err(secondary) = handler.call(ctx.clone(), err).await {
                    tracing::error!(error = %secondary, "error handler failed");
                    let _ = ctx.send(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
                }
            }
            None => {
                tracing::debug!(error = %err, "no error handler configured, sending default 500");
                let _ = ctx.send(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("routes", &self.table.route_count())
            .field("app_middleware", &self.app_middleware.len())
            .field("groups", &self.groups.len())
            .field("not_found", &self.not_found.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
