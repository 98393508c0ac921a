//! The handler contract.
//!
//! Two shapes of handler exist, distinguished by whether they receive the
//! chain continuation:
//!
//! - an [`Endpoint`] takes only the context and terminates a chain
//! - a [`Middleware`] also takes [`Next`] and decides whether the rest of
//!   the chain runs: `next.run(ctx).await` continues it, returning without
//!   that call short-circuits it
//!
//! Both are implemented automatically for async functions and closures of
//! the matching arity. `Next` is consumed by value, so invoking it twice
//! from one handler is a compile error rather than a runtime surprise.
//!
//! [`IntoRouteChain`] is what route registration accepts: either a bare
//! endpoint, or a tuple `(endpoint, mw, ...)` that reads left-to-right as
//! *terminal handler, then innermost wrapper, then outermost wrapper*.
//! Execution proceeds outermost-first — the **last** element of the tuple
//! runs first and the endpoint runs last. The reversal is intentional;
//! the chain runtime walks route chains with a count-down cursor.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::chain::Next;
use crate::context::Ctx;
use crate::error::Error;

/// Boxed future returned by boxed handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What every handler returns: `Ok(())` to let the chain settle, `Err` to
/// abort it and hand the error to the dispatcher's error policy.
pub type HandlerResult = Result<(), Error>;

/// A terminal handler: receives the context, never the continuation.
pub trait Endpoint: Send + Sync + 'static {
    /// Handles the request.
    fn call(&self, ctx: Ctx) -> BoxFuture<HandlerResult>;
}

impl<F, Fut> Endpoint for F
where
    F: Fn(Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Ctx) -> BoxFuture<HandlerResult> {
        Box::pin(self(ctx))
    }
}

/// A handler that runs before others in its scope and may short-circuit.
pub trait Middleware: Send + Sync + 'static {
    /// Handles the request; call `next.run(ctx).await` to continue the
    /// chain, or return without doing so to end it here.
    fn call(&self, ctx: Ctx, next: Next) -> BoxFuture<HandlerResult>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Ctx, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Ctx, next: Next) -> BoxFuture<HandlerResult> {
        Box::pin(self(ctx, next))
    }
}

/// The process-wide error policy hook registered with `App::on_error`.
///
/// Receives the context and the error that aborted the chain. Returning
/// `Err` from here falls back to a fixed 500 response.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Produces the error response.
    fn call(&self, ctx: Ctx, error: Error) -> BoxFuture<HandlerResult>;
}

impl<F, Fut> ErrorHandler for F
where
    F: Fn(Ctx, Error) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Ctx, error: Error) -> BoxFuture<HandlerResult> {
        Box::pin(self(ctx, error))
    }
}

/// Type-erased handler stored in registries and route chains.
///
/// Cloning is cheap (an `Arc` bump); registries are built once at startup
/// and only cloned on the dispatch path.
#[derive(Clone)]
pub struct BoxHandler {
    inner: Arc<dyn Fn(Ctx, Next) -> BoxFuture<HandlerResult> + Send + Sync>,
}

impl BoxHandler {
    /// Boxes an endpoint. The continuation it is handed at runtime is
    /// dropped unused, which is exactly the short-circuit contract for a
    /// terminal handler.
    #[must_use]
    pub fn endpoint<E: Endpoint>(endpoint: E) -> Self {
        let endpoint = Arc::new(endpoint);
        Self {
            inner: Arc::new(move |ctx, _next| endpoint.call(ctx)),
        }
    }

    /// Boxes a middleware.
    #[must_use]
    pub fn middleware<M: Middleware>(middleware: M) -> Self {
        let middleware = Arc::new(middleware);
        Self {
            inner: Arc::new(move |ctx, next| middleware.call(ctx, next)),
        }
    }

    pub(crate) fn invoke(&self, ctx: Ctx, next: Next) -> BoxFuture<HandlerResult> {
        (self.inner)(ctx, next)
    }
}

impl fmt::Debug for BoxHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxHandler")
    }
}

/// Conversion accepted by route registration: a bare endpoint or an
/// `(endpoint, mw, ...)` tuple.
///
/// The produced chain keeps tuple order — index 0 is the endpoint — and
/// the runtime walks it from the highest index down, so the last tuple
/// element is the outermost wrapper.
pub trait IntoRouteChain<M> {
    /// Converts into the boxed handler chain, endpoint first.
    fn into_chain(self) -> Vec<BoxHandler>;
}

#[doc(hidden)]
pub struct ViaEndpoint(());

impl<E: Endpoint> IntoRouteChain<ViaEndpoint> for E {
    fn into_chain(self) -> Vec<BoxHandler> {
        vec![BoxHandler::endpoint(self)]
    }
}

macro_rules! impl_route_chain {
    ($($mw:ident),+) => {
        impl<E, $($mw,)+> IntoRouteChain<(ViaEndpoint, $($mw,)+)> for (E, $($mw,)+)
        where
            E: Endpoint,
            $($mw: Middleware,)+
        {
            fn into_chain(self) -> Vec<BoxHandler> {
                #[allow(non_snake_case)]
                let (endpoint, $($mw,)+) = self;
                let mut chain = vec![BoxHandler::endpoint(endpoint)];
                $(chain.push(BoxHandler::middleware($mw));)+
                chain
            }
        }
    };
}

impl_route_chain!(M1);
impl_route_chain!(M1, M2);
impl_route_chain!(M1, M2, M3);
impl_route_chain!(M1, M2, M3, M4);
impl_route_chain!(M1, M2, M3, M4, M5);
