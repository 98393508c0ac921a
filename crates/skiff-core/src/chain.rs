//! The middleware chain runtime.
//!
//! Every request walks three continuation scopes in a fixed nesting order:
//! **application middleware → group middleware → route chain → terminal
//! handler**. The walk is driven by an explicit cursor ([`Stage`]) advanced
//! by [`advance`] rather than by captured closures, so there is no
//! re-entrancy to reason about: [`Next`] is consumed by `run`, and a
//! handler that never calls it short-circuits the chain right there.
//!
//! Group scope runs before route resolution, so group middleware fires
//! even for requests that end in 404. When several group prefixes are
//! substrings of the request path, all of their chains run, in group
//! registration order.
//!
//! The route chain is walked from the **highest index down**: the last
//! handler registered for a route is the outermost wrapper and the handler
//! at index 0 is the terminal one. The count-down cursor — not a reversed
//! list — keeps registration order intact for diagnostics.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::context::Ctx;
use crate::dispatch::{Engine, NOT_FOUND_MESSAGE};
use crate::handler::{BoxFuture, BoxHandler, HandlerResult};

/// Continuation handed to middleware.
///
/// Calling [`run`](Next::run) executes the rest of the chain; dropping it
/// without calling ends the chain immediately (short-circuit). `Next` is
/// consumed by value, so a handler cannot invoke it twice.
pub struct Next {
    engine: Arc<Engine>,
    groups: Arc<Vec<usize>>,
    stage: Stage,
}

#[derive(Clone)]
enum Stage {
    /// Next application middleware to invoke.
    App(usize),
    /// Next middleware of the `slot`-th qualifying group.
    Group { slot: usize, index: usize },
    /// Next route-chain handler, counting down toward the endpoint at 0.
    Route {
        handlers: Arc<Vec<BoxHandler>>,
        index: usize,
    },
    /// Past the endpoint; running is a no-op.
    Done,
}

impl Next {
    pub(crate) fn entry(engine: Arc<Engine>, groups: Arc<Vec<usize>>) -> Self {
        Self {
            engine,
            groups,
            stage: Stage::App(0),
        }
    }

    /// Runs the remainder of the chain.
    pub async fn run(self, ctx: Ctx) -> HandlerResult {
        advance(self.engine, self.groups, self.stage, ctx).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match &self.stage {
            Stage::App(index) => format!("app[{index}]"),
            Stage::Group { slot, index } => format!("group[{slot}][{index}]"),
            Stage::Route { index, .. } => format!("route[{index}]"),
            Stage::Done => "done".to_string(),
        };
        f.debug_struct("Next").field("stage", &stage).finish()
    }
}

fn advance(
    engine: Arc<Engine>,
    groups: Arc<Vec<usize>>,
    stage: Stage,
    ctx: Ctx,
) -> BoxFuture<HandlerResult> {
    Box::pin(async move {
        match stage {
            Stage::App(index) => match engine.app_middleware().get(index).cloned() {
                Some(handler) => {
                    let next = Next {
                        engine: Arc::clone(&engine),
                        groups: Arc::clone(&groups),
                        stage: Stage::App(index + 1),
                    };
                    handler.invoke(ctx, next).await
                }
                None => advance(engine, groups, Stage::Group { slot: 0, index: 0 }, ctx).await,
            },
            Stage::Group { slot, index } => {
                let Some(&group) = groups.get(slot) else {
                    return resolve_route(engine, ctx).await;
                };
                match engine.group_handlers(group).get(index).cloned() {
                    Some(handler) => {
                        let next = Next {
                            engine: Arc::clone(&engine),
                            groups: Arc::clone(&groups),
                            stage: Stage::Group {
                                slot,
                                index: index + 1,
                            },
                        };
                        handler.invoke(ctx, next).await
                    }
                    None => {
                        advance(
                            engine,
                            groups,
                            Stage::Group {
                                slot: slot + 1,
                                index: 0,
                            },
                            ctx,
                        )
                        .await
                    }
                }
            }
            Stage::Route { handlers, index } => {
                let handler = handlers[index].clone();
                let stage = if index == 0 {
                    Stage::Done
                } else {
                    Stage::Route {
                        handlers: Arc::clone(&handlers),
                        index: index - 1,
                    }
                };
                let next = Next {
                    engine,
                    groups,
                    stage,
                };
                handler.invoke(ctx, next).await
            }
            Stage::Done => Ok(()),
        }
    })
}

/// Transition from middleware scopes into route scope: look the route up,
/// record its template on the context, and start the count-down walk of
/// its chain — or apply the not-found policy.
async fn resolve_route(engine: Arc<Engine>, ctx: Ctx) -> HandlerResult {
    let matched = engine
        .table()
        .lookup(ctx.method(), ctx.path())
        .map(|route| (route.template().to_string(), route.handlers().to_vec()));

    match matched {
        Some((template, handlers)) => {
            tracing::debug!(template = %template, "route matched");
            ctx.set_route_template(&template);
            let handlers = Arc::new(handlers);
            let index = handlers.len() - 1;
            advance(
                engine,
                Arc::new(Vec::new()),
                Stage::Route { handlers, index },
                ctx,
            )
            .await
        }
        None => {
            tracing::debug!(method = %ctx.method(), path = ctx.path(), "no route matched");
            match engine.not_found_handler() {
                Some(handler) => handler.call(ctx).await,
                None => ctx.send(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            }
        }
    }
}
