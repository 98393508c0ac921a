//! Request logging over `tracing`.

use std::time::Instant;

use skiff_core::{Ctx, Middleware, Next};

/// Logs one line per request: method, path, status, and elapsed time.
///
/// Errors are logged at warn level and re-propagated untouched, so the
/// error policy still sees them.
#[must_use]
pub fn logger() -> impl Middleware {
    |ctx: Ctx, next: Next| async move {
        let start = Instant::now();
        let method = ctx.method().clone();
        let path = ctx.path().to_string();

        let result = next.run(ctx.clone()).await;

        let elapsed = start.elapsed();
        match &result {
            Ok(()) => {
                let status = ctx.response_status().map_or(0, |status| status.as_u16());
                tracing::info!(method = %method, path = %path, status, elapsed = ?elapsed, "request");
            }
            Err(err) => {
                tracing::warn!(method = %method, path = %path, error = %err, elapsed = ?elapsed, "request failed");
            }
        }
        result
    }
}
