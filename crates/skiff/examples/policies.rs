//! Custom 404 and error handling, CORS, and compression.
//!
//! Run with: cargo run --example policies -p skiff
//! Then try:
//!   curl -i http://127.0.0.1:3000/nowhere
//!   curl -i http://127.0.0.1:3000/boom
//!   curl -i --compressed http://127.0.0.1:3000/big

use skiff::middleware::{compress, cors};
use skiff::prelude::*;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut app = App::new();
    app.middleware(cors());
    app.middleware(compress());

    app.get("/big", |ctx: Ctx| async move {
        ctx.send(StatusCode::OK, "lorem ipsum ".repeat(512))
    });

    app.get("/boom", |_ctx: Ctx| async move { Err(Error::msg("boom")) });

    app.not_found(|ctx: Ctx| async move {
        ctx.json(
            StatusCode::NOT_FOUND,
            &serde_json::json!({ "error": "no such page", "path": ctx.path() }),
        )
    });

    app.on_error(|ctx: Ctx, err: Error| async move {
        tracing::warn!(error = %err, "handler failed");
        ctx.json(
            StatusCode::INTERNAL_SERVER_ERROR,
            &serde_json::json!({ "error": err.to_string() }),
        )
    });

    app.listen("127.0.0.1:3000").await
}
