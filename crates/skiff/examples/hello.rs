//! Getting-started example: routes, groups, middleware, JSON binding.
//!
//! Run with: cargo run --example hello -p skiff
//! Then try:
//!   curl http://127.0.0.1:3000/hey
//!   curl http://127.0.0.1:3000/auth/madhuri/32
//!   curl -X POST http://127.0.0.1:3000/login -d '{"username":"madhuri"}'

use serde::Deserialize;
use skiff::middleware::logger;
use skiff::prelude::*;

#[derive(Deserialize)]
struct Login {
    username: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut app = App::new();
    app.middleware(logger());

    app.get("/", |ctx: Ctx| async move { ctx.send(StatusCode::OK, "Hello, World!") });

    app.get("/hey", |ctx: Ctx| async move { ctx.send(StatusCode::OK, "hey") });

    app.post("/login", |ctx: Ctx| async move {
        let login: Login = ctx.bind_json().await?;
        ctx.json(
            StatusCode::OK,
            &serde_json::json!({ "message": format!("Welcome {}", login.username) }),
        )
    });

    // Group routing: everything under /auth shares the prefix and the
    // group's middleware.
    let mut auth = app.group("/auth");
    auth.middleware(|ctx: Ctx, next: Next| async move {
        tracing::info!("auth group middleware");
        next.run(ctx).await
    });
    auth.get("/:name/:age", |ctx: Ctx| async move {
        ctx.json(StatusCode::OK, &ctx.params())
    });

    app.listen("127.0.0.1:3000").await
}
