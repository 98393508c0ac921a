//! The hyper/tokio serving loop.
//!
//! Transport is delegated entirely to hyper: each accepted connection is
//! served by the auto (HTTP/1 + HTTP/2) connection builder, and every
//! request on it is converted into parts plus a boxed body and handed to
//! [`Engine::dispatch`]. One task per connection; requests never block
//! each other.

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::Request;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::context::BoxError;
use crate::dispatch::Engine;

/// Binds `addr` and serves the engine until ctrl-c.
///
/// On ctrl-c the accept loop stops; connections already being served run
/// to completion on their own tasks.
pub async fn serve(engine: Arc<Engine>, addr: impl ToSocketAddrs) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(address = %local, routes = engine.route_count(), "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => serve_connection(Arc::clone(&engine), stream, remote),
                Err(err) => tracing::warn!(error = %err, "accept failed"),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        }
    }
}

fn serve_connection(engine: Arc<Engine>, stream: TcpStream, remote: SocketAddr) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let service = service_fn(move |request: Request<Incoming>| {
            let engine = Arc::clone(&engine);
            async move {
                let (parts, body) = request.into_parts();
                let body = body.map_err(|err| Box::new(err) as BoxError).boxed_unsync();
                let response = engine.dispatch(parts, body, Some(remote)).await;
                Ok::<_, Infallible>(response.into_http())
            }
        });
        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .serve_connection(io, service)
            .await
        {
            tracing::debug!(remote = %remote, error = %err, "connection closed with error");
        }
    });
}
