//! Bundled middleware.
//!
//! Each of these is an ordinary [`Middleware`](skiff_core::Middleware)
//! value; attach one at application scope with `App::middleware`, at group
//! scope with `Group::middleware`, or per-route in a chain tuple.

mod compress;
mod cors;
mod logger;

pub use compress::compress;
pub use cors::{CorsConfig, cors, cors_with_config};
pub use logger::logger;
