//! HTTP glue with no framework dependencies.
//!
//! Two small concerns live here, both consumed by the request context in
//! `skiff-core`:
//!
//! - [`query`] — query-string parsing with the framework's documented
//!   tie-break rules
//! - [`fs`] — content-type-by-extension, attachment headers, and the
//!   directory walk behind static serving
//!
//! Everything is synchronous and allocation-light; the async boundaries
//! (body collection, file reads) belong to the core crate.

#![forbid(unsafe_code)]

pub mod fs;
pub mod query;

/// `Content-Type` value for JSON payloads.
pub const APPLICATION_JSON: &str = "application/json";

/// Base value of a `Content-Disposition` attachment header.
pub const ATTACHMENT: &str = "attachment";
