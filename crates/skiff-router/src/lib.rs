//! Route templates and the method-keyed route table.
//!
//! This crate is the pure matching layer of the skiff framework:
//!
//! - [`compile`] turns a route template such as `/auth/:name` into an
//!   anchored [`CompiledPattern`], built once at registration and reused
//!   for every request
//! - [`extract_param`] and [`extract_all_params`] align a concrete request
//!   path against a template to recover named parameter values
//! - [`RouteTable`] stores routes per HTTP method in registration order
//!   and resolves lookups with first-match-wins semantics
//!
//! Nothing here is async and nothing here allocates on the match path
//! beyond what the regex engine needs.

#![forbid(unsafe_code)]

mod pattern;
mod table;

pub use pattern::{
    CompiledPattern, PARAM_SEGMENT_CLASS, PatternError, compile, extract_all_params, extract_param,
    try_extract_param,
};
pub use table::{Route, RouteTable};
