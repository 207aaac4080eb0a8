//! dql-rewriter - GraphQL to Dgraph DQL query rewriting
//!
//! This crate turns validated GraphQL operations into native DQL queries:
//! - Schema definitions loaded from YAML and compiled into predicate mappings
//! - Filter / order / pagination translation
//! - `@skip` / `@include` / `@cascade` directive handling
//! - Fetch queries for mutation payloads
//! - DQL text rendering

pub mod config;
pub mod dql_generator;
pub mod operation;
pub mod query_rewriter;
pub mod schema_catalog;

pub use dql_generator::{DqlQuery, ToDql};
pub use query_rewriter::{QueryRewriter, RewriteError};
