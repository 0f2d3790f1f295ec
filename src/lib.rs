//! # tripagg
//!
//! Parallel aggregation queries over line-delimited JSON trip records.
//!
//! ## Usage
//!
//! ```bash
//! tripagg run payment --file taxi-trips-data.json
//! tripagg run query4 --workers 8 --format json
//! tripagg list
//! ```
//!
//! ## Modules
//!
//! - `record` - Line parsers and typed field access
//! - `query` - Aggregation specs, accumulators and result derivation
//! - `engine` - Chunking, parallel workers and ordered merging
//! - `config` - Layered engine settings
//! - `error` - Unified error type and error codes
//! - `app` - Logging and fatal error handling for the binary
//! - `cli` - Argument parsing and output formatting
pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod record;
