//! Chunked parallel aggregation
//!
//! Lines flow from a [`LineSource`] through the [`Batcher`] into chunks,
//! each chunk is reduced to a partial [`Aggregate`](crate::query::Aggregate)
//! by [`process_chunk`], and the [`OrderedMerger`] folds the partials in
//! chunk order before the result table is derived. [`Engine`] drives the
//! whole pipeline.

pub mod batch;
pub mod error;
pub mod merge;
pub mod scheduler;
pub mod source;
pub mod worker;

pub use batch::{Batcher, Chunk};
pub use error::EngineError;
pub use merge::OrderedMerger;
pub use scheduler::{Engine, QueryOutput, RunPhase, RunStats};
pub use source::LineSource;
pub use worker::process_chunk;
