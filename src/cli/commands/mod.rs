//! Command implementation modules

pub mod list;
pub mod run;

pub use list::run_list_command;
pub use run::run_query_command;

use crate::error::Result;
use crate::query::loader::load_queries;
use crate::query::QueryRegistry;
use std::path::Path;

/// Built-in queries plus any defined in `queries`
pub fn build_registry(queries: Option<&Path>) -> Result<QueryRegistry> {
    let mut registry = QueryRegistry::with_builtins();
    if let Some(path) = queries {
        registry.register_all(load_queries(path)?)?;
    }
    Ok(registry)
}
