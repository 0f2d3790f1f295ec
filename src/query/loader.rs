//! Loading user-defined queries from YAML
//!
//! ```yaml
//! queries:
//!   - name: long_trips_by_vendor
//!     filter:
//!       - op: greater_than
//!         field: trip_distance
//!         value: 20
//!     group_by:
//!       kind: integer
//!       field: VendorID
//!     sums:
//!       - field: fare_amount
//!     columns:
//!       - kind: key
//!         header: VendorID
//!       - kind: count
//!         header: trips
//!       - kind: average
//!         header: avg_fare
//!         sum: fare_amount
//! ```

use super::{AggregationSpec, QueryError};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct QueryFile {
    #[serde(default)]
    queries: Vec<AggregationSpec>,
}

/// Parse query definitions from YAML text
pub fn parse_queries(content: &str) -> Result<Vec<AggregationSpec>, QueryError> {
    let file: QueryFile = serde_yaml::from_str(content).map_err(|e| QueryError::Load {
        path: "<inline>".into(),
        source: Box::new(e),
    })?;
    for spec in &file.queries {
        spec.validate()?;
    }
    Ok(file.queries)
}

/// Read and parse a query file
pub fn load_queries(path: &Path) -> Result<Vec<AggregationSpec>, QueryError> {
    let content = std::fs::read_to_string(path).map_err(|e| QueryError::Load {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    let queries = parse_queries(&content).map_err(|e| match e {
        QueryError::Load { source, .. } => QueryError::Load {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    info!("Loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}
