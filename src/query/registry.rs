//! Name lookup over built-in and user-defined queries

use super::builtin::{self, ALIASES};
use super::{AggregationSpec, QueryError};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct QueryRegistry {
    specs: Vec<Arc<AggregationSpec>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for spec in builtin::all() {
            registry.specs.push(Arc::new(spec));
        }
        registry
    }

    /// Validate and add a query. Names (and aliases) must be unique.
    pub fn register(&mut self, spec: AggregationSpec) -> Result<(), QueryError> {
        spec.validate()?;
        if self.lookup(&spec.name).is_some() || alias_target(&spec.name).is_some() {
            return Err(QueryError::Duplicate { name: spec.name });
        }
        debug!("Registered query '{}'", spec.name);
        self.specs.push(Arc::new(spec));
        Ok(())
    }

    pub fn register_all(
        &mut self,
        specs: impl IntoIterator<Item = AggregationSpec>,
    ) -> Result<(), QueryError> {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(())
    }

    /// Resolve a query by name or alias
    pub fn get(&self, name: &str) -> Result<Arc<AggregationSpec>, QueryError> {
        let resolved = alias_target(name).unwrap_or(name);
        self.lookup(resolved)
            .cloned()
            .ok_or_else(|| QueryError::UnknownQuery {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregationSpec> {
        self.specs.iter().map(|s| s.as_ref())
    }

    fn lookup(&self, name: &str) -> Option<&Arc<AggregationSpec>> {
        self.specs.iter().find(|s| s.name == name)
    }
}

fn alias_target(name: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_alias() {
        let registry = QueryRegistry::with_builtins();
        assert_eq!(registry.get("daily").unwrap().name, "daily");
        assert_eq!(registry.get("query2").unwrap().name, "payment");
    }

    #[test]
    fn test_unknown_query_lists_available() {
        let registry = QueryRegistry::with_builtins();
        let err = registry.get("query9").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("query9"));
        assert!(message.contains("count, payment, vendor, daily"));
    }

    #[test]
    fn test_register_rejects_duplicates_and_aliases() {
        let mut registry = QueryRegistry::with_builtins();
        assert!(matches!(
            registry.register(builtin::count()),
            Err(QueryError::Duplicate { .. })
        ));

        let mut shadow = builtin::count();
        shadow.name = "query1".to_string();
        assert!(matches!(
            registry.register(shadow),
            Err(QueryError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_register_custom_query() {
        let mut registry = QueryRegistry::with_builtins();
        let mut custom = builtin::payment();
        custom.name = "payment_all".to_string();
        custom.filter.clear();
        registry.register(custom).unwrap();
        assert_eq!(registry.names().len(), 5);
        assert!(registry.get("payment_all").is_ok());
    }
}
