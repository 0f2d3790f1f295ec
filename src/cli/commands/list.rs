//! `tripagg list`

use crate::cli::commands::build_registry;
use crate::error::Result;
use crate::query::builtin::ALIASES;
use crate::query::QueryRegistry;
use std::path::PathBuf;

/// Print every available query with its columns
pub fn run_list_command(queries: Option<PathBuf>) -> Result<()> {
    let registry = build_registry(queries.as_deref())?;
    print!("{}", format_listing(&registry));
    Ok(())
}

fn format_listing(registry: &QueryRegistry) -> String {
    let mut out = String::new();
    for spec in registry.iter() {
        let aliases: Vec<&str> = ALIASES
            .iter()
            .filter(|(_, target)| *target == spec.name)
            .map(|(alias, _)| *alias)
            .collect();
        out.push_str(&spec.name);
        if !aliases.is_empty() {
            out.push_str(&format!(" ({})", aliases.join(", ")));
        }
        if !spec.description.is_empty() {
            out.push_str(&format!(": {}", spec.description));
        }
        out.push('\n');
        out.push_str(&format!("    columns: {}\n", spec.headers().join(",")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_shows_aliases_and_columns() {
        let listing = format_listing(&QueryRegistry::with_builtins());
        assert!(listing.contains("payment (query2)"));
        assert!(listing.contains("columns: VendorID,trips,avg_passengers"));
        assert_eq!(listing.lines().count(), 8);
    }
}
