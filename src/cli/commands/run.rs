//! `tripagg run`

use crate::cli::args::RunArgs;
use crate::cli::commands::build_registry;
use crate::cli::output::write_table;
use crate::config::loader::ConfigLoader;
use crate::config::{EngineConfig, Settings};
use crate::engine::{Engine, LineSource};
use crate::error::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// Run one query and print its table to stdout
///
/// The wall-clock time of the whole run, including reading settings and
/// writing the table, goes to stderr.
pub async fn run_query_command(args: RunArgs, config_file: Option<PathBuf>) -> Result<()> {
    let started = Instant::now();

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_file {
        loader = loader.with_file(path);
    }
    let settings = loader.load()?;

    let engine = Engine::new(resolve_engine_config(&settings, &args))?;
    let queries = args.queries.clone().or_else(|| settings.queries.clone());
    let registry = build_registry(queries.as_deref())?;
    let spec = registry.get(&args.query)?;
    debug!("Resolved '{}' to query '{}'", args.query, spec.name);

    let source = LineSource::open(&args.file)?;
    let output = engine.run(spec, source).await?;
    debug!("Run statistics: {:?}", output.stats);

    write_table(std::io::stdout().lock(), &output.table, args.format)?;
    eprintln!(
        "Execution Time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Settings file and environment, then command-line flags
fn resolve_engine_config(settings: &Settings, args: &RunArgs) -> EngineConfig {
    let mut config = settings.engine.clone();
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(parser) = args.parser {
        config.parser = parser;
    }
    if args.no_progress {
        config.progress = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::OutputFormat;
    use crate::record::ParserKind;

    fn args() -> RunArgs {
        RunArgs {
            query: "count".to_string(),
            file: PathBuf::from("trips.json"),
            chunk_size: None,
            workers: None,
            parser: None,
            format: OutputFormat::Csv,
            queries: None,
            no_progress: false,
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            engine: EngineConfig::default()
                .with_chunk_size(1000)
                .with_workers(2),
            queries: None,
        };
        let mut run = args();
        run.workers = Some(6);
        run.parser = Some(ParserKind::Fast);
        run.no_progress = true;

        let config = resolve_engine_config(&settings, &run);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.workers, 6);
        assert_eq!(config.parser, ParserKind::Fast);
        assert!(!config.progress);
    }

    #[test]
    fn test_settings_kept_without_flags() {
        let settings = Settings::default();
        assert_eq!(resolve_engine_config(&settings, &args()), settings.engine);
    }
}
