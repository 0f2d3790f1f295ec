//! CLI argument structures

use crate::cli::output::OutputFormat;
use crate::record::ParserKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Input file used when `--file` is not given
pub const DEFAULT_INPUT: &str = "taxi-trips-data.json";

/// Parallel aggregation queries over line-delimited trip records
#[derive(Debug, Parser)]
#[command(name = "tripagg")]
#[command(about = "tripagg - Parallel aggregation queries over line-delimited trip records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (default: tripagg.toml in the user config directory)
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one query over an input file and print its table
    Run(RunArgs),

    /// List available queries and their columns
    List {
        /// YAML file with extra query definitions
        #[arg(long, value_name = "FILE")]
        queries: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Query name or alias (query1..query4)
    pub query: String,

    /// Input file, one JSON object per line; `-` reads stdin
    #[arg(short = 'f', long, default_value = DEFAULT_INPUT)]
    pub file: PathBuf,

    /// Lines per chunk
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Chunks aggregated concurrently
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Line parser (strict or fast)
    #[arg(long, value_name = "KIND")]
    pub parser: Option<ParserKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// YAML file with extra query definitions
    #[arg(long, value_name = "FILE")]
    pub queries: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["tripagg", "run", "payment"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.query, "payment");
                assert_eq!(args.file, PathBuf::from(DEFAULT_INPUT));
                assert_eq!(args.format, OutputFormat::Csv);
                assert!(args.parser.is_none());
                assert!(!args.no_progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "tripagg", "-vv", "run", "query4", "--file", "-", "--chunk-size", "10", "-j", "2",
            "--parser", "fast", "--format", "json", "--no-progress",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.chunk_size, Some(10));
        assert_eq!(args.workers, Some(2));
        assert_eq!(args.parser, Some(ParserKind::Fast));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.no_progress);
    }

    #[test]
    fn test_unknown_parser_rejected() {
        assert!(Cli::try_parse_from(["tripagg", "run", "count", "--parser", "simd"]).is_err());
    }
}
