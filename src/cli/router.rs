//! Command routing and execution

use crate::app::AppConfig;
use crate::cli::args::Commands;
use crate::cli::commands::{run_list_command, run_query_command};
use anyhow::{Context, Result};

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Run(args) => {
            let query = args.query.clone();
            run_query_command(args, config.config_file.clone())
                .await
                .with_context(|| format!("query '{}' failed", query))
        }
        Commands::List { queries } => {
            run_list_command(queries).context("failed to list queries")
        }
    }
}
