use clap::Parser;
use tripagg::app::{handle_fatal_error, init_logging, AppConfig};
use tripagg::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = AppConfig::new(cli.verbose).with_config_file(cli.config.clone());
    init_logging(&config);

    if let Err(e) = execute_command(cli.command, &config).await {
        handle_fatal_error(e, config.verbose);
    }
}
