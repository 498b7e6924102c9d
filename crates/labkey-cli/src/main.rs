use clap::Parser;

mod cli;
mod display;

use cli::dispatcher::Dispatcher;
use cli::logging::init_logging;
use cli::main_types::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(config) = &cli.config {
        log::debug!("Using config file: {}", config);
    }

    let dispatcher = Dispatcher::new(cli.config);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        log::debug!("Command failed with {:?} severity", e.severity());
        eprintln!("Error: {}", e);
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}
