//! Sportcache CLI entry point.

use clap::Parser;

use sportcache::cli::{commands, handle_error, load_config, Cli, Commands};
use sportcache::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.json).await,
        Commands::Stats(args) => commands::stats::execute(args, &config, cli.json).await,
        Commands::Clear(args) => commands::clear::execute(args, &config, cli.json).await,
        Commands::Sweep => commands::sweep::execute(&config, cli.json).await,
        Commands::Get(args) => commands::get::execute(args, &config, cli.json).await,
        Commands::Set(args) => commands::set::execute(args, &config, cli.json).await,
        Commands::Preload(args) => commands::preload::execute(args, &config, cli.json).await,
        Commands::Serve(args) => commands::serve::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
