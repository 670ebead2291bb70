//! Guardex CLI - export multi-region threat-detection findings to CSV

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod export;
mod output;

use cli::{Cli, CommandContext, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "guardex=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Init => cli::init::run(cli.api_host.as_deref(), cli.config.as_deref()).await,
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Version => {
            println!("guardex version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Regions { ref prefix } => {
            let ctx =
                CommandContext::new(cli.format, cli.api_host.as_deref(), cli.config.as_deref())?;
            cli::regions::list(&ctx, prefix.as_deref()).await
        }
        Commands::Export(ref args) => {
            let ctx =
                CommandContext::new(cli.format, cli.api_host.as_deref(), cli.config.as_deref())?;
            cli::export::run(&ctx, args).await
        }
    }
}
