mod backend;
mod cli;
mod clients;
mod db;
mod error;
mod flatfile;
mod fmt;
mod models;
mod settings;
mod transactions;
mod validate;

use clap::Parser;
use env_logger::Env;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when both are set.
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    let result = match cli.command {
        Some(Commands::Init) => cli::init::run(&cli.store),
        Some(Commands::Clients { command }) => cli::clients::run(&cli.store, command),
        Some(Commands::Transactions { command }) => cli::transactions::run(&cli.store, command),
        Some(Commands::Status) => cli::status::run(&cli.store),
        Some(Commands::Menu) | None => cli::menu::run(&cli.store),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
