mod cli;
mod commands;
mod config;
mod context;
mod output;
mod timing;

use anyhow::Result;
use clap::Parser as _;

use crate::cli::{Cli, Commands};
use crate::commands::{run_login, run_logout, run_register, run_users, run_whoami};
use crate::config::Config;
use crate::context::CliContext;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    drop(dotenvy::dotenv());

    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut app = CliContext::load(cli.api_url.as_deref(), config_path)?;

    match cli.command {
        Commands::Login(args) => run_login(&mut app, args).await,
        Commands::Register(args) => run_register(&mut app, args).await,
        Commands::Logout => run_logout(&mut app).await,
        Commands::Whoami => run_whoami(&mut app).await,
        Commands::Users(command) => run_users(&mut app, command).await,
    }
}
