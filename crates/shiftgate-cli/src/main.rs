//! Shiftgate CLI: the `shiftgate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Readiness {
            org,
            site,
            shift,
            date,
            data,
            json,
        } => commands::readiness::run(org, site, shift, date, data, json),

        Commands::Freeze {
            org,
            site,
            shift,
            date,
            data,
            ledger,
            json,
        } => commands::freeze::run(org, site, shift, date, data, ledger, json),

        Commands::VerifyChain { org, ledger, json } => {
            commands::verify_chain::run(org, ledger, json)
        }

        Commands::Gate {
            action,
            target,
            actor,
            org,
            site,
            shift,
            date,
            data,
            ledger,
            json,
        } => commands::gate::run(
            action, target, actor, org, site, shift, date, data, ledger, json,
        ),

        Commands::TokenVerify { token, json } => commands::token_verify::run(token, json),

        Commands::Serve {
            org,
            site,
            actor,
            data,
            ledger,
            bind,
        } => commands::serve::run(org, site, actor, data, ledger, bind),
    }
}
