// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairdrop - daily-capped resource distribution service.
//!
//! Binary entry point: owner/catalog management, claim commands, and the
//! HTTP gateway server.

use clap::{Parser, Subcommand};

mod commands;
mod serve;

/// Pairdrop - daily-capped resource distribution service.
#[derive(Parser, Debug)]
#[command(name = "pairdrop", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway server.
    Serve,
    /// Manage owner accounts.
    Owner {
        #[command(subcommand)]
        command: OwnerCommands,
    },
    /// Manage an owner's pair catalog.
    Pair {
        #[command(subcommand)]
        command: PairCommands,
    },
    /// Claim today's pair from an owner as this device.
    Claim {
        /// Owner to claim from.
        owner_id: String,
        /// Output structured JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Show the pair this device already holds today, if any.
    Check {
        /// Owner to check against.
        owner_id: String,
        /// Output structured JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List an owner's claim audit log.
    Claims {
        /// Owner whose audit log to list.
        owner_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum OwnerCommands {
    /// Register a new owner account.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// WhatsApp contact handle (normalized to digits).
        #[arg(long)]
        handle: String,
    },
    /// List registered owners.
    List,
}

#[derive(Subcommand, Debug)]
enum PairCommands {
    /// Add a link+message pair to an owner's catalog.
    Add {
        /// Owning account id.
        #[arg(long)]
        owner: String,
        /// Resource link.
        #[arg(long)]
        link: String,
        /// Accompanying message.
        #[arg(long)]
        message: String,
        /// Claims this pair serves before retiring (default 1).
        #[arg(long)]
        limit: Option<i64>,
    },
    /// List an owner's pairs.
    List {
        /// Owning account id.
        #[arg(long)]
        owner: String,
    },
    /// Soft-delete a pair.
    Remove {
        /// Pair id.
        pair_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match pairdrop_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            pairdrop_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(&config).await,
        Some(Commands::Owner { command }) => match command {
            OwnerCommands::Add { name, handle } => {
                commands::owner_add(&config, &name, &handle).await
            }
            OwnerCommands::List => commands::owner_list(&config).await,
        },
        Some(Commands::Pair { command }) => match command {
            PairCommands::Add {
                owner,
                link,
                message,
                limit,
            } => commands::pair_add(&config, &owner, &link, &message, limit).await,
            PairCommands::List { owner } => commands::pair_list(&config, &owner).await,
            PairCommands::Remove { pair_id } => commands::pair_remove(&config, &pair_id).await,
        },
        Some(Commands::Claim { owner_id, json }) => {
            commands::claim(&config, &owner_id, json).await
        }
        Some(Commands::Check { owner_id, json }) => {
            commands::check(&config, &owner_id, json).await
        }
        Some(Commands::Claims { owner_id }) => commands::claims(&config, &owner_id).await,
        None => {
            println!("pairdrop: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("pairdrop: {e}");
        std::process::exit(1);
    }
}
