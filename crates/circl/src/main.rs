// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Circl - career and network intelligence chat client.
//!
//! This is the binary entry point for the Circl CLI.

use std::sync::Arc;
use std::time::Duration;

use circl_auth::{AuthClient, FileTokenStore};
use circl_config::model::CirclConfig;
use circl_core::CirclError;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod shell;

/// Circl - career and network intelligence chat client.
#[derive(Parser, Debug)]
#[command(name = "circl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Exchange a Google OIDC id_token for Circl credentials.
    Login {
        /// The Google id_token to exchange.
        #[arg(long)]
        token: String,
    },
    /// Launch the interactive chat shell.
    Shell,
    /// Manage chat sessions.
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Join the waitlist.
    Waitlist {
        #[command(subcommand)]
        command: WaitlistCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SessionCommands {
    /// List your sessions, newest first.
    List,
    /// Delete a session.
    Delete {
        /// Session id to delete.
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum WaitlistCommands {
    /// Sign an email up, optionally crediting a referral code.
    Join {
        /// Email address to register.
        email: String,
        /// Referral code from an existing member.
        #[arg(long)]
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match circl_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            circl_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Login { token }) => run_login(&config, &token).await,
        Some(Commands::Shell) => shell::run_shell(&config).await,
        Some(Commands::Sessions { command }) => run_sessions(&config, command).await,
        Some(Commands::Waitlist { command }) => run_waitlist(&config, command).await,
        None => {
            println!("circl: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        if e.is_auth() {
            eprintln!("{}: {e}", "error".red());
            eprintln!("run {} to sign in", "circl login --token <id_token>".yellow());
        } else {
            eprintln!("{}: {e}", "error".red());
        }
        std::process::exit(1);
    }
}

/// Builds the auth client backed by the configured credential file.
fn build_auth(config: &CirclConfig) -> Result<AuthClient, CirclError> {
    let store = Arc::new(FileTokenStore::new(&config.credentials.store_path));
    AuthClient::new(
        config.api.auth_url(),
        store,
        Duration::from_secs(config.api.timeout_secs),
    )
}

async fn run_login(config: &CirclConfig, token: &str) -> Result<(), CirclError> {
    let auth = build_auth(config)?;
    let user = auth.login_with_google(token).await?;
    println!(
        "{} signed in as {} {} <{}>",
        "ok:".green(),
        user.first_name,
        user.last_name,
        user.email
    );
    Ok(())
}

async fn run_sessions(config: &CirclConfig, command: SessionCommands) -> Result<(), CirclError> {
    let auth = build_auth(config)?;
    let sessions = circl_astralis::SessionClient::new(auth, config.api.sessions_url());

    match command {
        SessionCommands::List => {
            let mut list = sessions.list().await?;
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if list.is_empty() {
                println!("no sessions yet");
                return Ok(());
            }
            for session in list {
                let id = session.session_id.as_deref().unwrap_or("-");
                let title = session.title.as_deref().unwrap_or("(untitled)");
                println!(
                    "{}  {}  {}",
                    id.yellow(),
                    session.created_at.format("%Y-%m-%d %H:%M"),
                    title
                );
            }
        }
        SessionCommands::Delete { id } => {
            sessions.delete(&id).await?;
            println!("{} deleted {id}", "ok:".green());
        }
    }
    Ok(())
}

async fn run_waitlist(config: &CirclConfig, command: WaitlistCommands) -> Result<(), CirclError> {
    let (Some(url), Some(key)) = (
        config.waitlist.supabase_url.clone(),
        config.waitlist.supabase_anon_key.as_deref(),
    ) else {
        return Err(CirclError::Config(
            "waitlist is not configured; set waitlist.supabase_url and waitlist.supabase_anon_key"
                .into(),
        ));
    };

    let client = circl_waitlist::WaitlistClient::new(url, key)?;
    match command {
        WaitlistCommands::Join { email, code } => {
            let signup = client.join(&email, code.as_deref()).await?;
            println!("{} {} is on the waitlist", "ok:".green(), signup.entry.email);
            println!(
                "share your referral code: {}",
                signup.referral_code.bold().yellow()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = circl_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.client.name, "circl");
    }
}
