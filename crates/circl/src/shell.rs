// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `circl shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline
//! history. Each query streams into the chat state while the shell echoes
//! newly arrived thought fragments dimmed and response fragments plain,
//! then prints the discovered professionals block.

use std::sync::Arc;
use std::time::Duration;

use circl_astralis::{AstralisClient, FoundUser, SessionClient};
use circl_chat::{ChatController, Role};
use circl_config::model::CirclConfig;
use circl_core::CirclError;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// How often the shell re-reads chat state while a send is in flight.
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the `circl shell` interactive REPL.
pub async fn run_shell(config: &CirclConfig) -> Result<(), CirclError> {
    let auth = crate::build_auth(config)?;

    // Validate stored credentials up front so the login hint fires before
    // the first query, not in the middle of one.
    let user = auth.validate().await?;

    let search = AstralisClient::new(auth.clone(), config.api.astralis_url());
    let session_api = SessionClient::new(auth, config.api.sessions_url());
    let mut controller = ChatController::new(search, session_api);
    if let Some(user_id) = &user.user_id {
        controller = controller.with_user(user_id.clone());
    }
    let controller = Arc::new(controller);

    controller.load_sessions().await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| CirclError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "circl shell".bold().green());
    println!("signed in as {} {}", user.first_name, user.last_name);
    println!(
        "Type a query to search, {} to list sessions, {} for a fresh chat, {} to exit.\n",
        "/sessions".yellow(),
        "/new".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.client.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                let _ = rl.add_history_entry(&line);

                let outcome = match trimmed {
                    "/sessions" => print_sessions(&controller).await,
                    "/new" => {
                        controller.new_session().await;
                        println!("{}", "started a fresh chat".dimmed());
                        Ok(())
                    }
                    _ if trimmed.starts_with("/open ") => {
                        let id = trimmed.trim_start_matches("/open ").trim();
                        open_session(&controller, id).await
                    }
                    _ if trimmed.starts_with('/') => {
                        println!("unknown command {trimmed}");
                        Ok(())
                    }
                    _ => handle_query(&controller, trimmed).await,
                };

                if let Err(e) = outcome {
                    if e.is_auth() {
                        return Err(e);
                    }
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Sends one query to the active session, creating one first if needed.
async fn handle_query(controller: &Arc<ChatController>, input: &str) -> Result<(), CirclError> {
    let active = {
        let state = controller.state();
        let state = state.lock().await;
        state.active_session_id.clone()
    };

    let session_id = match active {
        Some(id) => id,
        None => {
            let id = controller.create_session().await?;
            debug!(session_id = %id, "created session for fresh chat");
            controller.open_session_tab(&id, input).await;
            id
        }
    };

    send_with_live_output(controller, &session_id, input).await
}

/// Drives one send while echoing state changes to the terminal.
///
/// The send runs as a task; the shell re-reads the shared state on an
/// interval and prints whatever grew since the last read -- the terminal
/// equivalent of re-rendering on each state change.
async fn send_with_live_output(
    controller: &Arc<ChatController>,
    session_id: &str,
    input: &str,
) -> Result<(), CirclError> {
    let send = tokio::spawn({
        let controller = Arc::clone(controller);
        let session_id = session_id.to_string();
        let input = input.to_string();
        async move { controller.send_message(&session_id, &input).await }
    });

    let mut printed_thinking = 0usize;
    let mut printed_content = 0usize;
    loop {
        let finished = send.is_finished();
        echo_new_fragments(controller, &mut printed_thinking, &mut printed_content).await;
        if finished {
            break;
        }
        tokio::time::sleep(RENDER_INTERVAL).await;
    }
    println!();

    let result = send
        .await
        .map_err(|e| CirclError::Internal(format!("send task failed: {e}")))?;

    let users = controller.found_users().await;
    if !users.is_empty() {
        print_found_users(&users);
    }
    result
}

/// Prints the parts of the streaming drafts that arrived since last call.
async fn echo_new_fragments(
    controller: &Arc<ChatController>,
    printed_thinking: &mut usize,
    printed_content: &mut usize,
) {
    let messages = controller.messages().await;

    let thinking: String = messages
        .iter()
        .filter(|m| m.is_thinking)
        .map(|m| m.thinking_text.as_str())
        .collect();
    if thinking.len() > *printed_thinking {
        print!("{}", thinking[*printed_thinking..].dimmed());
        *printed_thinking = thinking.len();
        flush();
    }

    let content: String = messages
        .iter()
        .filter(|m| m.role == Role::Assistant && !m.is_thinking)
        .map(|m| m.content.as_str())
        .collect();
    if content.len() > *printed_content {
        if *printed_content == 0 && *printed_thinking > 0 {
            println!();
        }
        print!("{}", &content[*printed_content..]);
        *printed_content = content.len();
        flush();
    }
}

fn flush() {
    use std::io::Write;
    std::io::stdout().flush().ok();
}

async fn print_sessions(controller: &Arc<ChatController>) -> Result<(), CirclError> {
    controller.load_sessions().await?;
    let sessions = controller.sessions().await;
    if sessions.is_empty() {
        println!("no sessions yet");
        return Ok(());
    }
    for session in sessions {
        let id = session.session_id.as_deref().unwrap_or("-");
        let title = session.title.as_deref().unwrap_or("(untitled)");
        println!(
            "{}  {}  {}",
            id.yellow(),
            session.created_at.format("%Y-%m-%d %H:%M"),
            title
        );
    }
    println!("open one with {}", "/open <id>".yellow());
    Ok(())
}

async fn open_session(controller: &Arc<ChatController>, id: &str) -> Result<(), CirclError> {
    controller.select_session(id).await?;
    let messages = controller.messages().await;
    if messages.is_empty() {
        println!("{}", "(empty session)".dimmed());
        return Ok(());
    }
    for message in messages {
        match message.role {
            Role::User => println!("{} {}", "you:".cyan(), message.content),
            Role::Assistant => println!("{} {}", "circl:".green(), message.content),
        }
    }
    Ok(())
}

fn print_found_users(users: &[FoundUser]) {
    println!("{}", "-- found professionals --".bold());
    for user in users {
        let name = user.name.as_deref().unwrap_or("(unnamed)");
        let mut line = name.bold().to_string();
        if let Some(title) = &user.title {
            line.push_str(&format!("  {title}"));
        }
        if let Some(company) = &user.company {
            line.push_str(&format!(" @ {company}"));
        }
        println!("{line}");

        // Fall back to the most recent experience when the flat fields are
        // missing, matching how the results panel renders cards.
        if user.title.is_none() {
            if let Some(latest) = user.sorted_experiences().first() {
                let role = latest.job_title.as_deref().unwrap_or("-");
                let company = latest.company_name.as_deref().unwrap_or("-");
                println!("  {}", format!("{role} @ {company}").dimmed());
            }
        }
        if !user.skills.is_empty() {
            println!("  {}", user.skills.join(", ").dimmed());
        }
    }
}
