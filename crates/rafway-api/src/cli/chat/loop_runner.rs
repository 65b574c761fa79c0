//! The interactive chat loop.
//!
//! Owns one `ChatSession` for the signed-in user. The session charges the
//! free quota as each message is sent and blocks input behind the paywall
//! once the quota is spent; `/upgrade` lifts it in place.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use rafway_core::chat::prompt::PAYWALL_MESSAGE;
use rafway_core::chat::session::{ChatSession, SubmitOutcome};
use rafway_core::profile::store::SessionStore;
use rafway_core::profile::upgrade::{UPGRADE_CONFIRMATION, upgrade_current};
use rafway_core::quota::{self, FREE_LIMIT};
use rafway_types::chat::{SessionState, Sender};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;
use crate::state::AppState;

/// Run the chat loop until the user exits.
///
/// With `json`, the final session snapshot is printed on exit.
pub async fn run_chat_loop(state: &AppState, json: bool) -> Result<()> {
    let (credentials, _) = crate::cli::require_sign_in(state).await?;
    let store = state.open_profile_store(&credentials.uid).await;
    let mut session = ChatSession::new(store.clone(), state.prompt_options());
    let renderer = ChatRenderer::new();

    print_welcome_banner(
        state.provider.name(),
        state.provider.default_model(),
        &session.id().to_string(),
        store.current().as_ref().and_then(quota::remaining_free_messages),
    );
    if let Some(greeting) = session.transcript().first() {
        print_raf(&renderer, &greeting.text);
    }
    if session.state() == SessionState::PaywallBlocked {
        print_paywall();
    }

    let (mut chat_input, _writer) = ChatInput::new(prompt_for(session.state()))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        chat_input.update_prompt(&prompt_for(session.state()));
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::History => print_history(&session),
                ChatCommand::Quota => print_quota(&store),
                ChatCommand::Upgrade => {
                    if upgrade_in_chat(&store).await {
                        session.sync_profile();
                    }
                }
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        let pending = match session.begin_submit(&text) {
            SubmitOutcome::Accepted(pending) => pending,
            SubmitOutcome::Ignored => continue,
            SubmitOutcome::Blocked => {
                print_paywall();
                continue;
            }
            SubmitOutcome::SignedOut => {
                println!(
                    "\n  {} Your profile is gone. Run `rafway login` again.\n",
                    style("!").red().bold()
                );
                break;
            }
        };

        let spinner = thinking_spinner();
        let result = pending.resolve(&state.provider).await;
        spinner.finish_and_clear();

        match result {
            Some(result) => {
                if let Some(reply) = session.complete_submit(result) {
                    print_raf(&renderer, &reply.text);
                }
            }
            None => session.abandon_submit(),
        }

        if session.state() == SessionState::PaywallBlocked {
            print_paywall();
        }
    }

    chat_input.flush();
    session.close();
    store.flush().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    } else {
        println!("\n  {}", style("Session ended. À bientôt !").dim());
    }
    Ok(())
}

fn prompt_for(state: SessionState) -> String {
    match state {
        SessionState::PaywallBlocked => format!("  {} ", style("🔒 >").yellow().bold()),
        _ => format!("  {} ", style("Toi >").green().bold()),
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Raf réfléchit...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_raf(renderer: &ChatRenderer, text: &str) {
    println!();
    println!("  {}", style("Raf").cyan().bold());
    println!("{}", renderer.render(text).trim_end());
    println!();
}

fn print_paywall() {
    println!();
    println!("  {} {}", style("🔒").bold(), style(PAYWALL_MESSAGE).yellow());
    println!("  {}", style("Type /upgrade to go Premium.").dim());
    println!();
}

fn print_history(session: &ChatSession) {
    println!();
    for message in session.transcript() {
        let label = match message.sender {
            Sender::User => style("Toi").green().bold(),
            Sender::Assistant => style("Raf").cyan().bold(),
        };
        let preview: String = message.text.chars().take(100).collect();
        let ellipsis = if message.text.chars().count() > 100 { "..." } else { "" };
        println!(
            "  {} {} {preview}{ellipsis}",
            style(message.timestamp.format("%H:%M")).dim(),
            label
        );
    }
    println!();
}

fn print_quota(store: &SessionStore) {
    match store.current().as_ref().and_then(quota::remaining_free_messages) {
        None if store.current().is_some() => {
            println!("\n  {} Premium: unlimited messages.\n", style("★").yellow().bold())
        }
        None => println!("\n  {}\n", style("Not signed in.").dim()),
        Some(n) => println!(
            "\n  {} {n}/{FREE_LIMIT} free messages left.\n",
            style("i").cyan().bold()
        ),
    }
}

/// Upgrade from inside the chat. Returns whether the profile is now premium.
async fn upgrade_in_chat(store: &SessionStore) -> bool {
    if store.current().is_some_and(|p| p.is_premium) {
        println!("\n  {} You are already Premium.\n", style("★").yellow().bold());
        return true;
    }
    match upgrade_current(store) {
        Some(_) => {
            store.flush().await;
            println!("\n  {} {}\n", style("✓").green().bold(), UPGRADE_CONFIRMATION);
            true
        }
        None => {
            println!("\n  {} Not signed in.\n", style("!").red().bold());
            false
        }
    }
}
