//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`. Anything else is a message for Raf.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Show the transcript of this session.
    History,
    /// Remaining free messages.
    Quota,
    /// Run the simulated premium upgrade without leaving the chat.
    Upgrade,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/quota" => Some(ChatCommand::Quota),
        "/upgrade" | "/premium" => Some(ChatCommand::Upgrade),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}  {}", style("/history").cyan(), "Show this conversation");
    println!("  {}    {}", style("/quota").cyan(), "Free messages left");
    println!("  {}  {}", style("/upgrade").cyan(), "Go Premium (simulated)");
    println!("  {}     {}", style("/exit").cyan(), "End the chat");
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit").dim()
    );
    println!();
}
