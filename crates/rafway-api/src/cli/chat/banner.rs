//! Welcome banner display for chat sessions.

use console::style;

use rafway_core::quota::FREE_LIMIT;

/// Print the banner shown before Raf's greeting.
///
/// `remaining` is `None` for premium profiles.
pub fn print_welcome_banner(provider: &str, model: &str, session_id: &str, remaining: Option<u32>) {
    println!();
    println!("  🧭 {}", style("Raf").cyan().bold());
    println!("  {}", style("Ton coach d'orientation").dim());
    println!();
    println!("  {}  {}", style("Model:").bold(), style(format!("{provider}/{model}")).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    match remaining {
        Some(n) => println!(
            "  {}  {}",
            style("Plan:").bold(),
            style(format!("Free, {n}/{FREE_LIMIT} messages left")).dim()
        ),
        None => println!("  {}  {}", style("Plan:").bold(), style("Premium").yellow()),
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
