//! `rafway whoami`: profile and quota at a glance.

use anyhow::Result;
use console::style;

use rafway_core::quota::{self, FREE_LIMIT};

use crate::state::AppState;

pub async fn whoami(state: &AppState, json: bool) -> Result<()> {
    let (_, profile) = super::require_sign_in(state).await?;
    let remaining = quota::remaining_free_messages(&profile);

    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "provider": state.provider.name(),
            "profile": profile,
            "can_send": quota::allowed(&profile),
            "remaining_free_messages": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("🧭").bold(),
        style(profile.display_name.as_deref().unwrap_or("Anonymous")).cyan().bold()
    );
    if let Some(email) = &profile.email {
        println!("  {}  {}", style("Email:").bold(), style(email).dim());
    }
    match remaining {
        None => println!("  {}   {}", style("Plan:").bold(), style("Premium").yellow().bold()),
        Some(0) => println!(
            "  {}   Free ({})",
            style("Plan:").bold(),
            style("no messages left, run `rafway upgrade`").red()
        ),
        Some(n) => println!(
            "  {}   Free ({n}/{FREE_LIMIT} messages left)",
            style("Plan:").bold()
        ),
    }
    println!(
        "  {}  {}",
        style("Since:").bold(),
        style(profile.created_at.format("%Y-%m-%d")).dim()
    );
    println!(
        "  {} {}",
        style("Replies:").bold(),
        style(format!("{} ({})", state.provider.name(), state.provider.default_model())).dim()
    );
    println!();
    Ok(())
}
