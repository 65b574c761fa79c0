//! `rafway upgrade`: the simulated premium purchase.

use anyhow::{Result, bail};
use console::style;
use dialoguer::Confirm;

use rafway_core::profile::upgrade::{UPGRADE_CONFIRMATION, upgrade_current};

use crate::state::AppState;

pub async fn upgrade(state: &AppState, yes: bool, json: bool) -> Result<()> {
    let (credentials, profile) = super::require_sign_in(state).await?;

    if profile.is_premium {
        if json {
            println!("{}", serde_json::json!({ "is_premium": true, "changed": false }));
        } else {
            println!("  {} You are already Premium.", style("★").yellow().bold());
        }
        return Ok(());
    }

    if !yes && !json {
        println!();
        println!("  {}", style("Raf Way Premium").yellow().bold());
        println!("  {}", style("Unlimited messages and the full parent dashboard.").dim());
        println!();
        let confirmed = Confirm::new()
            .with_prompt("Simulate the payment and upgrade now?")
            .default(true)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let store = state.open_profile_store(&credentials.uid).await;
    let Some(upgraded) = upgrade_current(&store) else {
        bail!("Profile not found. Run `rafway login` again.");
    };
    store.flush().await;

    if json {
        let out = serde_json::json!({
            "is_premium": upgraded.is_premium,
            "changed": true,
            "message": UPGRADE_CONFIRMATION,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!("  {} {}", style("✓").green().bold(), UPGRADE_CONFIRMATION);
        println!();
    }
    Ok(())
}
