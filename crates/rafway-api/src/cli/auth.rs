//! `rafway login` / `rafway logout`.

use anyhow::Result;
use console::style;

use rafway_infra::filesystem::credentials::{
    Credentials, clear_credentials, load_credentials, save_credentials,
};
use rafway_types::error::AuthError;
use rafway_types::profile::SignInRequest;

use crate::state::AppState;

/// Sign in and save the token for later commands.
pub async fn login(
    state: &AppState,
    email: Option<String>,
    name: Option<String>,
    photo_url: Option<String>,
    json: bool,
) -> Result<()> {
    let signed_in = state
        .auth_service
        .sign_in(SignInRequest {
            display_name: name,
            email,
            photo_url,
        })
        .await?;

    // A previous token would otherwise stay valid forever
    if let Some(previous) = load_credentials(&state.data_dir).await {
        match state.auth_service.sign_out(&previous.token).await {
            Ok(()) | Err(AuthError::InvalidToken) => {}
            Err(e) => tracing::warn!("could not revoke previous token: {e}"),
        }
    }

    save_credentials(
        &state.data_dir,
        &Credentials {
            uid: signed_in.profile.uid.clone(),
            token: signed_in.token.clone(),
        },
    )
    .await?;

    if json {
        let out = serde_json::json!({
            "uid": signed_in.profile.uid,
            "created": signed_in.created,
            "profile": signed_in.profile,
            "token": signed_in.token,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let who = signed_in
        .profile
        .first_name()
        .map(str::to_string)
        .or_else(|| signed_in.profile.email.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    println!();
    if signed_in.created {
        println!(
            "  {} Welcome {}! Your profile is ready.",
            style("✓").green().bold(),
            style(&who).cyan().bold()
        );
    } else {
        println!(
            "  {} Signed in as {}",
            style("✓").green().bold(),
            style(&who).cyan().bold()
        );
    }
    println!(
        "  {}",
        style("Run `rafway chat` to talk with Raf.").dim()
    );
    println!();
    Ok(())
}

/// Revoke the saved token and delete it.
pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    let Some(credentials) = load_credentials(&state.data_dir).await else {
        if json {
            println!("{}", serde_json::json!({ "signed_out": false }));
        } else {
            println!("  {}", style("Not signed in.").dim());
        }
        return Ok(());
    };

    match state.auth_service.sign_out(&credentials.token).await {
        // Already revoked elsewhere; still forget it locally
        Ok(()) | Err(AuthError::InvalidToken) => {}
        Err(e) => return Err(e.into()),
    }
    clear_credentials(&state.data_dir).await?;

    if json {
        println!("{}", serde_json::json!({ "signed_out": true, "uid": credentials.uid }));
    } else {
        println!("  {} Signed out.", style("✓").green().bold());
    }
    Ok(())
}
