//! CLI command definitions and dispatch for the `rafway` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod auth;
pub mod chat;
pub mod report;
pub mod status;
pub mod upgrade;

use anyhow::bail;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use rafway_infra::filesystem::credentials::{Credentials, load_credentials};
use rafway_types::profile::Profile;

use crate::state::AppState;

/// Talk with Raf, your career guidance coach.
#[derive(Parser)]
#[command(name = "rafway", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in (the profile is created on first sign-in).
    Login {
        /// Email used to find your profile again.
        #[arg(long)]
        email: Option<String>,

        /// Display name; your first name is used in Raf's greeting.
        #[arg(long)]
        name: Option<String>,

        /// Profile photo URL.
        #[arg(long)]
        photo_url: Option<String>,
    },

    /// Sign out and forget the saved token.
    Logout,

    /// Show the signed-in profile and remaining free messages.
    #[command(alias = "status")]
    Whoami,

    /// Chat with Raf.
    Chat,

    /// Upgrade to Premium (simulated, no payment).
    Upgrade {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the parent dashboard (Premium only).
    Report,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Emit logs as JSON lines.
        #[arg(long)]
        log_json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Saved credentials and the profile they resolve to.
///
/// Fails with a hint to run `rafway login` when nobody is signed in.
pub(crate) async fn require_sign_in(state: &AppState) -> anyhow::Result<(Credentials, Profile)> {
    let Some(credentials) = load_credentials(&state.data_dir).await else {
        bail!("Not signed in. Run `rafway login` first.");
    };
    match state.auth_service.current_profile(&credentials.token).await {
        Ok(profile) => Ok((credentials, profile)),
        Err(e) => bail!("Saved session is no longer valid ({e}). Run `rafway login` again."),
    }
}
