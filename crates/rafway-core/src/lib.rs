//! Business logic and repository trait definitions for Raf Way.
//!
//! This crate holds the quota gate, the chat session state machine, the
//! session store, and the upgrade/report flows. It defines the "ports"
//! (repository and provider traits) that the infrastructure layer
//! implements, and depends only on `rafway-types` -- never on
//! `rafway-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod llm;
pub mod profile;
pub mod quota;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;
