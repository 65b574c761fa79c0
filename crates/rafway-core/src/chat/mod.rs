//! Chat sessions, the server-side exchange, and their prompts.

pub mod exchange;
pub mod prompt;
pub mod registry;
pub mod repository;
pub mod session;
