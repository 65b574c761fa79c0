//! Interactive CLI chat with Raf.
//!
//! Thinking spinner, markdown rendering, slash commands, and the paywall.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
