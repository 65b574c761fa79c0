//! Shared domain types for Raf Way.
//!
//! This crate contains the core domain types used across the Raf Way
//! advisory assistant: Profile, ChatMessage, report data, LLM request
//! shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod profile;
pub mod report;
