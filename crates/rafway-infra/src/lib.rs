//! Infrastructure layer for Raf Way.
//!
//! Contains implementations of the traits defined in `rafway-core`:
//! SQLite storage, the Gemini and demo generation providers, token hashing,
//! and data-directory file access (config, report, saved credentials).

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod llm;
pub mod report;
pub mod sqlite;
