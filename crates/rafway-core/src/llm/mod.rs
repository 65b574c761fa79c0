//! Generation collaborator abstractions.
//!
//! - `LlmProvider`: RPITIT trait for concrete backends (Gemini, demo)
//! - `BoxLlmProvider`: object-safe wrapper for runtime selection

pub mod box_provider;
pub mod provider;
