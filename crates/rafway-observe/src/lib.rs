//! Logging setup for Raf Way binaries.

pub mod tracing_setup;
