//! Sign-in, bearer tokens, and identity lookup.

pub mod repository;
pub mod service;
pub mod token;
