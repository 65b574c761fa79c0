//! HTTP request handlers for the REST API.

pub mod auth;
pub mod exchange;
pub mod profile;
pub mod report;
pub mod session;
