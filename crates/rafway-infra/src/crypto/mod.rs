//! Token minting and hashing.

pub mod token;
