//! Profile persistence, the in-process session store, and the upgrade flow.

pub mod repository;
pub mod store;
pub mod upgrade;
