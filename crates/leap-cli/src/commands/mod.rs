//! CLI command implementations.

pub mod add;
pub mod adjust;
pub mod complete;
pub mod config;
pub mod jump;
pub mod purge;
pub mod stat;
