//! Command implementations, one module per top-level subcommand.

pub mod auth;
pub mod comment;
pub mod common;
pub mod db;
pub mod page;
pub mod search;
pub mod tools;
