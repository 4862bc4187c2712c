pub mod commands;
pub mod completions;
pub mod config;
pub mod mcp;
pub mod output;
pub mod parser;
pub mod reference;
pub mod resolve;
pub mod utils;
