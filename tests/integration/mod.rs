//! Integration tests for notion-cli
//!
//! These tests drive the client, resolver and parsers together against a
//! scripted MCP server, and exercise frontmatter sync on real files.

pub mod frontmatter_sync;
pub mod helpers;
pub mod name_resolution;
pub mod page_rendering;
