use anyhow::Result;
use colored::Colorize;

use super::common::connect;
use crate::config::Config;
use crate::output;

/// List the tools the MCP server exposes
pub fn list(config: &Config, json: bool) -> Result<()> {
    let mut client = connect(config)?;
    let tools = client.list_tools()?;

    if json {
        return output::print_json(&tools);
    }
    for tool in &tools {
        println!("{}\n  {}\n", tool.name.bold(), tool.description);
    }
    Ok(())
}
