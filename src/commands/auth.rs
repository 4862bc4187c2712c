//! `notion auth` subcommands: store, inspect and remove the access token.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::config::Config;
use crate::mcp::{StoredToken, TokenStore};
use crate::output;

const EXPIRY_FORMAT: &str = "%-d %b %Y %H:%M";

#[derive(Debug, Serialize)]
struct AuthStatus {
    authenticated: bool,
    source: &'static str,
    token_type: String,
    has_token: bool,
    expires_at: Option<DateTime<Utc>>,
    config_path: String,
}

/// Save a token obtained elsewhere (for example an integration secret)
pub fn login(config: &Config, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        bail!("Token must not be empty");
    }

    let store = TokenStore::new(&config.token_path);
    store.save(&StoredToken::bearer(token))?;
    output::success(&format!("Token saved to {}", store.path().display()));
    Ok(())
}

pub fn status(config: &Config, json: bool) -> Result<()> {
    let store = TokenStore::new(&config.token_path);

    let status = match (&config.access_token, store.load()?) {
        (Some(_), _) => AuthStatus {
            authenticated: true,
            source: "flag, environment or config.toml",
            token_type: "Bearer".to_string(),
            has_token: true,
            expires_at: None,
            config_path: store.path().display().to_string(),
        },
        (None, Some(token)) => AuthStatus {
            authenticated: token.is_valid(),
            source: "token file",
            token_type: token.token_type.clone(),
            has_token: !token.access_token.is_empty(),
            expires_at: token.expiry(),
            config_path: store.path().display().to_string(),
        },
        (None, None) => {
            if json {
                return output::print_json(&serde_json::json!({ "authenticated": false }));
            }
            println!(
                "Not authenticated. Run 'notion auth login <TOKEN>' to authenticate."
            );
            return Ok(());
        }
    };

    if json {
        return output::print_json(&status);
    }

    if status.authenticated {
        output::success("Authenticated");
    } else {
        output::warning("Token expired or not set");
    }
    println!();
    println!("{} {}", "Source:     ".dimmed(), status.source);
    println!("{} {}", "Config path:".dimmed(), status.config_path);
    println!("{} {}", "Token type: ".dimmed(), status.token_type);
    if let Some(expiry) = status.expires_at {
        println!("{} {}", "Expires:    ".dimmed(), expiry.format(EXPIRY_FORMAT));
    }
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    let store = TokenStore::new(&config.token_path);
    if store.clear()? {
        output::success("Logged out");
    } else {
        output::info("No stored token to remove");
    }
    if config.access_token.is_some() {
        output::warning("A token is still set through NOTION_TOKEN, --token or config.toml");
    }
    Ok(())
}
