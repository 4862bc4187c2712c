//! Client configuration.
//!
//! Settings are layered, later sources winning:
//! 1. built-in defaults
//! 2. `~/.config/notion-cli/config.toml`
//! 3. environment (`NOTION_TOKEN`, `NOTION_MCP_ENDPOINT`)
//! 4. command-line flags (`--token`, `--endpoint`)
//!
//! The resolved [`Config`] is passed by value into the client; nothing here
//! is global.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://mcp.notion.com/mcp";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const TOKEN_ENV: &str = "NOTION_TOKEN";
pub const ENDPOINT_ENV: &str = "NOTION_MCP_ENDPOINT";

const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "token.json";

/// Contents of `config.toml`; every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load `config.toml` from `dir`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub endpoint: Option<String>,
}

/// Environment values relevant to the client
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    pub token: Option<String>,
    pub endpoint: Option<String>,
}

impl EnvVars {
    pub fn from_process() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            token: non_empty(TOKEN_ENV),
            endpoint: non_empty(ENDPOINT_ENV),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    /// Token supplied directly; when absent the token file is used
    pub access_token: Option<String>,
    pub token_path: PathBuf,
    pub timeout: Duration,
}

impl Config {
    /// `~/.config/notion-cli`
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".config").join("notion-cli"))
            .unwrap_or_else(|| PathBuf::from(".config/notion-cli"))
    }

    /// Resolve from the default directory, process environment and flags.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let dir = Self::default_dir();
        let file = FileConfig::load(&dir)?;
        Ok(Self::resolve(&dir, file, EnvVars::from_process(), overrides))
    }

    /// Layer the given sources. Pure; used directly by tests.
    pub fn resolve(dir: &Path, file: FileConfig, env: EnvVars, overrides: &Overrides) -> Self {
        let endpoint = overrides
            .endpoint
            .clone()
            .or(env.endpoint)
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let access_token = overrides
            .token
            .clone()
            .or(env.token)
            .or(file.token)
            .filter(|t| !t.trim().is_empty());

        Self {
            endpoint,
            access_token,
            token_path: file.token_path.unwrap_or_else(|| dir.join(TOKEN_FILE)),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let dir = Path::new("/home/u/.config/notion-cli");
        let config = Config::resolve(
            dir,
            FileConfig::default(),
            EnvVars::default(),
            &Overrides::default(),
        );

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.access_token, None);
        assert_eq!(config.token_path, dir.join("token.json"));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_precedence() {
        let dir = Path::new("/cfg");
        let file = FileConfig {
            endpoint: Some("https://file".into()),
            token: Some("file-token".into()),
            token_path: Some(PathBuf::from("/elsewhere/token.json")),
            timeout_secs: Some(5),
        };
        let env = EnvVars {
            token: Some("env-token".into()),
            endpoint: None,
        };
        let overrides = Overrides {
            token: None,
            endpoint: Some("https://flag".into()),
        };

        let config = Config::resolve(dir, file, env, &overrides);
        assert_eq!(config.endpoint, "https://flag");
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
        assert_eq!(config.token_path, PathBuf::from("/elsewhere/token.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_token_ignored() {
        let overrides = Overrides {
            token: Some("  ".into()),
            endpoint: None,
        };
        let config = Config::resolve(
            Path::new("/cfg"),
            FileConfig::default(),
            EnvVars::default(),
            &overrides,
        );
        assert_eq!(config.access_token, None);
    }

    #[test]
    fn test_file_config_load() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileConfig::load(dir.path()).unwrap(), FileConfig::default());

        fs::write(
            dir.path().join("config.toml"),
            "endpoint = \"https://staging/mcp\"\ntimeout_secs = 10\n",
        )
        .unwrap();
        let file = FileConfig::load(dir.path()).unwrap();
        assert_eq!(file.endpoint.as_deref(), Some("https://staging/mcp"));
        assert_eq!(file.timeout_secs, Some(10));

        fs::write(dir.path().join("config.toml"), "timeout_secs = \"soon\"").unwrap();
        let err = FileConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    #[serial]
    fn test_env_vars_from_process() {
        std::env::set_var(TOKEN_ENV, "from-env");
        std::env::set_var(ENDPOINT_ENV, "");
        let env = EnvVars::from_process();
        std::env::remove_var(TOKEN_ENV);
        std::env::remove_var(ENDPOINT_ENV);

        assert_eq!(env.token.as_deref(), Some("from-env"));
        assert_eq!(env.endpoint, None);
    }
}
