use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, shells};
use std::io::Write;
use std::str::FromStr;

/// Shells completion scripts can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl FromStr for Shell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(anyhow!(
                "Unsupported shell: {s}. Supported shells: bash, zsh, fish"
            )),
        }
    }
}

/// Write the completion script for `cmd` to `out`.
///
/// ```no_run
/// use clap::Command;
/// use notion_cli::completions::{generate_completions, Shell};
///
/// let mut cmd = Command::new("notion");
/// generate_completions(&mut cmd, Shell::Zsh, &mut std::io::stdout());
/// ```
pub fn generate_completions(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, cmd, bin_name, out),
        Shell::Zsh => generate(shells::Zsh, cmd, bin_name, out),
        Shell::Fish => generate(shells::Fish, cmd, bin_name, out),
    }
}
