//! Command-line arguments and interactive commands.

use std::path::PathBuf;

use clap::Parser;

/// SGDIS session client.
#[derive(Debug, Parser)]
#[command(name = "sgdis", version, about)]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, env = "SGDIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Route the session starts on.
    #[arg(short, long, default_value = "/")]
    pub route: String,

    /// Where the access token is persisted. Defaults to the user data
    /// directory.
    #[arg(long, conflicts_with = "ephemeral")]
    pub store: Option<PathBuf>,

    /// Keep the access token in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Initial cookies, as a `Cookie:` header (e.g. `refreshToken=...`).
    #[arg(long, env = "SGDIS_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Access token to start with.
    #[arg(long, env = "SGDIS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Disable coloured output.
    #[arg(long)]
    pub no_color: bool,
}

/// A line typed by the user.
///
/// Any line, recognised or not, also counts as user activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dismiss the inactivity warning.
    Stay,
    /// Sign out now.
    Logout,
    /// `GET` a path through the authenticated client.
    Get(String),
    /// Show token and monitor state.
    Status,
    /// Show the signed-in user.
    Whoami,
    /// List commands.
    Help,
    /// Leave the client.
    Quit,
    /// Anything else.
    Other(String),
}

impl Command {
    /// Parses one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "stay" => Self::Stay,
            "logout" => Self::Logout,
            "get" if !rest.is_empty() => Self::Get(rest.to_string()),
            "status" => Self::Status,
            "whoami" => Self::Whoami,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Other(line.to_string()),
        }
    }
}
