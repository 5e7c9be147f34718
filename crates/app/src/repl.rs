//! Interactive command loop.

use sgdis_application::HttpClient;
use sgdis_domain::{ActivityKind, ApiRequest, InactivityState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::debug;

use crate::cli::Command;
use crate::context::AppContext;
use crate::error::AppError;

const HELP: &str = "\
Commands:
  get <path>   GET a backend path (API paths are authenticated)
  whoami       show the signed-in user
  status       show token and inactivity state
  stay         stay signed in when warned
  logout       sign out now
  quit         leave
";

/// Why the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// The user quit or input ended.
    Quit,
    /// The session ended and the client navigated to this route.
    Redirected(String),
}

/// Reads commands from `input` until quit, end of input, or a redirect to
/// the login page.
///
/// Every line is reported to the inactivity monitor as activity before it
/// is interpreted.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<R, W>(
    ctx: &AppContext,
    input: R,
    mut out: W,
    mut route: watch::Receiver<String>,
) -> Result<Exit, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut navigating = true;
    loop {
        tokio::select! {
            changed = route.changed(), if navigating => {
                if changed.is_err() {
                    navigating = false;
                    continue;
                }
                let current = route.borrow_and_update().clone();
                if current == ctx.config.login_path {
                    out.write_all(format!("Session ended; now at {current}\n").as_bytes())
                        .await?;
                    out.flush().await?;
                    return Ok(Exit::Redirected(current));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(Exit::Quit);
                };
                ctx.monitor.record_activity(ActivityKind::KeyPress);

                let command = Command::parse(&line);
                debug!(?command, "Command received");
                if command == Command::Quit {
                    return Ok(Exit::Quit);
                }
                let reply = execute(ctx, command).await;
                if !reply.is_empty() {
                    out.write_all(reply.as_bytes()).await?;
                    out.flush().await?;
                }
            }
        }
    }
}

async fn execute(ctx: &AppContext, command: Command) -> String {
    match command {
        Command::Stay => {
            ctx.monitor.stay_active();
            String::new()
        }
        Command::Logout => {
            if ctx.monitor.state().is_warning() {
                ctx.monitor.logout();
            } else {
                ctx.monitor.destroy();
                ctx.session.logout().await;
            }
            String::new()
        }
        Command::Get(path) => match ctx.client.execute(&ApiRequest::get(path)).await {
            Ok(response) => format!("{}\n{}\n", response.status, response.text()),
            Err(e) => format!("request failed: {e}\n"),
        },
        Command::Whoami => match ctx.client.current_user().await {
            Ok(user) => format!("{user:#}\n"),
            Err(e) => format!("{e}\n"),
        },
        Command::Status => {
            let monitor = match ctx.monitor.state() {
                InactivityState::Inactive => "not watching".to_string(),
                InactivityState::Idle => "watching".to_string(),
                InactivityState::Warning { remaining } => {
                    format!("warning, {remaining}s left")
                }
                InactivityState::LoggedOut => "signed out".to_string(),
                InactivityState::Stopped => "stopped".to_string(),
            };
            format!(
                "token: {}\ninactivity: {monitor}\n",
                ctx.session.token_status().display_message()
            )
        }
        Command::Help => HELP.to_string(),
        Command::Other(text) if text.is_empty() => String::new(),
        Command::Other(text) => format!("unknown command: {text} (try help)\n"),
        Command::Quit => String::new(),
    }
}
