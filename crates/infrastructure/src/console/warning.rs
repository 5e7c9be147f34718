//! Terminal rendering of the inactivity warning.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use sgdis_application::ports::{AlertError, AlertSound, WarningView, WarningViewError};
use sgdis_domain::{CountdownStyle, format_remaining};

/// Draws the countdown on a single terminal line.
///
/// With colour enabled the countdown uses 24-bit ANSI colour and turns bold
/// while pulsing.
#[derive(Debug)]
pub struct ConsoleWarningView<W> {
    out: Mutex<W>,
    color: bool,
}

impl ConsoleWarningView<io::Stdout> {
    /// A view writing to standard output.
    #[must_use]
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write + Send> ConsoleWarningView<W> {
    /// A view writing to `out`.
    #[must_use]
    pub const fn new(out: W, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            color,
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn countdown(&self, remaining: u64, style: CountdownStyle) -> String {
        let text = format!("Signing out in {}", format_remaining(remaining));
        if !self.color {
            return text;
        }
        let c = style.color;
        let weight = if style.pulsing { "\x1b[1m" } else { "" };
        format!("{weight}\x1b[38;2;{};{};{}m{text}\x1b[0m", c.r, c.g, c.b)
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

impl<W: Write + Send> WarningView for ConsoleWarningView<W> {
    fn show(&self, remaining: u64, style: CountdownStyle) -> Result<(), WarningViewError> {
        let banner = "\nYou have been inactive for a while.\n\
                      Type `stay` to remain signed in or `logout` to sign out now.\n";
        self.write(&format!("{banner}{}", self.countdown(remaining, style)))
            .map_err(|e| WarningViewError(e.to_string()))
    }

    fn update(&self, remaining: u64, style: CountdownStyle) {
        let _ = self.write(&format!("\r\x1b[2K{}", self.countdown(remaining, style)));
    }

    fn hide(&self) {
        let _ = self.write("\r\x1b[2K\n");
    }
}

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AlertSound for TerminalBell {
    fn play(&self) -> Result<(), AlertError> {
        let mut out = io::stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| AlertError(e.to_string()))
    }
}
