//! User-facing ports: navigation, notifications and the inactivity warning.

use sgdis_domain::CountdownStyle;
use thiserror::Error;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user should notice.
    Warning,
}

/// A toast-like notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// A warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Shows transient notifications.
pub trait Notifier: Send + Sync {
    /// Displays a notice.
    fn notify(&self, notice: Notice);
}

/// Moves the user to another page.
pub trait Navigator: Send + Sync {
    /// Navigates to `path`.
    fn redirect(&self, path: &str);
}

/// The warning could not be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("warning view unavailable: {0}")]
pub struct WarningViewError(pub String);

/// Renders the inactivity warning and its countdown.
pub trait WarningView: Send + Sync {
    /// Shows the warning with its initial countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the warning cannot be rendered.
    fn show(&self, remaining: u64, style: CountdownStyle) -> Result<(), WarningViewError>;

    /// Updates the countdown.
    fn update(&self, remaining: u64, style: CountdownStyle);

    /// Dismisses the warning.
    fn hide(&self);
}

/// The alert sound could not be played.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("alert unavailable: {0}")]
pub struct AlertError(pub String);

/// Optional audible cue when the warning appears.
pub trait AlertSound: Send + Sync {
    /// Plays the cue.
    ///
    /// # Errors
    ///
    /// Returns an error if no sound could be produced.
    fn play(&self) -> Result<(), AlertError>;
}
