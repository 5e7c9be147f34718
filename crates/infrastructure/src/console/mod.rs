//! Terminal front-end adapters: notices, navigation, warning and bell.

mod notifier;
mod warning;

pub use notifier::{ConsoleNavigator, TracingNotifier};
pub use warning::{ConsoleWarningView, TerminalBell};
