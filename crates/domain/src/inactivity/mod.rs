//! Inactivity timeout model.

mod machine;
mod style;

pub use machine::{
    ActivityKind, Effect, InactivityEvent, InactivityMachine, InactivityState, TimerKind,
};
pub use style::{CountdownStyle, Rgb, format_remaining};
