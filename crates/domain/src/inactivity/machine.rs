//! Idle / Warning / logout state machine.
//!
//! The machine is pure: it consumes [`InactivityEvent`]s and returns the
//! [`Effect`]s the runtime must carry out (arming timers, showing the
//! warning, logging out). Timers are identified by [`TimerKind`]; arming a
//! kind that is already armed replaces it, so at most one timer of each
//! kind is ever live.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::InactivityConfig;

const TICK: Duration = Duration::from_secs(1);

/// User interaction that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Pointer button pressed.
    PointerDown,
    /// Pointer moved.
    PointerMove,
    /// Key pressed.
    KeyPress,
    /// Page scrolled.
    Scroll,
    /// Touch started.
    TouchStart,
    /// Click completed.
    Click,
}

impl ActivityKind {
    /// Every activity kind the monitor listens to.
    pub const ALL: [Self; 6] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
        Self::Click,
    ];
}

/// The logical timers driven by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Counts the quiet period toward the warning.
    Idle,
    /// One-second countdown step while the warning is shown.
    CountdownTick,
    /// Backstop that logs out if the countdown stalls.
    Failsafe,
    /// Redirect to login after the logout notice.
    Redirect,
}

impl TimerKind {
    /// Every timer kind.
    pub const ALL: [Self; 4] = [
        Self::Idle,
        Self::CountdownTick,
        Self::Failsafe,
        Self::Redirect,
    ];
}

/// Input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactivityEvent {
    /// The user did something.
    Activity(ActivityKind),
    /// A timer fired.
    Timer(TimerKind),
    /// The user chose to stay signed in.
    StayActive,
    /// The user chose to log out.
    LogoutRequested,
    /// The warning could not be rendered.
    WarningUnavailable,
    /// The monitor is being torn down.
    Stop,
}

/// Current state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InactivityState {
    /// Created but not started.
    #[default]
    Inactive,
    /// Waiting for the quiet period to elapse.
    Idle,
    /// Warning shown, counting down.
    Warning {
        /// Seconds left before logout.
        remaining: u64,
    },
    /// Logged out; only the pending redirect remains.
    LoggedOut,
    /// Torn down; every event is ignored.
    Stopped,
}

impl InactivityState {
    /// Returns true while the warning is shown.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    /// Returns true once no further transitions can happen except a redirect.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::LoggedOut | Self::Stopped)
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Arm (or re-arm) a timer.
    Arm {
        /// Which timer.
        timer: TimerKind,
        /// Delay before it fires.
        after: Duration,
    },
    /// Cancel a timer if armed.
    Cancel(TimerKind),
    /// Render the warning with its initial countdown.
    ShowWarning {
        /// Seconds shown.
        remaining: u64,
    },
    /// Refresh the countdown display.
    UpdateCountdown {
        /// Seconds shown.
        remaining: u64,
    },
    /// Dismiss the warning.
    HideWarning,
    /// Optional audible cue.
    PlayAlert,
    /// Clear credentials and show the closing notice.
    Logout,
    /// Navigate to the login page.
    Redirect,
}

/// The inactivity state machine.
#[derive(Debug, Clone)]
pub struct InactivityMachine {
    state: InactivityState,
    config: InactivityConfig,
}

impl InactivityMachine {
    /// Create a machine in the [`InactivityState::Inactive`] state.
    #[must_use]
    pub const fn new(config: InactivityConfig) -> Self {
        Self {
            state: InactivityState::Inactive,
            config,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InactivityState {
        self.state
    }

    /// Settings the machine runs with.
    #[must_use]
    pub const fn config(&self) -> &InactivityConfig {
        &self.config
    }

    /// Start watching: arms the first idle timer.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.state != InactivityState::Inactive {
            return Vec::new();
        }
        self.state = InactivityState::Idle;
        vec![self.arm_idle()]
    }

    /// Apply an event and return the effects to perform, in order.
    pub fn handle(&mut self, event: InactivityEvent) -> Vec<Effect> {
        use InactivityEvent as E;
        use InactivityState as S;

        match (self.state, event) {
            (S::Stopped, _) => Vec::new(),

            (state, E::Stop) => {
                self.state = S::Stopped;
                let mut effects: Vec<Effect> = TimerKind::ALL.map(Effect::Cancel).to_vec();
                if state.is_warning() {
                    effects.push(Effect::HideWarning);
                }
                effects
            }

            (S::Inactive, _) => Vec::new(),

            (S::Idle, E::Activity(_)) => vec![self.arm_idle()],

            (S::Idle, E::Timer(TimerKind::Idle)) => {
                let remaining = self.config.warning_secs;
                self.state = S::Warning { remaining };
                vec![
                    Effect::ShowWarning { remaining },
                    Effect::PlayAlert,
                    Effect::Arm {
                        timer: TimerKind::CountdownTick,
                        after: TICK,
                    },
                    Effect::Arm {
                        timer: TimerKind::Failsafe,
                        after: self.config.failsafe(),
                    },
                ]
            }

            (S::Idle | S::Warning { .. }, E::LogoutRequested) => self.log_out(),

            (S::Warning { remaining }, E::Timer(TimerKind::CountdownTick)) => {
                let remaining = remaining.saturating_sub(1);
                if remaining > 0 {
                    self.state = S::Warning { remaining };
                    vec![
                        Effect::UpdateCountdown { remaining },
                        Effect::Arm {
                            timer: TimerKind::CountdownTick,
                            after: TICK,
                        },
                    ]
                } else {
                    let mut effects = vec![Effect::UpdateCountdown { remaining: 0 }];
                    effects.extend(self.log_out());
                    effects
                }
            }

            (S::Warning { .. }, E::Timer(TimerKind::Failsafe)) => self.log_out(),

            (S::Warning { .. }, E::StayActive) => {
                self.state = S::Idle;
                vec![
                    Effect::HideWarning,
                    Effect::Cancel(TimerKind::CountdownTick),
                    Effect::Cancel(TimerKind::Failsafe),
                    self.arm_idle(),
                ]
            }

            (S::Warning { .. }, E::WarningUnavailable) => {
                self.state = S::Idle;
                vec![
                    Effect::Cancel(TimerKind::CountdownTick),
                    Effect::Cancel(TimerKind::Failsafe),
                ]
            }

            (S::LoggedOut, E::Timer(TimerKind::Redirect)) => vec![Effect::Redirect],

            // Activity during the warning does not dismiss it, and stale
            // timers from a previous state are ignored.
            _ => Vec::new(),
        }
    }

    fn arm_idle(&self) -> Effect {
        Effect::Arm {
            timer: TimerKind::Idle,
            after: self.config.threshold(),
        }
    }

    fn log_out(&mut self) -> Vec<Effect> {
        let was_warning = self.state.is_warning();
        self.state = InactivityState::LoggedOut;

        let mut effects = vec![
            Effect::Cancel(TimerKind::Idle),
            Effect::Cancel(TimerKind::CountdownTick),
            Effect::Cancel(TimerKind::Failsafe),
        ];
        if was_warning {
            effects.push(Effect::HideWarning);
        }
        effects.push(Effect::Logout);
        effects.push(Effect::Arm {
            timer: TimerKind::Redirect,
            after: self.config.redirect_delay(),
        });
        effects
    }
}
