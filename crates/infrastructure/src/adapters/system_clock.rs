//! System clock adapter

use chrono::{DateTime, Utc};
use sgdis_application::ports::Clock;

/// Wall-clock time, used for token expiry and cookie lifetimes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
