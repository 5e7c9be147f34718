//! Port adapters for the runtime: HTTP transport, clock and timers.

mod reqwest_client;
mod system_clock;
mod tokio_scheduler;

pub(crate) use reqwest_client::{map_error, parse_base_url};
pub use reqwest_client::ReqwestHttpClient;
pub use system_clock::SystemClock;
pub use tokio_scheduler::TokioScheduler;
