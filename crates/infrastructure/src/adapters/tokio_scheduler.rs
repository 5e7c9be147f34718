//! Real-time scheduler backed by tokio timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::stream::BoxStream;
use sgdis_application::Scheduler;
use sgdis_domain::TimerKind;
use tokio::task::JoinHandle;
use tracing::trace;

type Armed = Arc<Mutex<HashMap<TimerKind, (u64, JoinHandle<()>)>>>;

/// A [`Scheduler`] that sleeps on the tokio runtime.
///
/// Fired timers come out of the stream returned by
/// [`TokioScheduler::new`]. A timer that was replaced or cancelled after it
/// fired but before it was read is filtered out.
#[derive(Debug)]
pub struct TokioScheduler {
    tx: UnboundedSender<(TimerKind, u64)>,
    armed: Armed,
    generation: AtomicU64,
}

impl TokioScheduler {
    /// Creates the scheduler and the stream of fired timers.
    #[must_use]
    pub fn new() -> (Self, BoxStream<'static, TimerKind>) {
        let (tx, rx) = unbounded();
        let armed: Armed = Arc::default();

        let live = Arc::clone(&armed);
        let fired = rx
            .filter_map(move |(timer, generation)| {
                let mut armed = live.lock().unwrap_or_else(PoisonError::into_inner);
                let current = armed
                    .get(&timer)
                    .is_some_and(|(armed_generation, _)| *armed_generation == generation);
                if current {
                    armed.remove(&timer);
                }
                futures::future::ready(current.then_some(timer))
            })
            .boxed();

        let scheduler = Self {
            tx,
            armed,
            generation: AtomicU64::new(0),
        };
        (scheduler, fired)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, timer: TimerKind, after: Duration) {
        let generation = self.next_generation();
        let tx = self.tx.clone();

        // Hold the table while spawning so a zero delay cannot fire unseen.
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // The receiver is gone once the monitor stops.
            let _ = tx.unbounded_send((timer, generation));
        });
        trace!(?timer, ?after, generation, "Timer armed");
        if let Some((_, previous)) = armed.insert(timer, (generation, handle)) {
            previous.abort();
        }
    }

    fn cancel(&self, timer: TimerKind) {
        let previous = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&timer);
        if let Some((_, handle)) = previous {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, (_, handle)) in armed.drain() {
            handle.abort();
        }
    }
}
