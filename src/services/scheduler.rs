//! Tick sources for the progress controller.
//!
//! A [`Scheduler`] hands out one stream of ticks per job. The controller
//! drops the stream when the job ends, so a scheduler never has to track
//! which job it is driving.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Capacity of the manual tick channel.
const MANUAL_TICK_CAPACITY: usize = 1024;

/// Produces the tick stream that drives a single job.
pub trait Scheduler: Send + Sync + 'static {
    fn ticks(&self, interval: Duration) -> BoxStream<'static, ()>;
}

/// Real-time scheduler: one tick every `interval`, first tick one interval
/// after submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntervalScheduler;

impl Scheduler for IntervalScheduler {
    fn ticks(&self, interval: Duration) -> BoxStream<'static, ()> {
        let mut timer = interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        stream::unfold(timer, |mut timer| async move {
            timer.tick().await;
            Some(((), timer))
        })
        .boxed()
    }
}

/// Scheduler driven by explicit [`ManualScheduler::advance`] calls.
///
/// The interval is ignored. Ticks sent while no job is subscribed are lost.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    tx: broadcast::Sender<()>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(MANUAL_TICK_CAPACITY);
        Self { tx }
    }

    /// Deliver `ticks` ticks to the job currently subscribed.
    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            if self.tx.send(()).is_err() {
                tracing::trace!("Manual tick dropped, no job subscribed");
                return;
            }
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn ticks(&self, _interval: Duration) -> BoxStream<'static, ()> {
        let rx = self.tx.subscribe();

        stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(()) => return Some(((), rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Manual scheduler lagged, ticks dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
