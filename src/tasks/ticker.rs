//! The repeating badge tick

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::channel::Envelope;

/// A scheduled tick task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owns at most one tick task at a time
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    inbox: mpsc::WeakUnboundedSender<Envelope>,
    current: Option<TickHandle>,
    last_generation: u64,
}

impl Ticker {
    pub fn new(period: Duration, inbox: mpsc::WeakUnboundedSender<Envelope>) -> Self {
        Self {
            period,
            inbox,
            current: None,
            last_generation: 0,
        }
    }

    /// Schedule a fresh tick task, cancelling any existing one first.
    /// Returns the new generation.
    pub fn start(&mut self) -> u64 {
        self.stop();

        self.last_generation += 1;
        let generation = self.last_generation;
        let period = self.period;
        let inbox = self.inbox.clone();

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(inbox) = inbox.upgrade() else {
                    debug!("Engine inbox gone, tick {} exiting", generation);
                    break;
                };
                if inbox.send(Envelope::Tick { generation }).is_err() {
                    break;
                }
            }
        });

        debug!("Tick {} scheduled every {:?}", generation, period);
        self.current = Some(TickHandle { generation, task });
        generation
    }

    /// Cancel the current tick task. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.current.take() {
            Some(handle) => {
                debug!("Tick {} cancelled", handle.generation());
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a tick from `generation` should still be acted on
    pub fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| handle.generation == generation)
    }
}
