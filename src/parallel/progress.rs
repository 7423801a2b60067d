//! Throttled progress notifications.
//!
//! Milestones (stage changes, completion) always reach the callback. Routine
//! updates are dropped when they arrive sooner than `min_interval` after the
//! previous delivered notice, so a UI thread on the other end never floods.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Baselines,
    InitialFill,
    GapFill,
    LocalSearch,
    Finalize,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Baselines => "baselines",
            Self::InitialFill => "initial fill",
            Self::GapFill => "gap fill",
            Self::LocalSearch => "local search",
            Self::Finalize => "finalize",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub stage: Stage,
    pub message: String,
}

pub struct Progress<F> {
    callback: F,
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl<F> Progress<F>
where
    F: FnMut(&ProgressUpdate),
{
    pub fn new(callback: F, min_interval: Duration) -> Self {
        Self {
            callback,
            min_interval,
            last_sent: None,
        }
    }

    /// Always delivered.
    pub fn milestone(&mut self, stage: Stage, message: impl Into<String>) {
        self.send(stage, message.into());
    }

    /// Delivered only if the interval has elapsed; the message is built lazily.
    pub fn update<M>(&mut self, stage: Stage, message: M)
    where
        M: FnOnce() -> String,
    {
        let due = self
            .last_sent
            .map_or(true, |last| last.elapsed() >= self.min_interval);
        if due {
            self.send(stage, message());
        }
    }

    fn send(&mut self, stage: Stage, message: String) {
        tracing::debug!(stage = %stage, %message, "progress");
        (self.callback)(&ProgressUpdate { stage, message });
        self.last_sent = Some(Instant::now());
    }
}
