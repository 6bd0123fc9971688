//! Simulated multi-turn case generation with progress reporting.

use std::time::Duration;

use tracing::{debug, info};

use tcs_model::CaseDocument;

pub const DEFAULT_PROGRESS_STEP: u8 = 10;
pub const DEFAULT_TICK_DELAY: Duration = Duration::from_millis(300);

/// One generation request. Yields copies of its seed cases once progress
/// reaches 100.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    seeds: Vec<CaseDocument>,
    step: u8,
    delay: Duration,
}

impl GenerationRun {
    pub fn new(seeds: Vec<CaseDocument>) -> Self {
        Self {
            seeds,
            step: DEFAULT_PROGRESS_STEP,
            delay: DEFAULT_TICK_DELAY,
        }
    }

    /// Progress increment per tick, at least 1.
    #[must_use]
    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step.max(1);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Percentages reported by [`run`](Self::run), in order.
    pub fn ticks(&self) -> Vec<u8> {
        let mut ticks = Vec::new();
        let mut percent = 0u8;
        loop {
            ticks.push(percent);
            if percent >= 100 {
                break ticks;
            }
            percent = percent.saturating_add(self.step).min(100);
        }
    }

    /// Sleeps before each tick, reports it, then returns the generated
    /// cases. Dropping the future cancels the run.
    pub async fn run<F>(&self, mut on_progress: F) -> Vec<CaseDocument>
    where
        F: FnMut(u8),
    {
        for percent in self.ticks() {
            tokio::time::sleep(self.delay).await;
            debug!(percent, "generation progress");
            on_progress(percent);
        }
        info!(cases = self.seeds.len(), "generation finished");
        self.seeds.clone()
    }
}
