//! Background auto growth: one [`GrowthEngine::grow_once`] per interval tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use super::{GrowError, GrowthEngine};

/// Counts for one auto-growth run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoGrowSummary {
    /// Cycles that ran (committed or failed). Skipped triggers are not counted.
    pub cycles: usize,
    pub committed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Configures and spawns the auto-growth task.
pub struct AutoGrower {
    engine: Arc<GrowthEngine>,
    interval: Duration,
    max_cycles: Option<usize>,
}

impl AutoGrower {
    /// Uses the engine's configured interval.
    pub fn new(engine: Arc<GrowthEngine>) -> Self {
        let interval = engine.config().auto_interval;
        Self {
            engine,
            interval,
            max_cycles: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Ends the task on its own after `n` cycles.
    pub fn with_max_cycles(mut self, n: usize) -> Self {
        self.max_cycles = Some(n);
        self
    }

    /// Spawns the loop. The first cycle runs one interval after spawning.
    pub fn spawn(self) -> AutoGrowHandle {
        let running = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(Notify::new());
        let task = tokio::spawn(run(
            self.engine,
            self.interval,
            self.max_cycles,
            Arc::clone(&running),
            Arc::clone(&stop),
        ));
        AutoGrowHandle {
            running,
            stop,
            task,
        }
    }
}

async fn run(
    engine: Arc<GrowthEngine>,
    period: Duration,
    max_cycles: Option<usize>,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
) -> AutoGrowSummary {
    let mut summary = AutoGrowSummary::default();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(interval_ms = period.as_millis() as u64, ?max_cycles, "auto growth started");

    while running.load(Ordering::SeqCst) {
        if max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.notified() => break,
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match engine.grow_once().await {
            Ok(_) => {
                summary.cycles += 1;
                summary.committed += 1;
            }
            Err(GrowError::CycleInFlight) => summary.skipped += 1,
            Err(_) => {
                summary.cycles += 1;
                summary.failed += 1;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    tracing::info!(
        cycles = summary.cycles,
        committed = summary.committed,
        failed = summary.failed,
        "auto growth stopped"
    );
    summary
}

/// Handle to a running auto-growth task.
pub struct AutoGrowHandle {
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    task: JoinHandle<AutoGrowSummary>,
}

impl AutoGrowHandle {
    pub fn is_auto_growing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// No new cycle starts after this; a cycle already in flight completes.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_one();
    }

    /// Waits for the task to end (after [`stop`](Self::stop) or `max_cycles`).
    pub async fn join(self) -> Result<AutoGrowSummary, JoinError> {
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthConfig;
    use crate::generate::{GenerateError, GeneratedContent, GenerationRequest, Generator};
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GeneratedContent, GenerateError> {
            Ok(GeneratedContent {
                title: "auto".into(),
                body: "grown".into(),
                score: Some(0.6),
            })
        }
    }

    /// **Scenario**: Task ends on its own after max_cycles and clears the flag.
    #[tokio::test]
    async fn stops_after_max_cycles() {
        let engine = Arc::new(GrowthEngine::new(Arc::new(Echo), GrowthConfig::default()));
        engine.add_seed("S", "seed", 1.0).await.unwrap();
        let handle = AutoGrower::new(Arc::clone(&engine))
            .with_interval(Duration::from_millis(5))
            .with_max_cycles(3)
            .spawn();
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.committed, 3);
        assert_eq!(engine.all().await.len(), 4);
    }

    /// **Scenario**: stop() before the first tick ends the task without growing.
    #[tokio::test]
    async fn stop_before_first_tick_grows_nothing() {
        let engine = Arc::new(GrowthEngine::new(Arc::new(Echo), GrowthConfig::default()));
        engine.add_seed("S", "seed", 1.0).await.unwrap();
        let handle = AutoGrower::new(Arc::clone(&engine))
            .with_interval(Duration::from_secs(60))
            .spawn();
        assert!(handle.is_auto_growing());
        handle.stop();
        assert!(!handle.is_auto_growing());
        let summary = handle.join().await.unwrap();
        assert_eq!(summary, AutoGrowSummary::default());
        assert_eq!(engine.all().await.len(), 1);
    }

    /// **Scenario**: Failed cycles are counted and the loop keeps going.
    #[tokio::test]
    async fn failures_do_not_stop_the_loop() {
        let engine = Arc::new(GrowthEngine::new(Arc::new(Echo), GrowthConfig::default()));
        let summary = AutoGrower::new(engine)
            .with_interval(Duration::from_millis(5))
            .with_max_cycles(2)
            .spawn()
            .join()
            .await
            .unwrap();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.committed, 0);
    }
}
