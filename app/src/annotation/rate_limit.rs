// ==============================================================================
// annotation/rate_limit.rs - Minimum-Interval Pacing for External Services
// ==============================================================================
// Description: Single-flight rate gate with an injectable clock
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Time source used for pacing
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` advances time instantly and records the request
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += duration;
    }

    /// All sleeps requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}

/// Enforces a minimum gap between the end of one call and the start of the next
pub struct RateGate {
    name: &'static str,
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    last_call: Option<Instant>,
}

impl RateGate {
    pub fn new(name: &'static str, min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            min_interval,
            clock,
            last_call: None,
        }
    }

    /// Sleep until the minimum interval since the previous call has passed
    pub async fn wait(&mut self) {
        let Some(last) = self.last_call else {
            return;
        };

        let elapsed = self.clock.now().saturating_duration_since(last);
        if elapsed < self.min_interval {
            let remaining = self.min_interval - elapsed;
            debug!("{} gate: waiting {:?}", self.name, remaining);
            self.clock.sleep(remaining).await;
        }
    }

    /// Record that a call just finished
    pub fn mark(&mut self) {
        self.last_call = Some(self.clock.now());
    }

    /// Run `call` once its turn comes, then start the next interval
    pub async fn run<F, T>(&mut self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        self.wait().await;
        let output = call.await;
        self.mark();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_never_waits() {
        let clock = Arc::new(ManualClock::new());
        let mut gate = RateGate::new("test", Duration::from_millis(300), clock.clone());

        gate.run(async {}).await;
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_calls_wait_full_interval() {
        let clock = Arc::new(ManualClock::new());
        let mut gate = RateGate::new("vep", Duration::from_millis(300), clock.clone());

        for _ in 0..3 {
            gate.run(async {}).await;
        }

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(300); 2]);
    }

    #[tokio::test]
    async fn test_elapsed_time_counts_towards_interval() {
        let clock = Arc::new(ManualClock::new());
        let mut gate = RateGate::new("civic", Duration::from_millis(500), clock.clone());

        gate.run(async {}).await;
        clock.advance(Duration::from_millis(200));
        gate.run(async {}).await;
        clock.advance(Duration::from_secs(1));
        gate.run(async {}).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(300)]);
    }

    #[tokio::test]
    async fn test_run_returns_call_output() {
        let clock = Arc::new(ManualClock::new());
        let mut gate = RateGate::new("test", Duration::from_millis(10), clock);

        assert_eq!(gate.run(async { 42 }).await, 42);
    }
}
