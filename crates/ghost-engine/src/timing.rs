//! Tick pacing for realtime runs.
//!
//! Sleeps away whatever is left of each tick's budget and keeps a short
//! history of tick durations for the end-of-run summary.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Paces a tick loop against the wall clock.
#[derive(Debug)]
pub struct TickPacer {
    /// Time budget per tick
    budget: Duration,
    /// Start of the current tick
    last_tick: Instant,
    /// Ticks that ran past their budget
    overruns: u64,
    /// Recent tick durations in seconds
    tick_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl TickPacer {
    /// Create a pacer for ticks of `tick_ms` milliseconds.
    #[must_use]
    pub fn new(tick_ms: u64) -> Self {
        Self {
            budget: Duration::from_millis(tick_ms.max(1)),
            last_tick: Instant::now(),
            overruns: 0,
            tick_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Time budget per tick.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Block until the current tick's budget is spent, then start the next.
    pub fn wait(&mut self) {
        let elapsed = self.last_tick.elapsed();
        if elapsed < self.budget {
            std::thread::sleep(self.budget - elapsed);
        } else if !self.tick_times.is_empty() {
            self.overruns += 1;
        }

        let now = Instant::now();
        self.tick_times
            .push_back((now - self.last_tick).as_secs_f32());
        if self.tick_times.len() > self.max_samples {
            self.tick_times.pop_front();
        }
        self.last_tick = now;
    }

    /// Number of ticks whose work took longer than the budget.
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Average tick time in milliseconds over recent ticks.
    #[must_use]
    pub fn average_tick_ms(&self) -> f32 {
        if self.tick_times.is_empty() {
            return 0.0;
        }

        (self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32) * 1000.0
    }

    /// Restart timing, e.g. between the recording and the replay.
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.overruns = 0;
        self.tick_times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_clamped() {
        let pacer = TickPacer::new(0);
        assert_eq!(pacer.budget(), Duration::from_millis(1));
        assert!(pacer.average_tick_ms().abs() < f32::EPSILON);
    }

    #[test]
    fn test_wait_fills_the_budget() {
        let mut pacer = TickPacer::new(5);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert!(pacer.average_tick_ms() >= 5.0);
        assert_eq!(pacer.overruns(), 0);
    }

    #[test]
    fn test_slow_tick_counts_as_overrun() {
        let mut pacer = TickPacer::new(1);
        pacer.wait();
        std::thread::sleep(Duration::from_millis(5));
        pacer.wait();
        assert_eq!(pacer.overruns(), 1);

        pacer.reset();
        assert_eq!(pacer.overruns(), 0);
    }
}
