//! Exponential backoff with jitter for outbound connections to the config
//! and ingestion services (spec §4.4).

use std::time::Duration;

use rand::Rng;

/// Whether a failure is worth retrying. Connection refused/reset, timeout,
/// service-unavailable, resource-exhausted, and aborted are transient;
/// invalid-argument, not-found, permission-denied, and cancelled are
/// terminal and must fail immediately (spec §4.4, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Terminal,
}

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Symmetric jitter band, e.g. 0.1 for ±10%.
    pub jitter: f64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: 0.1,
            max_attempts: 8,
        }
    }
}

/// Tracks the retry attempt counter for one logical operation (one call
/// site, not shared across calls). Construct fresh per operation attempt
/// loop.
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Delay before the next retry, or `None` if the attempt budget is
    /// exhausted. Advances the internal attempt counter.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_attempts {
            return None;
        }
        let exp = self.config.multiplier.powi(self.attempt as i32);
        let raw = self.config.base_delay.mul_f64(exp).min(self.config.max_delay);
        self.attempt += 1;

        let jitter_frac = rand::thread_rng().gen_range(-self.config.jitter..=self.config.jitter);
        let jittered = raw.mul_f64(1.0 + jitter_frac);
        Some(jittered.min(self.config.max_delay))
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod backoff_tests;
