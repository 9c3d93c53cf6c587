//! Resilience primitives required of the agent's outbound connections to
//! the config and ingestion services (spec §4.4): exponential backoff with
//! jitter, and a per-dependency circuit breaker.

pub mod backoff;
pub mod circuit_breaker;

pub use backoff::{Backoff, BackoffConfig, ErrorClass};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
