//! Sampling filter (spec §4.2.3): stateless, per-entry, draws from a
//! cryptographic random source so sampling cannot be predicted externally.

use logline_protocol::{Level, SamplingPolicy};
use rand::Rng;

/// Whether to keep `message`/`level` under `policy`. `rate_for` already
/// implements the base-rate + first-matching-content-rule lookup (spec
/// §4.2.3 steps 1-2); this adds the probabilistic keep decision (step 3).
pub fn should_keep(policy: &SamplingPolicy, level: Level, message: &str) -> bool {
    let rate = policy.rate_for(level, message);
    if rate >= 1.0 {
        return true;
    }
    if rate <= 0.0 {
        return false;
    }
    rand::thread_rng().r#gen::<f64>() < rate
}
