//! Prometheus metrics for the auth core.
//!
//! Counters are registered in the default registry on first use.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dominion_auth_tokens_issued_total",
        "Total number of tokens issued",
        &["algorithm"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Verification outcomes, labelled by which key slot matched.
pub static VERIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dominion_auth_verifications_total",
        "Total number of token verifications",
        &["outcome", "key_slot"]
    )
    .expect("Failed to register verifications metric")
});

/// Guard decisions.
pub static GUARD_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dominion_auth_guard_decisions_total",
        "Total number of role guard decisions",
        &["guard", "outcome"]
    )
    .expect("Failed to register guard_decisions metric")
});

/// Record a token issuance.
pub fn record_token_issued(algorithm: &str) {
    TOKENS_ISSUED.with_label_values(&[algorithm]).inc();
}

/// Record a verification outcome. `key_slot` is `none` when no key matched.
pub fn record_verification(outcome: &str, key_slot: &str) {
    VERIFICATIONS.with_label_values(&[outcome, key_slot]).inc();
}

/// Record a guard decision.
pub fn record_guard_decision(guard: &str, outcome: &str) {
    GUARD_DECISIONS.with_label_values(&[guard, outcome]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = VERIFICATIONS.with_label_values(&["expired", "primary"]).get();
        record_verification("expired", "primary");
        assert!(VERIFICATIONS.with_label_values(&["expired", "primary"]).get() > before);
    }

    #[test]
    fn test_guard_counter_labels() {
        record_guard_decision("metrics-test", "denied");
        assert!(GUARD_DECISIONS.with_label_values(&["metrics-test", "denied"]).get() >= 1);
    }
}
