//! Inter-call pacing configuration parsing from environment variables.
//!
//! Defaults mirror the external providers' request-rate limits: about
//! ten price calls per second, three classifier calls per second, two
//! feed fetches per second across instruments.

use std::env;

#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub price_call_delay_ms: u64,
    pub classifier_call_delay_ms: u64,
    pub instrument_delay_ms: u64,
}

impl PacingConfig {
    pub fn from_env() -> Self {
        Self {
            price_call_delay_ms: parse_delay("PRICE_CALL_DELAY_MS", 100),
            classifier_call_delay_ms: parse_delay("CLASSIFIER_CALL_DELAY_MS", 350),
            instrument_delay_ms: parse_delay("INSTRUMENT_DELAY_MS", 500),
        }
    }
}

fn parse_delay(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
