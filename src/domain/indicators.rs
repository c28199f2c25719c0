//! Technical indicators over a date-ordered closing-price series.
//!
//! Pure functions: no I/O, no state. The caller is responsible for
//! sorting the series ascending by date before invoking.

use std::fmt;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Relative Strength Index over the most recent `period` price deltas.
///
/// Returns a neutral 50.0 when fewer than `period + 1` points exist, and
/// 100.0 when the average loss is exactly zero. Always in [0, 100],
/// rounded to 2 decimal places.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let recent = &deltas[deltas.len() - period..];

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for delta in recent {
        if *delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += delta.abs();
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    round2(100.0 - 100.0 / (1.0 + rs))
}

/// Simple moving average of the most recent `period` closes.
///
/// Returns `None` when the series is shorter than `period`; callers that
/// need a fallback substitute their own sentinel (typically the latest
/// close), never a value computed from a partial window.
pub fn moving_average(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let sum: f64 = closes[closes.len() - period..].iter().sum();
    Some(round2(sum / period as f64))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiStatus {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiStatus {
    /// ≥ 70 overbought, ≤ 30 oversold, otherwise neutral. An undefined
    /// RSI maps to neutral.
    pub fn from_rsi(rsi: Option<f64>) -> Self {
        match rsi {
            Some(v) if v >= 70.0 => Self::Overbought,
            Some(v) if v <= 30.0 => Self::Oversold,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for RsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overbought => "overbought",
            Self::Oversold => "oversold",
            Self::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}
