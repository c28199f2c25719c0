//! Read-side indicator computation over the stored price history.

use crate::domain::errors::PipelineError;
use crate::domain::indicators::{self, DEFAULT_RSI_PERIOD, RsiStatus};
use crate::domain::price;
use crate::domain::repositories::{InstrumentRepository, PriceRepository};
use anyhow::Result;
use std::sync::Arc;

/// Moving-average windows reported alongside RSI.
const MA_PERIODS: [usize; 3] = [20, 60, 120];

#[derive(Debug, Clone)]
pub struct IndicatorSummary {
    pub code: String,
    pub rsi: f64,
    pub rsi_status: RsiStatus,
    /// (period, value) per configured window; `None` where the history
    /// is shorter than the window. Callers needing a fallback substitute
    /// the latest close themselves.
    pub moving_averages: Vec<(usize, Option<f64>)>,
    pub latest_close: Option<i64>,
    pub history_len: usize,
}

pub struct IndicatorService {
    instruments: Arc<dyn InstrumentRepository>,
    prices: Arc<dyn PriceRepository>,
}

impl IndicatorService {
    pub fn new(
        instruments: Arc<dyn InstrumentRepository>,
        prices: Arc<dyn PriceRepository>,
    ) -> Self {
        Self {
            instruments,
            prices,
        }
    }

    pub async fn summarize(&self, code: &str) -> Result<IndicatorSummary> {
        let instrument = self
            .instruments
            .find_by_code(code)
            .await?
            .ok_or_else(|| PipelineError::InstrumentNotFound {
                code: code.to_string(),
            })?;

        // history() returns ascending by trade date, as the calculators
        // require.
        let history = self.prices.history(instrument.id).await?;
        let closes = price::closes(&history);

        let rsi = indicators::rsi(&closes, DEFAULT_RSI_PERIOD);
        let moving_averages = MA_PERIODS
            .iter()
            .map(|&period| (period, indicators::moving_average(&closes, period)))
            .collect();

        Ok(IndicatorSummary {
            code: instrument.code,
            rsi,
            rsi_status: RsiStatus::from_rsi(Some(rsi)),
            moving_averages,
            latest_close: history.last().and_then(|r| r.close()),
            history_len: history.len(),
        })
    }
}
