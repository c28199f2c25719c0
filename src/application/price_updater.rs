//! Daily price time-series upsert engine.
//!
//! One snapshot per instrument per run, merged into the per-date price
//! store under the (instrument, date) uniqueness key. Re-running the
//! update for the same target date converges to the same stored values
//! and never creates duplicates.

use crate::application::pacing::PacingGate;
use crate::application::{BatchReport, CancelFlag};
use crate::domain::errors::PipelineError;
use crate::domain::instrument::Instrument;
use crate::domain::ports::PriceSource;
use crate::domain::repositories::{InstrumentRepository, PriceRepository};
use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct PriceUpdater {
    instruments: Arc<dyn InstrumentRepository>,
    prices: Arc<dyn PriceRepository>,
    source: Arc<dyn PriceSource>,
    gate: PacingGate,
    cancel: CancelFlag,
}

impl PriceUpdater {
    pub fn new(
        instruments: Arc<dyn InstrumentRepository>,
        prices: Arc<dyn PriceRepository>,
        source: Arc<dyn PriceSource>,
        gate: PacingGate,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            instruments,
            prices,
            source,
            gate,
            cancel,
        }
    }

    /// Update one instrument for the prior calendar day.
    ///
    /// `Ok(false)` means the source had no record for that date; an
    /// unknown code surfaces as [`PipelineError::InstrumentNotFound`].
    pub async fn update_one(&self, code: &str) -> Result<bool> {
        let instrument = self
            .instruments
            .find_by_code(code)
            .await?
            .ok_or_else(|| PipelineError::InstrumentNotFound {
                code: code.to_string(),
            })?;
        self.update_instrument(&instrument).await
    }

    async fn update_instrument(&self, instrument: &Instrument) -> Result<bool> {
        let date = target_date(Local::now().date_naive());
        debug!("Requesting snapshot for {} on {}", instrument.code, date);

        let snapshot = match self.source.fetch_snapshot(&instrument.code, &date).await? {
            Some(snapshot) => snapshot,
            None => return Ok(false),
        };

        self.prices.upsert(instrument.id, &snapshot).await?;
        Ok(true)
    }

    /// Update the whole universe sequentially, pacing between calls and
    /// containing per-instrument failures.
    pub async fn update_all(&self) -> Result<BatchReport> {
        let instruments = self.instruments.list_all().await?;
        let total = instruments.len();
        info!("Updating prices for {total} instruments");

        let mut report = BatchReport::default();
        for (i, instrument) in instruments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("Price update cancelled after {} of {total} instruments", i);
                break;
            }
            self.gate.pace().await;

            match self.update_instrument(instrument).await {
                Ok(true) => {
                    report.succeeded += 1;
                    info!(
                        "[{}/{total}] {} ({}) updated",
                        i + 1,
                        instrument.name,
                        instrument.code
                    );
                }
                Ok(false) => {
                    report.failed += 1;
                    warn!(
                        "[{}/{total}] {} ({}) no data for target date",
                        i + 1,
                        instrument.name,
                        instrument.code
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "[{}/{total}] {} ({}) update failed: {e:#}",
                        i + 1,
                        instrument.name,
                        instrument.code
                    );
                }
            }
        }

        info!(
            "Price update finished. succeeded: {}, failed: {}",
            report.succeeded, report.failed
        );
        Ok(report)
    }
}

/// Target date for a run: the prior calendar day, as an 8-digit key.
fn target_date(today: NaiveDate) -> String {
    (today - Duration::days(1)).format("%Y%m%d").to_string()
}
