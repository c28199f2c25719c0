/// One market snapshot for one (instrument, calendar date) pair, as
/// returned by the external price source. Fields the source omits or
/// sends unparseable stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSnapshot {
    /// 8-digit date key, `YYYYMMDD`.
    pub trade_date: String,
    pub isin: Option<String>,
    pub market_segment: Option<String>,
    pub close: Option<i64>,
    pub change: Option<i64>,
    pub change_rate: Option<f64>,
    pub open: Option<i64>,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub volume: Option<i64>,
    pub traded_value: Option<i64>,
    pub listed_shares: Option<i64>,
    pub market_cap: Option<i64>,
}

/// A persisted price snapshot. At most one row exists per
/// (instrument, trade_date); re-ingesting the same date overwrites
/// the fields in place.
#[derive(Debug, Clone)]
pub struct PriceRecord {
    pub id: i64,
    pub instrument_id: i64,
    pub snapshot: PriceSnapshot,
}

impl PriceRecord {
    pub fn close(&self) -> Option<i64> {
        self.snapshot.close
    }
}

/// Closing prices of a date-ordered history, skipping rows without a close.
pub fn closes(history: &[PriceRecord]) -> Vec<f64> {
    history
        .iter()
        .filter_map(|record| record.close().map(|c| c as f64))
        .collect()
}
