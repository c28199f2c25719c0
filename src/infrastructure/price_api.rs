//! HTTP adapter for the external daily price source.
//!
//! One request per (instrument, date): page size 1, page 1, JSON result.
//! The service key is issued pre-encoded, so the URL is assembled by
//! hand instead of letting the client re-encode it. Numeric fields
//! arrive as strings and are parsed leniently: anything unparseable
//! stays `None`.

use crate::domain::ports::PriceSource;
use crate::domain::price::PriceSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, warn};

pub struct HttpPriceSource {
    client: ClientWithMiddleware,
    base_url: String,
    service_key: String,
}

impl HttpPriceSource {
    pub fn new(client: ClientWithMiddleware, base_url: String, service_key: String) -> Self {
        Self {
            client,
            base_url,
            service_key,
        }
    }

    fn snapshot_url(&self, code: &str, date: &str) -> String {
        format!(
            "{}/getStockPriceInfo?serviceKey={}&numOfRows=1&pageNo=1&resultType=json&likeSrtnCd={}&basDt={}",
            self.base_url, self.service_key, code, date
        )
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_snapshot(&self, code: &str, date: &str) -> Result<Option<PriceSnapshot>> {
        let url = self.snapshot_url(code, date);
        debug!("Price request for {code}: basDt={date}");

        // Transient failures are retried by the middleware; once retries
        // are exhausted the call degrades to an empty result.
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Price fetch failed for {code}: {e:#}");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            warn!("Price source returned status {} for {code}", response.status());
            return Ok(None);
        }

        // A document that does not parse is terminal for this call.
        let envelope: Envelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Malformed price response for {code}: {e:#}");
                return Ok(None);
            }
        };

        let item = envelope
            .response
            .and_then(|r| r.body)
            .and_then(|b| b.items)
            .and_then(|i| i.item.into_iter().next());

        Ok(item.map(|raw| raw.into_snapshot(date)))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<ResponsePayload>,
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
    body: Option<BodyPayload>,
}

#[derive(Debug, Deserialize)]
struct BodyPayload {
    items: Option<ItemsPayload>,
}

#[derive(Debug, Deserialize)]
struct ItemsPayload {
    #[serde(default)]
    item: Vec<RawPriceItem>,
}

/// Wire record; every field is a string on the wire.
#[derive(Debug, Default, Deserialize)]
struct RawPriceItem {
    #[serde(rename = "basDt")]
    bas_dt: Option<String>,
    #[serde(rename = "isinCd")]
    isin_cd: Option<String>,
    #[serde(rename = "mrktCtg")]
    mrkt_ctg: Option<String>,
    clpr: Option<String>,
    vs: Option<String>,
    #[serde(rename = "fltRt")]
    flt_rt: Option<String>,
    mkp: Option<String>,
    hipr: Option<String>,
    lopr: Option<String>,
    trqu: Option<String>,
    #[serde(rename = "trPrc")]
    tr_prc: Option<String>,
    #[serde(rename = "lstgStCnt")]
    lstg_st_cnt: Option<String>,
    #[serde(rename = "mrktTotAmt")]
    mrkt_tot_amt: Option<String>,
}

impl RawPriceItem {
    fn into_snapshot(self, requested_date: &str) -> PriceSnapshot {
        PriceSnapshot {
            trade_date: self
                .bas_dt
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| requested_date.to_string()),
            isin: self.isin_cd,
            market_segment: self.mrkt_ctg,
            close: parse_long(&self.clpr),
            change: parse_long(&self.vs),
            change_rate: parse_double(&self.flt_rt),
            open: parse_long(&self.mkp),
            high: parse_long(&self.hipr),
            low: parse_long(&self.lopr),
            volume: parse_long(&self.trqu),
            traded_value: parse_long(&self.tr_prc),
            listed_shares: parse_long(&self.lstg_st_cnt),
            market_cap: parse_long(&self.mrkt_tot_amt),
        }
    }
}

fn parse_long(field: &Option<String>) -> Option<i64> {
    field.as_deref().and_then(|s| s.trim().parse().ok())
}

fn parse_double(field: &Option<String>) -> Option<f64> {
    field.as_deref().and_then(|s| s.trim().parse().ok())
}
