use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spot instrument quote as supplied by a snapshot source.
///
/// The three change fields are optional scraped values; when the upstream
/// page exposes them they take precedence over anything we could compute
/// from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotQuote {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// USD per metric ton
    pub price: Decimal,
    /// CNY per metric ton; present for carbonate, absent for spodumene
    #[serde(rename = "priceCNY", default)]
    pub price_cny: Option<Decimal>,
    #[serde(rename = "changeUSD", default)]
    pub change_usd: Option<Decimal>,
    #[serde(rename = "changeCNY", default)]
    pub change_cny: Option<Decimal>,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    pub unit: String,
    /// No futures curve exists for this instrument (spodumene)
    pub spot_only: bool,
}

/// One GFEX futures contract quote (CNY-denominated).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureQuote {
    /// Contract code, e.g. "LC2602" = Feb 2026
    pub contract: String,
    /// Display label, e.g. "Feb-26"
    pub month: String,
    #[serde(rename = "priceCNY")]
    pub price_cny: Decimal,
}

/// Raw price snapshot from a source. Futures order is display order and is
/// preserved through the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub carbonate: SpotQuote,
    pub spodumene: SpotQuote,
    pub futures: Vec<FutureQuote>,
}

/// Prior-day baseline used for change computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub date: NaiveDate,
    pub carbonate: HistoryPrice,
    pub spodumene: HistoryPrice,
    pub futures: Vec<HistoryFuture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPrice {
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFuture {
    pub contract: String,
    #[serde(rename = "priceCNY")]
    pub price_cny: Decimal,
}

impl HistorySnapshot {
    /// Project a current snapshot into a baseline record (the save-history
    /// action). Whole-record replacement, never a field merge.
    pub fn from_snapshot(snapshot: &Snapshot, date: NaiveDate) -> Self {
        Self {
            date,
            carbonate: HistoryPrice {
                price: snapshot.carbonate.price,
            },
            spodumene: HistoryPrice {
                price: snapshot.spodumene.price,
            },
            futures: snapshot
                .futures
                .iter()
                .map(|f| HistoryFuture {
                    contract: f.contract.clone(),
                    price_cny: f.price_cny,
                })
                .collect(),
        }
    }
}

/// Display-ready instrument: quote fields plus resolved day-over-day change.
/// Both change fields are always present in the JSON, as a number or an
/// explicit null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedInstrument {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub price: Decimal,
    #[serde(rename = "priceCNY")]
    pub price_cny: Option<Decimal>,
    pub unit: String,
    pub spot_only: bool,
    /// Absolute change in USD, 2 dp
    pub change: Option<Decimal>,
    /// Percent change, 2 dp
    pub change_percent: Option<Decimal>,
}

/// Display-ready futures contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFuture {
    pub contract: String,
    pub month: String,
    #[serde(rename = "priceCNY")]
    pub price_cny: Decimal,
    /// USD per metric ton, integer-rounded
    pub price: i64,
    /// Percent change vs the prior-day CNY price, 2 dp
    pub change: Option<Decimal>,
}

/// The complete derived record served to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPrices {
    pub carbonate: DerivedInstrument,
    pub spodumene: DerivedInstrument,
    pub futures: Vec<DerivedFuture>,
    /// Implied CNY/USD rate, 4 dp
    pub conversion_rate: Decimal,
    /// Generation time, not data time
    pub last_updated: DateTime<Utc>,
    pub history_date: Option<NaiveDate>,
}

/// Error types for the price service
#[derive(Debug, thiserror::Error)]
pub enum PricesError {
    #[error("source request failed: {0}")]
    SourceError(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("invalid quote data: {0}")]
    InvalidQuote(String),

    #[error("history store error: {0}")]
    HistoryError(String),
}

/// Result type for price service operations
pub type Result<T> = std::result::Result<T, PricesError>;

/// Trait for snapshot sources (hardcoded constants, remote endpoints, ...)
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current raw price snapshot
    async fn fetch(&self) -> Result<Snapshot>;

    /// Source name
    fn name(&self) -> &str;
}

/// Trait for the prior-day baseline store. Save replaces the whole record.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Result<Option<HistorySnapshot>>;

    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()>;
}
