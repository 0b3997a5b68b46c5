use rust_decimal::Decimal;

use crate::contracts::ContractCode;
use crate::types::{FutureQuote, Result, Snapshot, SnapshotSource, SpotQuote};

/// Static display metadata for the published instruments
pub struct InstrumentMeta {
    pub name: &'static str,
    pub grade: &'static str,
    pub unit: &'static str,
    pub spot_only: bool,
}

/// Instrument catalog keyed by instrument id
pub static INSTRUMENT_CATALOG: phf::Map<&'static str, InstrumentMeta> = phf::phf_map! {
    "lithium-carbonate" => InstrumentMeta {
        name: "Lithium Carbonate",
        grade: "99.5% Li2CO3 min, battery grade",
        unit: "USD/T",
        spot_only: false,
    },
    "spodumene" => InstrumentMeta {
        name: "Spodumene Concentrate",
        grade: "6% Li2O min, CIF China",
        unit: "USD/T",
        spot_only: true,
    },
};

// Last manually updated quote set
const CARBONATE_USD: i64 = 22704;
const CARBONATE_CNY: i64 = 164700;
const SPODUMENE_USD: i64 = 6950;

/// GFEX curve, in display order (front month first)
const FUTURES_CNY: &[(&str, i64)] = &[
    ("LC2601", 165080),
    ("LC2602", 164920),
    ("LC2603", 164500),
    ("LC2605", 163880),
    ("LC2607", 163100),
    ("LC2609", 162400),
    ("LC2611", 161950),
];

/// Snapshot source backed by hardcoded constants. The zero-infrastructure
/// deployment variant: prices are updated by editing the constants above.
pub struct StaticQuoteSource;

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self
    }

    /// Build the snapshot synchronously (also used directly by tests)
    pub fn snapshot() -> Snapshot {
        Snapshot {
            carbonate: spot_quote(
                "lithium-carbonate",
                Decimal::from(CARBONATE_USD),
                Some(Decimal::from(CARBONATE_CNY)),
            ),
            spodumene: spot_quote("spodumene", Decimal::from(SPODUMENE_USD), None),
            futures: FUTURES_CNY
                .iter()
                .map(|&(contract, price_cny)| FutureQuote {
                    contract: contract.to_string(),
                    month: ContractCode::parse(contract)
                        .map(|c| c.month_label())
                        .unwrap_or_default(),
                    price_cny: Decimal::from(price_cny),
                })
                .collect(),
        }
    }
}

impl Default for StaticQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

fn spot_quote(id: &str, price: Decimal, price_cny: Option<Decimal>) -> SpotQuote {
    let meta = INSTRUMENT_CATALOG
        .get(id)
        .expect("instrument id present in catalog");
    SpotQuote {
        id: id.to_string(),
        name: meta.name.to_string(),
        grade: meta.grade.to_string(),
        price,
        price_cny,
        change_usd: None,
        change_cny: None,
        change_percent: None,
        unit: meta.unit.to_string(),
        spot_only: meta.spot_only,
    }
}

#[async_trait::async_trait]
impl SnapshotSource for StaticQuoteSource {
    async fn fetch(&self) -> Result<Snapshot> {
        Ok(Self::snapshot())
    }

    fn name(&self) -> &str {
        "static"
    }
}
