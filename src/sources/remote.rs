use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::types::{PricesError, Result, Snapshot, SnapshotSource};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Snapshot source that pulls a JSON `Snapshot` document from a remote
/// endpoint (the scraped-values deployment variant: a separate scraper
/// publishes the document, this service only reads it).
///
/// Single attempt per fetch; retry/backoff is the scraper's problem.
pub struct RemoteQuoteSource {
    client: Client,
    url: String,
}

impl RemoteQuoteSource {
    pub fn new(url: impl Into<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(
                    timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                ))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for RemoteQuoteSource {
    async fn fetch(&self) -> Result<Snapshot> {
        debug!("Fetching quote snapshot from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PricesError::SourceError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PricesError::SourceError(format!(
                "quote endpoint error ({}): {}",
                status, text
            )));
        }

        response
            .json::<Snapshot>()
            .await
            .map_err(|e| PricesError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn snapshot_body() -> serde_json::Value {
        json!({
            "carbonate": {
                "id": "lithium-carbonate",
                "name": "Lithium Carbonate",
                "grade": "99.5% Li2CO3 min, battery grade",
                "price": 22704,
                "priceCNY": 164700,
                "changeUSD": 12.5,
                "unit": "USD/T",
                "spotOnly": false
            },
            "spodumene": {
                "id": "spodumene",
                "name": "Spodumene Concentrate",
                "grade": "6% Li2O min, CIF China",
                "price": 6950,
                "unit": "USD/T",
                "spotOnly": true
            },
            "futures": [
                { "contract": "LC2601", "month": "Jan-26", "priceCNY": 165080 },
                { "contract": "LC2602", "month": "Feb-26", "priceCNY": 164920 }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .mount(&server)
            .await;

        let source = RemoteQuoteSource::new(format!("{}/quotes", server.uri()), Some(5));
        let snapshot = source.fetch().await.unwrap();

        assert_eq!(snapshot.carbonate.id, "lithium-carbonate");
        assert_eq!(
            snapshot.carbonate.price_cny,
            Some(rust_decimal::Decimal::from(164700))
        );
        assert_eq!(
            snapshot.carbonate.change_usd,
            Some(rust_decimal::Decimal::new(125, 1))
        );
        // Optional change fields default to absent
        assert_eq!(snapshot.spodumene.change_percent, None);
        assert_eq!(snapshot.futures.len(), 2);
        assert_eq!(snapshot.futures[0].contract, "LC2601");
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let source = RemoteQuoteSource::new(format!("{}/quotes", server.uri()), Some(5));
        assert!(matches!(
            source.fetch().await,
            Err(PricesError::SourceError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"carbonate\": \"nope\"}"))
            .mount(&server)
            .await;

        let source = RemoteQuoteSource::new(format!("{}/quotes", server.uri()), Some(5));
        assert!(matches!(
            source.fetch().await,
            Err(PricesError::InvalidResponse(_))
        ));
    }
}
