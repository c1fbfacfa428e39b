use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::data_source::{MarketDataSource, ReturnsSource, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{EtfCode, HistoricalReturns, MarketData, SourceId};

/// Market data and historical returns served by a JSON REST API.
///
/// | Call | Endpoint |
/// |------|----------|
/// | market data | `GET {base_url}/etf/{code}` |
/// | returns | `GET {base_url}/etf/{code}/returns` |
#[derive(Clone)]
pub struct RestEtfSource {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
}

impl RestEtfSource {
    pub fn new(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http_client,
            auth: HttpAuth::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn market_url(&self, code: &EtfCode) -> String {
        format!(
            "{}/etf/{}",
            self.base_url,
            urlencoding::encode(code.as_str())
        )
    }

    fn returns_url(&self, code: &EtfCode) -> String {
        format!("{}/returns", self.market_url(code))
    }

    async fn get_json(&self, url: String) -> Result<String, SourceError> {
        let request = HttpRequest::get(&url)
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(%url, timed_out = e.timed_out(), "etf api transport error");
            SourceError::unavailable(format!("api transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            warn!(%url, status = response.status, "etf api returned non-success status");
            return Err(SourceError::status(SourceId::Api, response.status));
        }

        Ok(response.body)
    }
}

impl MarketDataSource for RestEtfSource {
    fn id(&self) -> SourceId {
        SourceId::Api
    }

    fn market_data<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, MarketData> {
        Box::pin(async move {
            let body = self.get_json(self.market_url(code)).await?;
            serde_json::from_str::<MarketData>(&body).map_err(|e| {
                SourceError::parse(format!("failed to parse market data for {code}: {e}"))
            })
        })
    }
}

impl ReturnsSource for RestEtfSource {
    fn id(&self) -> SourceId {
        SourceId::Api
    }

    fn historical_returns<'a>(&'a self, code: &'a EtfCode) -> SourceFuture<'a, HistoricalReturns> {
        Box::pin(async move {
            let body = self.get_json(self.returns_url(code)).await?;
            let payload: Value = serde_json::from_str(&body).map_err(|e| {
                SourceError::parse(format!("failed to parse returns for {code}: {e}"))
            })?;

            if !payload.is_object() {
                return Err(SourceError::parse(format!(
                    "returns payload for {code} must be a JSON object"
                )));
            }

            Ok(HistoricalReturns::from_payload(payload))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::ReturnPeriod;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn code() -> EtfCode {
        EtfCode::parse("069500").expect("valid code")
    }

    #[tokio::test]
    async fn market_data_uses_the_record_code_in_the_path() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok(
            r#"{"total_assets": 5000000000.0, "total_shares": 150000, "market_price": 33500.0}"#,
        )));
        let source = RestEtfSource::new("https://api.example.com/", client.clone());

        let data = source.market_data(&code()).await.expect("should parse");

        assert_eq!(data, MarketData::new(5_000_000_000.0, 150_000, 33_500.0));
        assert_eq!(client.urls(), vec!["https://api.example.com/etf/069500"]);
    }

    #[tokio::test]
    async fn returns_endpoint_is_nested_under_the_code() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok(r#"{"1y": 4.5, "10y": 60}"#)));
        let source = RestEtfSource::new("https://api.example.com", client.clone());

        let returns = source.historical_returns(&code()).await.expect("should parse");

        assert_eq!(returns.get(ReturnPeriod::OneYear), Some(4.5));
        assert_eq!(returns.get(ReturnPeriod::TenYears), Some(60.0));
        assert_eq!(
            client.urls(),
            vec!["https://api.example.com/etf/069500/returns"]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let client = CannedHttpClient::new(Ok(HttpResponse::new(404, "not found")));
        let source = RestEtfSource::new("https://api.example.com", client);

        let err = source.market_data(&code()).await.expect_err("must fail");

        assert_eq!(err.code(), "source.unavailable");
        assert_eq!(err.http_status(), Some(404));
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let client = CannedHttpClient::new(Err(HttpError::timeout("timed out")));
        let source = RestEtfSource::new("https://api.example.com", client);

        let err = source.historical_returns(&code()).await.expect_err("must fail");
        assert_eq!(err.code(), "source.unavailable");
    }

    #[tokio::test]
    async fn non_object_returns_payload_is_a_parse_error() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok("[1, 5, 10]")));
        let source = RestEtfSource::new("https://api.example.com", client);

        let err = source.historical_returns(&code()).await.expect_err("must fail");
        assert_eq!(err.code(), "source.parse");
    }

    #[tokio::test]
    async fn bearer_token_is_forwarded() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok("{}")));
        let source = RestEtfSource::new("https://api.example.com", client.clone())
            .with_auth(HttpAuth::BearerToken(String::from("secret")));

        source.market_data(&code()).await.expect("empty object parses");

        let requests = client
            .requests
            .lock()
            .expect("request store should not be poisoned");
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }
}
