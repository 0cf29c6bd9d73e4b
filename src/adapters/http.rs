use crate::core::{CodeRecord, TaxonomyProvider};
use crate::utils::error::{MatchError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

#[derive(Serialize)]
struct RecordsQuery<'a> {
    categories: &'a BTreeSet<String>,
}

/// Taxonomy provider that talks to a remote lookup service.
///
/// - `GET {endpoint}/categories` returns a JSON array of category names
/// - `POST {endpoint}/records` with `{"categories": [...]}` returns the records
pub struct HttpTaxonomyProvider {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpTaxonomyProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        // 添加自定義標頭
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    fn check(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        tracing::debug!("Taxonomy response status: {} ({})", status, url);

        if !status.is_success() {
            return Err(MatchError::ProviderError {
                message: format!("{} returned HTTP {}", url, status),
            });
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(body: &str, url: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| MatchError::MalformedTaxonomy {
            message: format!("unexpected response body from {}: {}", url, e),
        })
    }
}

#[async_trait]
impl TaxonomyProvider for HttpTaxonomyProvider {
    async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
        let url = self.url("categories");
        tracing::debug!("Making taxonomy request to: {}", url);

        let response = self.prepare(self.client.get(&url)).send().await?;
        let body = Self::check(response, &url)?.text().await?;
        let categories: Vec<String> = Self::decode(&body, &url)?;

        Ok(categories.into_iter().collect())
    }

    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("records");
        tracing::debug!(
            "Requesting records for {} categories from: {}",
            categories.len(),
            url
        );

        let request = self
            .client
            .post(&url)
            .json(&RecordsQuery { categories });
        let response = self.prepare(request).send().await?;
        let body = Self::check(response, &url)?.text().await?;

        Self::decode(&body, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_distinct_categories() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/categories");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!(["Food", "Beverage", "Food"]));
        });

        let provider = HttpTaxonomyProvider::new(format!("{}/", server.url("/api")));
        let categories = provider.distinct_categories().await.unwrap();

        mock.assert();
        assert_eq!(categories.len(), 2);
        assert!(categories.contains("Beverage"));
    }

    #[tokio::test]
    async fn test_find_records_sends_categories_and_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/records")
                .header("x-api-key", "secret")
                .json_body(serde_json::json!({"categories": ["Beverage", "Food"]}));
            then.status(200).json_body(serde_json::json!([
                {"category": "Food", "code": "10000100", "codeDescription": "Fruits", "codeDefinition": "Fresh apples and pears"},
                {"category": "Beverage", "code": "20000100", "codeDescription": "Soft Drinks", "codeDefinition": "Carbonated cola drinks"}
            ]));
        });

        let mut headers = HashMap::new();
        headers.insert("x-api-key".to_string(), "secret".to_string());
        let provider = HttpTaxonomyProvider::new(server.base_url()).with_headers(headers);

        let categories: BTreeSet<String> =
            ["Food".to_string(), "Beverage".to_string()].into_iter().collect();
        let records = provider.find_records(&categories).await.unwrap();

        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code_description, "Fruits");
    }

    #[tokio::test]
    async fn test_empty_category_set_skips_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/records");
            then.status(200).json_body(serde_json::json!([]));
        });

        let provider = HttpTaxonomyProvider::new(server.base_url());
        assert!(provider.find_records(&BTreeSet::new()).await.unwrap().is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/categories");
            then.status(503).body("maintenance");
        });

        let provider = HttpTaxonomyProvider::new(server.base_url());
        let err = provider.distinct_categories().await.unwrap_err();
        assert!(matches!(err, MatchError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_malformed_taxonomy() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/categories");
            then.status(200).body("{\"categories\": 3}");
        });

        let provider = HttpTaxonomyProvider::new(server.base_url());
        let err = provider.distinct_categories().await.unwrap_err();
        assert!(matches!(err, MatchError::MalformedTaxonomy { .. }));
    }

    #[tokio::test]
    async fn test_records_missing_fields_are_malformed_taxonomy() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/records");
            then.status(200)
                .json_body(serde_json::json!([{"category": "Food", "code": "10000100"}]));
        });

        let provider = HttpTaxonomyProvider::new(server.base_url());
        let categories: BTreeSet<String> = ["Food".to_string()].into_iter().collect();
        let err = provider.find_records(&categories).await.unwrap_err();
        assert!(matches!(err, MatchError::MalformedTaxonomy { .. }));
    }
}
