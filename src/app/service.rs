use crate::core::matcher::Matcher;
use crate::core::TaxonomyProvider;
use crate::utils::error::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// Body of a match request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub product_description: Option<String>,
}

impl MatchRequest {
    pub fn new(product_description: impl Into<String>) -> Self {
        Self {
            product_description: Some(product_description.into()),
        }
    }

    /// Reads a request from a raw event, either the request body itself or an
    /// API Gateway proxy event carrying it as a JSON string in `body`.
    /// Unreadable events yield a request without a description.
    pub fn from_event(event: serde_json::Value) -> Self {
        let payload = match event.get("body") {
            Some(serde_json::Value::String(body)) => {
                serde_json::from_str(body).unwrap_or(serde_json::Value::Null)
            }
            _ => event,
        };
        serde_json::from_value(payload).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status code and JSON payload returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: serde_json::Value,
}

/// The single request/response operation in front of the matcher.
pub struct MatchService<P: TaxonomyProvider> {
    matcher: Matcher<P>,
}

impl<P: TaxonomyProvider> MatchService<P> {
    pub fn new(matcher: Matcher<P>) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &Matcher<P> {
        &self.matcher
    }

    /// Rejects a missing or blank description before the matcher runs.
    pub async fn handle(&self, request: &MatchRequest) -> Result<MatchResponse> {
        let description = request
            .product_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| MatchError::InvalidInput {
                message: "productDescription is required".to_string(),
            })?;

        let code = self.matcher.match_code(description).await;
        Ok(MatchResponse { code })
    }

    pub async fn reply(&self, request: &MatchRequest) -> Reply {
        match self.handle(request).await {
            Ok(response) => Reply {
                status: 200,
                body: serde_json::json!(response),
            },
            Err(e) => {
                tracing::warn!("Rejected match request: {}", e);
                Reply {
                    status: status_code(&e),
                    body: serde_json::json!(ErrorResponse {
                        error: e.to_string(),
                    }),
                }
            }
        }
    }
}

pub fn status_code(error: &MatchError) -> u16 {
    match error {
        MatchError::InvalidInput { .. } => 400,
        MatchError::ApiError(_) | MatchError::ProviderError { .. } => 502,
        _ => 500,
    }
}
