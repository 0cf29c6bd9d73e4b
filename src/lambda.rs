use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use gpc_matcher::adapters::{HttpTaxonomyProvider, S3Storage, StoredTaxonomy};
use gpc_matcher::app::{MatchRequest, MatchService, SharedTaxonomy};
use gpc_matcher::config::lambda::{LambdaConfig, LambdaTaxonomySource};
use gpc_matcher::utils::logger;
use gpc_matcher::utils::validation::Validate;
use gpc_matcher::{CachedTaxonomy, Matcher};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

async fn build_service(config: &LambdaConfig) -> Result<MatchService<SharedTaxonomy>, Error> {
    let provider: SharedTaxonomy = match &config.taxonomy {
        LambdaTaxonomySource::Http { endpoint } => {
            Arc::new(HttpTaxonomyProvider::new(endpoint.clone()))
        }
        LambdaTaxonomySource::S3 { bucket, key } => {
            // 創建AWS配置和S3客戶端
            let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
            let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                .region(Region::new(config.s3_region.clone()))
                .force_path_style(true)
                .build();
            let storage = S3Storage::new(S3Client::from_conf(s3_config), bucket.clone());
            Arc::new(StoredTaxonomy::new(storage, key.clone())?)
        }
    };

    let provider: SharedTaxonomy = if config.cache_ttl().is_zero() {
        provider
    } else {
        Arc::new(CachedTaxonomy::new(provider, config.cache_ttl()))
    };

    Ok(MatchService::new(Matcher::new(
        provider,
        config.matcher_settings(),
    )))
}

async fn function_handler(
    service: &MatchService<SharedTaxonomy>,
    event: LambdaEvent<serde_json::Value>,
) -> Result<Response, Error> {
    tracing::info!("Handling match request {}", event.context.request_id);

    let request = MatchRequest::from_event(event.payload);
    let reply = service.reply(&request).await;

    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    Ok(Response {
        status_code: reply.status,
        headers,
        body: reply.body.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    // 在多次呼叫之間共用比對器與快取
    let service = Arc::new(build_service(&config).await?);

    run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let service = Arc::clone(&service);
        async move { function_handler(&service, event).await }
    }))
    .await
}
