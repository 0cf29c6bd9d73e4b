use crate::core::matcher::MatcherSettings;
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaTaxonomySource {
    Http { endpoint: String },
    S3 { bucket: String, key: String },
}

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub taxonomy: LambdaTaxonomySource,
    pub s3_region: String,
    pub min_confidence: Option<f64>,
    pub cache_ttl_seconds: u64,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let taxonomy = match (
            lookup("TAXONOMY_ENDPOINT"),
            lookup("TAXONOMY_S3_BUCKET"),
            lookup("TAXONOMY_S3_KEY"),
        ) {
            (Some(endpoint), _, _) => LambdaTaxonomySource::Http { endpoint },
            (None, Some(bucket), Some(key)) => LambdaTaxonomySource::S3 { bucket, key },
            (None, Some(_), None) => {
                return Err(MatchError::MissingConfigError {
                    field: "TAXONOMY_S3_KEY".to_string(),
                })
            }
            (None, None, _) => {
                return Err(MatchError::ConfigError {
                    message: "TAXONOMY_ENDPOINT or TAXONOMY_S3_BUCKET environment variable is required"
                        .to_string(),
                })
            }
        };

        let min_confidence = match lookup("MIN_CONFIDENCE") {
            Some(raw) => Some(raw.parse::<f64>().map_err(|e| {
                MatchError::InvalidConfigValueError {
                    field: "MIN_CONFIDENCE".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                MatchError::InvalidConfigValueError {
                    field: "CACHE_TTL_SECONDS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_CACHE_TTL_SECONDS,
        };

        Ok(Self {
            taxonomy,
            s3_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-southeast-2".to_string()),
            min_confidence,
            cache_ttl_seconds,
        })
    }

    pub fn matcher_settings(&self) -> MatcherSettings {
        let defaults = MatcherSettings::default();
        MatcherSettings {
            min_confidence: self.min_confidence.unwrap_or(defaults.min_confidence),
            ..defaults
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        match &self.taxonomy {
            LambdaTaxonomySource::Http { endpoint } => {
                validation::validate_endpoint("TAXONOMY_ENDPOINT", endpoint)?;
            }
            LambdaTaxonomySource::S3 { bucket, key } => {
                validate_s3_bucket_name("TAXONOMY_S3_BUCKET", bucket)?;
                validation::validate_snapshot_path("TAXONOMY_S3_KEY", key)?;
            }
        }

        // 驗證區域
        validate_aws_region("AWS_REGION", &self.s3_region)?;

        if let Some(confidence) = self.min_confidence {
            validation::validate_score("MIN_CONFIDENCE", confidence)?;
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(MatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(MatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(MatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validation::validate_non_empty(field_name, region)?;

    // AWS region format validation
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(MatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
