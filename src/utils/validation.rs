use crate::adapters::stored::SnapshotFormat;
use crate::utils::error::{MatchError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> MatchError {
    MatchError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn required<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| MatchError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty"));
    }
    Ok(())
}

/// 分類服務端點必須是 http(s) URL
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    validate_non_empty(field, endpoint)?;

    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            endpoint,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

/// Checks a snapshot path or object key and returns the format it will be
/// parsed with.
pub fn validate_snapshot_path(field: &str, path: &str) -> Result<SnapshotFormat> {
    validate_non_empty(field, path)?;
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }

    SnapshotFormat::from_path(path).map_err(|_| {
        invalid(
            field,
            path,
            "Unsupported taxonomy file. Valid extensions: csv, json",
        )
    })
}

/// Thresholds and relevance cut-offs live in [0, 1]; NaN is rejected.
pub fn validate_score(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, value, "Value must be between 0 and 1"));
    }
    Ok(())
}

pub fn validate_category_limit(field: &str, limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(invalid(field, limit, "At least one category must be kept"));
    }
    Ok(())
}
