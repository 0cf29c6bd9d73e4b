use crate::core::matcher::MatcherSettings;
use crate::core::scoring::SimilarityMeasure;
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub matcher: Option<MatcherConfig>,
    pub taxonomy: TaxonomyConfig,
    pub cache: Option<CacheConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub min_category_relevance: Option<f64>,
    pub max_categories: Option<usize>,
    pub min_confidence: Option<f64>,
    pub measure: Option<String>,
    pub extra_stopwords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
}

/// 解析後的分類資料來源
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomySource {
    Http {
        endpoint: String,
        headers: HashMap<String, String>,
        timeout: Option<Duration>,
    },
    File {
        path: String,
    },
}

const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

impl TaxonomyConfig {
    pub fn http(endpoint: impl Into<String>) -> Self {
        Self {
            r#type: "http".to_string(),
            endpoint: Some(endpoint.into()),
            path: None,
            timeout_seconds: None,
            headers: None,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            r#type: "file".to_string(),
            endpoint: None,
            path: Some(path.into()),
            timeout_seconds: None,
            headers: None,
        }
    }
}

impl TomlConfig {
    pub fn new(taxonomy: TaxonomyConfig) -> Self {
        Self {
            matcher: None,
            taxonomy,
            cache: None,
            monitoring: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TAXONOMY_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MatchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.taxonomy_source()?;

        if let Some(matcher) = &self.matcher {
            if let Some(relevance) = matcher.min_category_relevance {
                validation::validate_score("matcher.min_category_relevance", relevance)?;
            }
            if let Some(confidence) = matcher.min_confidence {
                validation::validate_score("matcher.min_confidence", confidence)?;
            }
            if let Some(limit) = matcher.max_categories {
                validation::validate_category_limit("matcher.max_categories", limit)?;
            }
            if let Some(measure) = &matcher.measure {
                measure.parse::<SimilarityMeasure>()?;
            }
        }

        Ok(())
    }

    /// 取得資料來源設定
    pub fn taxonomy_source(&self) -> Result<TaxonomySource> {
        match self.taxonomy.r#type.as_str() {
            "http" => {
                let endpoint = validation::required("taxonomy.endpoint", &self.taxonomy.endpoint)?;
                validation::validate_endpoint("taxonomy.endpoint", endpoint)?;
                Ok(TaxonomySource::Http {
                    endpoint: endpoint.clone(),
                    headers: self.taxonomy.headers.clone().unwrap_or_default(),
                    timeout: self.taxonomy.timeout_seconds.map(Duration::from_secs),
                })
            }
            "file" => {
                let path = validation::required("taxonomy.path", &self.taxonomy.path)?;
                validation::validate_snapshot_path("taxonomy.path", path)?;
                Ok(TaxonomySource::File { path: path.clone() })
            }
            other => Err(MatchError::InvalidConfigValueError {
                field: "taxonomy.type".to_string(),
                value: other.to_string(),
                reason: "Unsupported taxonomy type. Valid types: http, file".to_string(),
            }),
        }
    }

    /// 取得比對參數，未設定者使用預設值
    pub fn matcher_settings(&self) -> Result<MatcherSettings> {
        let defaults = MatcherSettings::default();
        let Some(matcher) = &self.matcher else {
            return Ok(defaults);
        };

        let measure = match &matcher.measure {
            Some(name) => name.parse()?,
            None => defaults.measure,
        };

        Ok(MatcherSettings {
            min_category_relevance: matcher
                .min_category_relevance
                .unwrap_or(defaults.min_category_relevance),
            max_categories: matcher.max_categories.or(defaults.max_categories),
            min_confidence: matcher.min_confidence.unwrap_or(defaults.min_confidence),
            measure,
            extra_stopwords: matcher.extra_stopwords.clone().unwrap_or_default(),
        })
    }

    /// 快取存活時間；未啟用快取時為 None
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| Duration::from_secs(c.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS)))
            .filter(|ttl| !ttl.is_zero())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[matcher]
min_category_relevance = 0.2
max_categories = 3
min_confidence = 0.3
measure = "overlap"
extra_stopwords = ["pack"]

[taxonomy]
type = "http"
endpoint = "https://taxonomy.example.com/api"
timeout_seconds = 5
headers = { Authorization = "Bearer abc" }

[cache]
enabled = true
ttl_seconds = 60

[monitoring]
log_level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.matcher_settings().unwrap();
        assert_eq!(settings.min_category_relevance, 0.2);
        assert_eq!(settings.max_categories, Some(3));
        assert_eq!(settings.min_confidence, 0.3);
        assert_eq!(settings.measure, SimilarityMeasure::Overlap);
        assert_eq!(settings.extra_stopwords, vec!["pack".to_string()]);

        match config.taxonomy_source().unwrap() {
            TaxonomySource::Http {
                endpoint,
                headers,
                timeout,
            } => {
                assert_eq!(endpoint, "https://taxonomy.example.com/api");
                assert_eq!(headers.get("Authorization").unwrap(), "Bearer abc");
                assert_eq!(timeout, Some(Duration::from_secs(5)));
            }
            other => panic!("unexpected source: {:?}", other),
        }

        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.log_level(), Some("debug"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[taxonomy]
type = "file"
path = "./taxonomy.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.matcher_settings().unwrap(), MatcherSettings::default());
        assert_eq!(
            config.taxonomy_source().unwrap(),
            TaxonomySource::File {
                path: "./taxonomy.csv".to_string()
            }
        );
        assert_eq!(config.cache_ttl(), None);
    }

    #[test]
    fn test_cache_defaults_and_zero_ttl() {
        let mut config = TomlConfig::new(TaxonomyConfig::file("taxonomy.json"));
        config.cache = Some(CacheConfig {
            enabled: true,
            ttl_seconds: None,
        });
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(300)));

        config.cache = Some(CacheConfig {
            enabled: true,
            ttl_seconds: Some(0),
        });
        assert_eq!(config.cache_ttl(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GPC_TEST_TAXONOMY_ENDPOINT", "https://test.taxonomy.com");

        let toml_content = r#"
[taxonomy]
type = "http"
endpoint = "${GPC_TEST_TAXONOMY_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.taxonomy.endpoint.as_deref(),
            Some("https://test.taxonomy.com")
        );

        std::env::remove_var("GPC_TEST_TAXONOMY_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[taxonomy]\ntype = \"http\"\nendpoint = \"invalid-url\"\n",
            "[taxonomy]\ntype = \"http\"\n",
            "[taxonomy]\ntype = \"file\"\npath = \"taxonomy.xlsx\"\n",
            "[taxonomy]\ntype = \"mongodb\"\n",
            "[matcher]\nmin_confidence = 1.5\n[taxonomy]\ntype = \"file\"\npath = \"t.csv\"\n",
            "[matcher]\nmax_categories = 0\n[taxonomy]\ntype = \"file\"\npath = \"t.csv\"\n",
            "[matcher]\nmeasure = \"cosine\"\n[taxonomy]\ntype = \"file\"\npath = \"t.csv\"\n",
        ];

        for content in invalid {
            let config = TomlConfig::from_toml_str(content).unwrap();
            assert!(config.validate().is_err(), "expected invalid: {}", content);
        }
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[taxonomy]
type = "file"
path = "gpc.json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.taxonomy.path.as_deref(), Some("gpc.json"));
    }
}
