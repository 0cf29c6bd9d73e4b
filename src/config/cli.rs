use crate::config::toml_config::{MatcherConfig, TaxonomyConfig, TomlConfig};
use crate::utils::error::{MatchError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "gpc-matcher")]
#[command(about = "Match product descriptions to classification codes")]
pub struct CliConfig {
    /// Product descriptions to classify
    #[arg(required = true)]
    pub descriptions: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Taxonomy snapshot file (.csv or .json), overrides the config file
    #[arg(long, conflicts_with = "taxonomy_url")]
    pub taxonomy_file: Option<String>,

    /// Taxonomy service base URL, overrides the config file
    #[arg(long)]
    pub taxonomy_url: Option<String>,

    /// Override the minimum confidence score
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Print the matched record and its score instead of the bare code
    #[arg(long)]
    pub explain: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => match (&self.taxonomy_file, &self.taxonomy_url) {
                (Some(path), _) => TomlConfig::new(TaxonomyConfig::file(path.clone())),
                (None, Some(url)) => TomlConfig::new(TaxonomyConfig::http(url.clone())),
                (None, None) => {
                    return Err(MatchError::MissingConfigError {
                        field: "--config, --taxonomy-file or --taxonomy-url".to_string(),
                    })
                }
            },
        };

        if self.config.is_some() {
            if let Some(path) = &self.taxonomy_file {
                config.taxonomy = TaxonomyConfig::file(path.clone());
            } else if let Some(url) = &self.taxonomy_url {
                config.taxonomy = TaxonomyConfig::http(url.clone());
            }
        }

        if let Some(confidence) = self.min_confidence {
            config
                .matcher
                .get_or_insert_with(MatcherConfig::default)
                .min_confidence = Some(confidence);
        }

        Ok(config)
    }
}
