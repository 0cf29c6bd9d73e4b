use crate::utils::error::{MatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

pub type TokenSet = BTreeSet<String>;

const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "as", "at", "be", "by", "each", "etc", "for", "from", "in",
    "including", "into", "is", "it", "its", "not", "of", "on", "or", "other", "per", "such",
    "that", "the", "these", "this", "to", "with", "without",
];

/// Lower-cases text and splits it into significant word tokens.
///
/// A token is a maximal run of alphanumeric characters, so punctuation and
/// word order never affect the resulting set.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(extra_stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stopwords: HashSet<String> =
            DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect();
        stopwords.extend(
            extra_stopwords
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        Self { stopwords }
    }

    pub fn tokens(&self, text: &str) -> TokenSet {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMeasure {
    /// |A∩B| / |A∪B|
    #[default]
    Jaccard,
    /// |A∩B| / min(|A|, |B|)
    Overlap,
}

impl SimilarityMeasure {
    pub fn score(&self, a: &TokenSet, b: &TokenSet) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let shared = a.intersection(b).count();
        if shared == 0 {
            return 0.0;
        }
        let denominator = match self {
            SimilarityMeasure::Jaccard => a.len() + b.len() - shared,
            SimilarityMeasure::Overlap => a.len().min(b.len()),
        };
        shared as f64 / denominator as f64
    }
}

impl FromStr for SimilarityMeasure {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "jaccard" => Ok(SimilarityMeasure::Jaccard),
            "overlap" => Ok(SimilarityMeasure::Overlap),
            other => Err(MatchError::InvalidConfigValueError {
                field: "matcher.measure".to_string(),
                value: other.to_string(),
                reason: "Unsupported measure. Valid measures: jaccard, overlap".to_string(),
            }),
        }
    }
}

/// Relevance of a category label to an input description, in [0, 1].
///
/// 1.0 when the whole label occurs in the input, otherwise the share of the
/// label's significant tokens that the input contains.
pub fn category_relevance(
    tokenizer: &Tokenizer,
    input_lower: &str,
    input_tokens: &TokenSet,
    category: &str,
) -> f64 {
    let label = category.trim().to_lowercase();
    if label.is_empty() {
        return 0.0;
    }
    if input_lower.contains(&label) {
        return 1.0;
    }

    let label_tokens = tokenizer.tokens(&label);
    if label_tokens.is_empty() {
        return 0.0;
    }
    let shared = label_tokens.intersection(input_tokens).count();
    shared as f64 / label_tokens.len() as f64
}
