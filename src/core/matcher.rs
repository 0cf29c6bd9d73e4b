use crate::core::scoring::{category_relevance, SimilarityMeasure, TokenSet, Tokenizer};
use crate::domain::model::{CodeRecord, ScoredMatch};
use crate::domain::ports::TaxonomyProvider;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Tunables of the matching algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherSettings {
    /// A category is selected when its relevance is strictly above this.
    pub min_category_relevance: f64,
    /// Keep at most this many categories (plus ties at the cut-off).
    pub max_categories: Option<usize>,
    /// Lowest record score accepted as a match.
    pub min_confidence: f64,
    pub measure: SimilarityMeasure,
    pub extra_stopwords: Vec<String>,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            min_category_relevance: 0.0,
            max_categories: None,
            min_confidence: 0.15,
            measure: SimilarityMeasure::Jaccard,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Matches free-text product descriptions to taxonomy codes.
pub struct Matcher<P: TaxonomyProvider> {
    provider: P,
    settings: MatcherSettings,
    tokenizer: Tokenizer,
}

impl<P: TaxonomyProvider> Matcher<P> {
    pub fn new(provider: P, settings: MatcherSettings) -> Self {
        let tokenizer = Tokenizer::new(&settings.extra_stopwords);
        Self {
            provider,
            settings,
            tokenizer,
        }
    }

    pub fn with_defaults(provider: P) -> Self {
        Self::new(provider, MatcherSettings::default())
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the code of the best matching record, or `None`.
    ///
    /// Provider failures are logged and reported as no-match.
    pub async fn match_code(&self, description: &str) -> Option<String> {
        self.best_match(description).await.map(|m| m.code)
    }

    pub async fn best_match(&self, description: &str) -> Option<ScoredMatch> {
        match self.try_best_match(description).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("⚠️ Taxonomy lookup failed, treating as no match: {}", e);
                None
            }
        }
    }

    /// Same as [`Matcher::best_match`] but surfaces provider failures.
    pub async fn try_best_match(&self, description: &str) -> Result<Option<ScoredMatch>> {
        let input_tokens = self.tokenizer.tokens(description);
        if input_tokens.is_empty() {
            tracing::debug!("Description has no significant tokens: {:?}", description);
            return Ok(None);
        }

        let categories = self.provider.distinct_categories().await?;
        if categories.is_empty() {
            tracing::warn!("Taxonomy provider returned no categories");
            return Ok(None);
        }

        let selected = self.select_categories(description, &input_tokens, &categories);
        tracing::debug!(
            "Selected {}/{} categories: {:?}",
            selected.len(),
            categories.len(),
            selected
        );

        let mut candidates = self.fetch_candidates(&selected).await?;
        let mut best = self.select_best(&input_tokens, &mut candidates);

        if !self.is_confident(best.as_ref()) && selected.len() < categories.len() {
            let remaining: BTreeSet<String> =
                categories.difference(&selected).cloned().collect();
            tracing::debug!(
                "No confident match in narrowed categories, widening to {} more",
                remaining.len()
            );
            candidates.extend(self.fetch_candidates(&remaining).await?);
            best = self.select_best(&input_tokens, &mut candidates);
        }

        let result = best.filter(|m| self.is_confident(Some(m)));
        match &result {
            Some(m) => tracing::info!(
                "✅ Matched {:?} to {} ({}, score {:.3})",
                description,
                m.code,
                m.category,
                m.score
            ),
            None => tracing::info!("No match for {:?}", description),
        }
        Ok(result)
    }

    /// Categories whose relevance exceeds the threshold, or all of them when
    /// none does.
    fn select_categories(
        &self,
        description: &str,
        input_tokens: &TokenSet,
        categories: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let input_lower = description.to_lowercase();
        let mut relevant: Vec<(&String, f64)> = categories
            .iter()
            .map(|c| {
                (
                    c,
                    category_relevance(&self.tokenizer, &input_lower, input_tokens, c),
                )
            })
            .filter(|(_, score)| *score > self.settings.min_category_relevance)
            .collect();

        if relevant.is_empty() {
            tracing::debug!("No category is relevant, falling back to all categories");
            return categories.clone();
        }

        if let Some(limit) = self.settings.max_categories.filter(|k| *k > 0) {
            if relevant.len() > limit {
                relevant.sort_by(|a, b| b.1.total_cmp(&a.1));
                let cutoff = relevant[limit - 1].1;
                relevant.retain(|(_, score)| *score >= cutoff);
            }
        }

        relevant.into_iter().map(|(c, _)| c.clone()).collect()
    }

    async fn fetch_candidates(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        let records = self.provider.find_records(categories).await?;
        let fetched = records.len();

        let candidates: Vec<CodeRecord> = records
            .into_iter()
            .filter(|r| categories.contains(&r.category) && !r.code.trim().is_empty())
            .collect();

        if candidates.len() < fetched {
            tracing::warn!(
                "Discarded {} records outside the requested categories or without a code",
                fetched - candidates.len()
            );
        }
        tracing::debug!("Scoring {} candidate records", candidates.len());
        Ok(candidates)
    }

    /// Highest scoring candidate; ties go to the lowest code.
    fn select_best(
        &self,
        input_tokens: &TokenSet,
        candidates: &mut [CodeRecord],
    ) -> Option<ScoredMatch> {
        candidates.sort_by(|a, b| {
            (&a.code, &a.category, &a.code_description).cmp(&(
                &b.code,
                &b.category,
                &b.code_description,
            ))
        });

        let mut best: Option<(&CodeRecord, f64)> = None;
        for record in candidates.iter() {
            let record_tokens = self.tokenizer.tokens(&format!(
                "{} {}",
                record.code_description, record.code_definition
            ));
            let score = self.settings.measure.score(input_tokens, &record_tokens);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((record, score));
            }
        }

        best.map(|(record, score)| ScoredMatch::from_record(record, score))
    }

    fn is_confident(&self, candidate: Option<&ScoredMatch>) -> bool {
        candidate.is_some_and(|m| m.score > 0.0 && m.score >= self.settings.min_confidence)
    }
}
