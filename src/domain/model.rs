use serde::{Deserialize, Serialize};

/// One leaf entry of the classification taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecord {
    pub category: String,
    pub code: String,
    pub code_description: String,
    pub code_definition: String,
}

impl CodeRecord {
    pub fn new(
        category: impl Into<String>,
        code_description: impl Into<String>,
        code_definition: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            code: code.into(),
            code_description: code_description.into(),
            code_definition: code_definition.into(),
        }
    }
}

/// The winning record for a description, with the score that selected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMatch {
    pub code: String,
    pub category: String,
    pub code_description: String,
    pub score: f64,
}

impl ScoredMatch {
    pub fn from_record(record: &CodeRecord, score: f64) -> Self {
        Self {
            code: record.code.clone(),
            category: record.category.clone(),
            code_description: record.code_description.clone(),
            score,
        }
    }
}
