use crate::core::{CodeRecord, Result, TaxonomyProvider};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// A taxonomy snapshot held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticTaxonomy {
    records: Vec<CodeRecord>,
}

impl StaticTaxonomy {
    pub fn new(records: Vec<CodeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn categories(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.category.clone()).collect()
    }

    pub fn records_in(&self, categories: &BTreeSet<String>) -> Vec<CodeRecord> {
        self.records
            .iter()
            .filter(|r| categories.contains(&r.category))
            .cloned()
            .collect()
    }
}

impl From<Vec<CodeRecord>> for StaticTaxonomy {
    fn from(records: Vec<CodeRecord>) -> Self {
        Self::new(records)
    }
}

#[async_trait]
impl TaxonomyProvider for StaticTaxonomy {
    async fn distinct_categories(&self) -> Result<BTreeSet<String>> {
        Ok(self.categories())
    }

    async fn find_records(&self, categories: &BTreeSet<String>) -> Result<Vec<CodeRecord>> {
        Ok(self.records_in(categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_taxonomy_lookups() {
        let taxonomy = StaticTaxonomy::from(vec![
            CodeRecord::new("Food", "Fruits", "Fresh apples and pears", "10000100"),
            CodeRecord::new("Food", "Vegetables", "Fresh carrots and potatoes", "10000200"),
            CodeRecord::new("Beverage", "Soft Drinks", "Carbonated cola drinks", "20000100"),
        ]);

        let categories = tokio_test::block_on(taxonomy.distinct_categories()).unwrap();
        assert_eq!(categories.len(), 2);

        let food: BTreeSet<String> = ["Food".to_string()].into_iter().collect();
        let records = tokio_test::block_on(taxonomy.find_records(&food)).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category == "Food"));

        let none = tokio_test::block_on(taxonomy.find_records(&BTreeSet::new())).unwrap();
        assert!(none.is_empty());
    }
}
