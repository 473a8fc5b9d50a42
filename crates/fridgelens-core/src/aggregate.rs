//! Union of ingredient names across detection results.

use std::collections::BTreeSet;

use crate::detect::normalize::canonical_name;
use crate::types::{AggregatedIngredients, DetectionResult};

/// Incremental aggregator, fed one result at a time.
#[derive(Debug, Default)]
pub struct Aggregator {
    canonicalize: bool,
    names: BTreeSet<String>,
    succeeded: usize,
    failed: usize,
}

impl Aggregator {
    /// `canonicalize` folds common synonyms (e.g. "egg", "卵") onto one name
    /// before deduplication. Off means exact string match.
    pub fn new(canonicalize: bool) -> Self {
        Self {
            canonicalize,
            ..Self::default()
        }
    }

    pub fn add(&mut self, result: &DetectionResult) {
        if result.is_error() {
            self.failed += 1;
            return;
        }
        self.succeeded += 1;
        for label in result.ingredients() {
            let name = if self.canonicalize {
                canonical_name(label)
            } else {
                label.to_string()
            };
            self.names.insert(name);
        }
    }

    pub fn finish(self) -> AggregatedIngredients {
        AggregatedIngredients {
            ingredients: self.names.into_iter().collect(),
            succeeded: self.succeeded,
            failed: self.failed,
        }
    }
}

/// Exact-match union of ingredient names, sorted. Error-tagged results are
/// skipped and counted as failures.
pub fn aggregate(results: &[DetectionResult]) -> AggregatedIngredients {
    let mut aggregator = Aggregator::default();
    for result in results {
        aggregator.add(result);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::Prediction;

    fn result(labels: &[&str]) -> DetectionResult {
        DetectionResult {
            image: "x.jpg".into(),
            backend: "mock".into(),
            predictions: labels.iter().map(|l| Prediction::label(*l)).collect(),
            raw: None,
            error: None,
            error_message: None,
            latency_ms: 0,
        }
    }

    #[test]
    fn test_union_is_sorted_and_unique() {
        let agg = aggregate(&[result(&["a", "b"]), result(&["b", "c"])]);
        assert_eq!(agg.ingredients, vec!["a", "b", "c"]);
        assert_eq!(agg.succeeded, 2);
        assert_eq!(agg.failed, 0);
    }

    #[test]
    fn test_error_results_skipped_and_counted() {
        let failed = DetectionResult::degraded("y.jpg", "mock", ErrorKind::Timeout, "slow", None);
        let agg = aggregate(&[result(&["牛乳"]), failed]);
        assert_eq!(agg.ingredients, vec!["牛乳"]);
        assert_eq!(agg.succeeded, 1);
        assert_eq!(agg.failed, 1);
        assert!(!agg.all_succeeded());
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[]);
        assert!(agg.ingredients.is_empty());
        assert!(!agg.all_succeeded());
    }

    #[test]
    fn test_exact_match_by_default() {
        let agg = aggregate(&[result(&["卵", "egg", "たまご"])]);
        assert_eq!(agg.ingredients.len(), 3);
    }

    #[test]
    fn test_canonicalize_folds_synonyms() {
        let mut aggregator = Aggregator::new(true);
        aggregator.add(&result(&["卵", "Egg"]));
        aggregator.add(&result(&["たまご", "milk", "納豆"]));
        let agg = aggregator.finish();
        assert_eq!(agg.ingredients, vec!["たまご", "牛乳", "納豆"]);
    }
}
