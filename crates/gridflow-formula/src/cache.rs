//! Memoisation of formula arithmetic.
//!
//! Entries are keyed by the normalised formula text plus the values of its
//! references in order of appearance, so a changed precedent simply misses.
//! Capacity is bounded; the least recently used entry is evicted first.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;
use tracing::trace;

use gridflow_core::CellError;

use crate::evaluator::evaluate_expression;
use crate::formula::Formula;

/// Default number of cached results
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    formula: String,
    // f64 bit patterns, so the key is hashable and -0.0 != 0.0
    inputs: Vec<u64>,
}

impl CacheKey {
    fn new(formula: &Formula, inputs: &[f64]) -> Self {
        Self {
            formula: formula.source().to_string(),
            inputs: inputs.iter().map(|v| v.to_bits()).collect(),
        }
    }
}

/// Cumulative cache counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of times the expression evaluator actually ran
    pub evaluations: u64,
}

/// Bounded LRU cache in front of the expression evaluator
pub struct EvaluationCache {
    entries: LruCache<CacheKey, f64>,
    stats: CacheStats,
}

impl EvaluationCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Evaluate `formula` with `inputs` substituted for its references.
    ///
    /// `inputs` holds one value per reference in order of appearance.
    /// Only successful results are cached.
    pub fn evaluate(&mut self, formula: &Formula, inputs: &[f64]) -> Result<f64, CellError> {
        let key = CacheKey::new(formula, inputs);

        if let Some(value) = self.entries.get(&key) {
            self.stats.hits += 1;
            trace!(formula = formula.source(), "evaluation cache hit");
            return Ok(*value);
        }
        self.stats.misses += 1;

        let expression = formula.substitute(inputs)?;
        self.stats.evaluations += 1;
        let value = evaluate_expression(&expression)?;

        self.entries.put(key, value);
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Drop every entry; counters are kept
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> EvaluationCache {
        EvaluationCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_second_evaluation_is_a_hit() {
        let mut cache = cache(16);
        let formula = Formula::parse("=A1+B1*2");

        assert_eq!(cache.evaluate(&formula, &[1.0, 3.0]), Ok(7.0));
        assert_eq!(cache.evaluate(&formula, &[1.0, 3.0]), Ok(7.0));

        let stats = cache.stats();
        assert_eq!(stats.evaluations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_changed_input_misses() {
        let mut cache = cache(16);
        let formula = Formula::parse("=A1+1");

        assert_eq!(cache.evaluate(&formula, &[1.0]), Ok(2.0));
        assert_eq!(cache.evaluate(&formula, &[5.0]), Ok(6.0));
        assert_eq!(cache.stats().evaluations, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_whitespace_and_dollars_share_an_entry() {
        let mut cache = cache(16);
        cache.evaluate(&Formula::parse("=A$1 + 1"), &[1.0]).unwrap();
        cache.evaluate(&Formula::parse("=A1+1"), &[1.0]).unwrap();
        assert_eq!(cache.stats().evaluations, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = cache(16);
        let formula = Formula::parse("=1/A1");

        assert_eq!(cache.evaluate(&formula, &[0.0]), Err(CellError::DivisionByZero));
        assert_eq!(cache.evaluate(&formula, &[0.0]), Err(CellError::DivisionByZero));
        assert_eq!(cache.stats().evaluations, 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_grammar_error() {
        let mut cache = cache(16);
        let formula = Formula::parse("=1/0*X9Z");
        assert_eq!(cache.evaluate(&formula, &[0.0]), Err(CellError::Syntax));
    }

    #[test]
    fn test_capacity_bound() {
        let mut cache = cache(2);
        let formula = Formula::parse("=A1");
        for i in 0..10 {
            cache.evaluate(&formula, &[i as f64]).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);

        // Oldest entries were evicted
        cache.evaluate(&formula, &[0.0]).unwrap();
        assert_eq!(cache.stats().evaluations, 11);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(EvaluationCache::default().capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
