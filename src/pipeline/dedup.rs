/*!
 * Batch deduplication.
 *
 * Collapses a batch of input strings into unique values plus an index map
 * back to original positions, so repeated fragments within one batch cost a
 * single provider call and a single cache lookup.
 */

use std::collections::HashMap;

/// Result of deduplicating a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Deduped {
    /// Distinct strings in order of first appearance
    pub unique: Vec<String>,
    /// For each original position, the index into `unique`
    pub indexes: Vec<usize>,
}

impl Deduped {
    /// Expand per-unique results back to the original batch shape
    pub fn expand<T: Clone>(&self, unique_results: &[T]) -> Vec<T> {
        self.indexes
            .iter()
            .map(|&i| unique_results[i].clone())
            .collect()
    }
}

/// Deduplicate a batch by exact string equality, preserving first-appearance
/// order. Empty input yields empty outputs.
pub fn dedupe(texts: &[String]) -> Deduped {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(texts.len());
    let mut unique = Vec::new();
    let mut indexes = Vec::with_capacity(texts.len());

    for text in texts {
        let idx = *seen.entry(text.as_str()).or_insert_with(|| {
            unique.push(text.clone());
            unique.len() - 1
        });
        indexes.push(idx);
    }

    Deduped { unique, indexes }
}
