use log::warn;
use std::cmp::Ordering;
use crate::core::types::{DocId, DocumentAccessor};

/// Numeric field index: `(value, doc)` entries kept sorted for binary
/// searched range scans. NaN values are rejected at add time.
#[derive(Debug, Default)]
pub struct NumericIndex {
    entries: Vec<(f64, DocId)>,
}

fn entry_cmp(a: &(f64, DocId), b: &(f64, DocId)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl NumericIndex {
    pub fn new() -> Self {
        NumericIndex {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(value) = access.field_number(identifier) {
            if value.is_nan() {
                warn!("rejecting NaN value for doc {} field {:?}", doc, identifier);
                return;
            }
            let entry = (value, doc);
            if let Err(pos) = self.entries.binary_search_by(|e| entry_cmp(e, &entry)) {
                self.entries.insert(pos, entry);
            }
        }
    }

    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(value) = access.field_number(identifier) {
            let entry = (value, doc);
            if let Ok(pos) = self.entries.binary_search_by(|e| entry_cmp(e, &entry)) {
                self.entries.remove(pos);
            }
        }
    }

    /// Collect the ids of all entries inside the given bounds, sorted by
    /// DocId. Bounds are inclusive unless the matching `_excl` flag is set.
    pub fn range(&self, lo: f64, lo_excl: bool, hi: f64, hi_excl: bool) -> Vec<DocId> {
        let start = self
            .entries
            .partition_point(|&(v, _)| if lo_excl { v <= lo } else { v < lo });
        let end = self
            .entries
            .partition_point(|&(v, _)| if hi_excl { v < hi } else { v <= hi });
        if start >= end {
            return Vec::new();
        }

        let mut out: Vec<DocId> = self.entries[start..end].iter().map(|&(_, d)| d).collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Document, FieldValue};

    fn doc(price: f64) -> Document {
        Document::new().with_field("price", FieldValue::Number(price))
    }

    fn index_of(prices: &[(DocId, f64)]) -> NumericIndex {
        let mut index = NumericIndex::new();
        for &(id, price) in prices {
            index.add(id, &doc(price), "price");
        }
        index
    }

    #[test]
    fn inclusive_and_exclusive_bounds() {
        let index = index_of(&[(1, 100.0), (2, 250.0), (3, 900.0), (4, 1200.0)]);
        assert_eq!(index.range(200.0, false, 1000.0, false), [2, 3]);
        assert_eq!(index.range(100.0, true, 900.0, false), [2, 3]);
        assert_eq!(index.range(100.0, false, 900.0, true), [1, 2]);
        assert_eq!(index.range(f64::NEG_INFINITY, false, f64::INFINITY, false), [1, 2, 3, 4]);
        assert!(index.range(901.0, false, 900.0, false).is_empty());
    }

    #[test]
    fn results_are_sorted_by_doc_id() {
        // Value order disagrees with id order on purpose.
        let index = index_of(&[(9, 10.0), (1, 30.0), (5, 20.0)]);
        assert_eq!(index.range(0.0, false, 100.0, false), [1, 5, 9]);
    }

    #[test]
    fn nan_add_changes_nothing() {
        let mut index = index_of(&[(1, 5.0)]);
        index.add(2, &doc(f64::NAN), "price");
        assert_eq!(index.range(f64::NEG_INFINITY, false, f64::INFINITY, false), [1]);
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut index = index_of(&[(1, 5.0)]);
        index.add(1, &doc(5.0), "price");
        assert_eq!(index.range(5.0, false, 5.0, false), [1]);
        index.remove(1, &doc(5.0), "price");
        index.remove(1, &doc(5.0), "price");
        assert!(index.range(5.0, false, 5.0, false).is_empty());
    }
}
