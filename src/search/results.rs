use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

/// Outcome of evaluating one query against one shard's indices.
/// `knn_distances` is non-empty iff a KNN node was evaluated; it then runs
/// parallel to `doc_ids`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_ids: Vec<DocId>,
    pub knn_distances: Vec<f32>,
}
