use log::warn;
use std::mem;
use crate::compression::sorted_set;
use crate::compression::sorted_set::CompressedSortedSet;
use crate::core::types::DocId;
use crate::index::registry::FieldIndices;
use crate::index::vector::l2_distance;
use crate::index::FieldIndex;
use crate::query::ast::{AstNode, LogicOp};
use crate::search::results::SearchResult;

/// Intermediate result set: owned by a merge, or borrowed from an index's
/// posting list (`Css`) or from the registry's live-id sequence (`Ids`).
/// All three iterate ascending without duplicates.
enum IndexResult<'a> {
    Owned(Vec<DocId>),
    Css(&'a CompressedSortedSet),
    Ids(&'a [DocId]),
}

impl<'a> IndexResult<'a> {
    fn empty() -> Self {
        IndexResult::Owned(Vec::new())
    }

    fn from_list(list: Option<&'a CompressedSortedSet>) -> Self {
        match list {
            Some(css) => IndexResult::Css(css),
            None => IndexResult::empty(),
        }
    }

    fn len(&self) -> usize {
        match self {
            IndexResult::Owned(ids) => ids.len(),
            IndexResult::Css(css) => css.len(),
            IndexResult::Ids(ids) => ids.len(),
        }
    }

    fn iter(&self) -> PostingIter<'_> {
        match self {
            IndexResult::Owned(ids) => PostingIter::Slice(ids.iter()),
            IndexResult::Css(css) => PostingIter::Css(css.iter()),
            IndexResult::Ids(ids) => PostingIter::Slice(ids.iter()),
        }
    }

    /// Move out of owned, copy out of borrowed.
    fn take(self) -> Vec<DocId> {
        match self {
            IndexResult::Owned(ids) => ids,
            IndexResult::Css(css) => css.iter().collect(),
            IndexResult::Ids(ids) => ids.to_vec(),
        }
    }
}

enum PostingIter<'a> {
    Slice(std::slice::Iter<'a, DocId>),
    Css(sorted_set::Iter<'a>),
}

impl<'a> Iterator for PostingIter<'a> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        match self {
            PostingIter::Slice(iter) => iter.next().copied(),
            PostingIter::Css(iter) => iter.next(),
        }
    }
}

#[cfg(debug_assertions)]
fn is_strictly_ascending(result: &IndexResult) -> bool {
    let mut prev: Option<DocId> = None;
    for doc in result.iter() {
        if let Some(p) = prev {
            if p >= doc {
                return false;
            }
        }
        prev = Some(doc);
    }
    true
}

/// Recursively evaluates an AST against one registry. Scratch state lives
/// for a single `search` call: one merge buffer reused across merges and
/// one KNN distance buffer.
pub struct Evaluator<'a> {
    indices: &'a FieldIndices,
    scratch: Vec<DocId>,
    distances: Vec<(f32, DocId)>,
}

impl<'a> Evaluator<'a> {
    pub fn new(indices: &'a FieldIndices) -> Self {
        Evaluator {
            indices,
            scratch: Vec::new(),
            distances: Vec::new(),
        }
    }

    pub fn search(mut self, query: &AstNode) -> SearchResult {
        let result = self.eval(query, "", true);
        let doc_ids = result.take();

        if self.distances.is_empty() {
            return SearchResult {
                doc_ids,
                knn_distances: Vec::new(),
            };
        }

        // A KNN result is a prefix of the sorted distance buffer, in the
        // same order.
        let knn_distances = self.distances[..doc_ids.len()]
            .iter()
            .map(|&(dist, _)| dist)
            .collect();
        SearchResult {
            doc_ids,
            knn_distances,
        }
    }

    fn eval(&mut self, node: &AstNode, active_field: &str, top_level: bool) -> IndexResult<'a> {
        let result = match node {
            AstNode::Empty => IndexResult::empty(),
            AstNode::Star => {
                debug_assert!(active_field.is_empty());
                IndexResult::Ids(self.indices.all_docs())
            }
            AstNode::Term { word } => self.eval_term(word, active_field),
            AstNode::Range {
                lo,
                hi,
                lo_excl,
                hi_excl,
            } => self.eval_range(*lo, *lo_excl, *hi, *hi_excl, active_field),
            AstNode::Negate { node } => self.eval_negate(node, active_field),
            AstNode::Logical { op, nodes } => self.eval_logical(*op, nodes, active_field),
            AstNode::Field { field, node } => {
                debug_assert!(active_field.is_empty());
                self.eval(node, field, false)
            }
            AstNode::Tags { tags } => self.eval_tags(tags, active_field),
            AstNode::Knn {
                limit,
                field,
                vector,
                filter,
            } => self.eval_knn(*limit, field, vector, filter, active_field),
        };

        // Only the top level may be unordered (KNN distance order); every
        // intermediate result must be strictly ascending.
        #[cfg(debug_assertions)]
        debug_assert!(top_level || is_strictly_ascending(&result));
        #[cfg(not(debug_assertions))]
        let _ = top_level;

        result
    }

    fn field_index(&self, field: &str) -> Option<&'a FieldIndex> {
        let index = self.indices.get_index(field);
        if index.is_none() {
            warn!("query references unknown field {:?}", field);
        }
        index
    }

    // Term under a field scope hits that field's text index; unscoped terms
    // unify matches across every text index.
    fn eval_term(&mut self, word: &str, active_field: &str) -> IndexResult<'a> {
        if !active_field.is_empty() {
            return match self.field_index(active_field).and_then(FieldIndex::as_text) {
                Some(index) => IndexResult::from_list(index.matching(word)),
                None => IndexResult::empty(),
            };
        }

        let sub_results = self
            .indices
            .text_indices()
            .into_iter()
            .map(|index| IndexResult::from_list(index.matching(word)))
            .collect();
        self.unify(sub_results, LogicOp::Or)
    }

    fn eval_range(
        &mut self,
        lo: f64,
        lo_excl: bool,
        hi: f64,
        hi_excl: bool,
        active_field: &str,
    ) -> IndexResult<'a> {
        debug_assert!(!active_field.is_empty());
        match self
            .field_index(active_field)
            .and_then(FieldIndex::as_numeric)
        {
            Some(index) => IndexResult::Owned(index.range(lo, lo_excl, hi, hi_excl)),
            None => IndexResult::empty(),
        }
    }

    // Complement against all live documents; both sequences are sorted, so
    // one linear sweep suffices.
    fn eval_negate(&mut self, node: &AstNode, active_field: &str) -> IndexResult<'a> {
        let matched = self.eval(node, active_field, false).take();
        let all = self.indices.all_docs();

        let mut out = Vec::with_capacity(all.len().saturating_sub(matched.len()));
        let mut m = 0;
        for &doc in all {
            while m < matched.len() && matched[m] < doc {
                m += 1;
            }
            if m < matched.len() && matched[m] == doc {
                m += 1;
                continue;
            }
            out.push(doc);
        }
        IndexResult::Owned(out)
    }

    fn eval_logical(
        &mut self,
        op: LogicOp,
        nodes: &[AstNode],
        active_field: &str,
    ) -> IndexResult<'a> {
        let sub_results = nodes
            .iter()
            .map(|node| self.eval(node, active_field, false))
            .collect();
        self.unify(sub_results, op)
    }

    fn eval_tags(&mut self, tags: &[String], active_field: &str) -> IndexResult<'a> {
        debug_assert!(!active_field.is_empty());
        let index = match self.field_index(active_field).and_then(FieldIndex::as_tag) {
            Some(index) => index,
            None => return IndexResult::empty(),
        };
        let sub_results = tags
            .iter()
            .map(|tag| IndexResult::from_list(index.matching(tag)))
            .collect();
        self.unify(sub_results, LogicOp::Or)
    }

    // Evaluate the filter, rank every surviving document by distance to the
    // query vector, keep the closest `limit`. Ties break on ascending DocId.
    fn eval_knn(
        &mut self,
        limit: usize,
        field: &str,
        vector: &[f32],
        filter: &AstNode,
        active_field: &str,
    ) -> IndexResult<'a> {
        debug_assert!(active_field.is_empty());
        let sub_result = self.eval(filter, active_field, false);

        let index = match self.field_index(field).and_then(FieldIndex::as_vector) {
            Some(index) => index,
            None => return IndexResult::empty(),
        };

        self.distances.clear();
        self.distances.reserve(sub_result.len());
        for doc in sub_result.iter() {
            // Documents without a stored vector sort last instead of
            // shrinking the result below min(limit, filter size).
            let dist = match index.get(doc) {
                Some(stored) => l2_distance(vector, stored),
                None => f32::INFINITY,
            };
            self.distances.push((dist, doc));
        }
        self.distances
            .sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let out = self
            .distances
            .iter()
            .take(limit)
            .map(|&(_, doc)| doc)
            .collect();
        IndexResult::Owned(out)
    }

    /// Reduce sub results under one operator, merging smallest-first: AND
    /// only ever shrinks, and OR inserts fewer elements on average.
    fn unify(&mut self, mut sub_results: Vec<IndexResult<'a>>, op: LogicOp) -> IndexResult<'a> {
        if sub_results.is_empty() {
            return IndexResult::empty();
        }
        sub_results.sort_by_key(IndexResult::len);

        let mut out = sub_results.remove(0);
        for matched in sub_results {
            self.merge(matched, &mut out, op);
        }
        out
    }

    fn merge(&mut self, matched: IndexResult<'a>, current: &mut IndexResult<'a>, op: LogicOp) {
        self.scratch.clear();

        let mut a = matched.iter();
        let mut b = current.iter();
        let mut x = a.next();
        let mut y = b.next();

        match op {
            LogicOp::And => {
                self.scratch.reserve(matched.len().min(current.len()));
                while let (Some(va), Some(vb)) = (x, y) {
                    if va == vb {
                        self.scratch.push(va);
                        x = a.next();
                        y = b.next();
                    } else if va < vb {
                        x = a.next();
                    } else {
                        y = b.next();
                    }
                }
            }
            LogicOp::Or => {
                self.scratch.reserve(matched.len() + current.len());
                loop {
                    match (x, y) {
                        (Some(va), Some(vb)) => {
                            if va == vb {
                                self.scratch.push(va);
                                x = a.next();
                                y = b.next();
                            } else if va < vb {
                                self.scratch.push(va);
                                x = a.next();
                            } else {
                                self.scratch.push(vb);
                                y = b.next();
                            }
                        }
                        (Some(va), None) => {
                            self.scratch.push(va);
                            x = a.next();
                        }
                        (None, Some(vb)) => {
                            self.scratch.push(vb);
                            y = b.next();
                        }
                        (None, None) => break,
                    }
                }
            }
        }

        // Swap the merged output in, keeping the previous owned backing
        // array as the next scratch buffer.
        if let IndexResult::Owned(ids) = current {
            mem::swap(ids, &mut self.scratch);
        } else {
            *current = IndexResult::Owned(mem::take(&mut self.scratch));
        }
    }
}
