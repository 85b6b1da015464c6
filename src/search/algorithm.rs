use log::info;
use crate::index::registry::FieldIndices;
use crate::query::ast::AstNode;
use crate::query::params::QueryParams;
use crate::query::parser;
use crate::search::evaluator::Evaluator;
use crate::search::results::SearchResult;

/// Search façade: parse a query once, evaluate it against any number of
/// registries.
#[derive(Debug, Default)]
pub struct SearchAlgorithm {
    query: Option<AstNode>,
}

impl SearchAlgorithm {
    pub fn new() -> Self {
        SearchAlgorithm { query: None }
    }

    /// Parse `query` with the given parameter bindings. Returns false when
    /// the query is malformed or trivially empty; the reason is logged and
    /// no partial state is kept.
    pub fn init(&mut self, query: &str, params: &QueryParams) -> bool {
        self.query = None;
        match parser::parse(query, params) {
            Ok(AstNode::Empty) => false,
            Ok(ast) => {
                self.query = Some(ast);
                true
            }
            Err(err) => {
                info!("failed to parse query {:?}: {}", query, err);
                false
            }
        }
    }

    /// Evaluate the parsed query. Without a successful `init` this returns
    /// the empty result.
    pub fn search(&self, indices: &FieldIndices) -> SearchResult {
        match &self.query {
            Some(ast) => Evaluator::new(indices).search(ast),
            None => SearchResult::default(),
        }
    }

    /// The KNN limit when the top-level node is a KNN, used by the caller
    /// to merge per-shard results by distance.
    pub fn has_knn(&self) -> Option<usize> {
        match &self.query {
            Some(AstNode::Knn { limit, .. }) => Some(*limit),
            _ => None,
        }
    }
}
