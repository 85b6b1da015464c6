//! In-memory secondary-index search core for one shard of a data store.
//!
//! Query text is tokenized and parsed into an immutable AST
//! (`query`), which the evaluator (`search`) walks against a schema-defined
//! registry of per-field indices (`index`): tag and text indices answer with
//! borrowed compressed posting lists (`compression`), numeric and vector
//! indices with owned id vectors. Intermediate sets merge smallest-first;
//! the result is a list of document ids plus, for KNN queries, a parallel
//! list of L2 distances.
//!
//! The core is single-threaded by contract: the surrounding system
//! serializes mutations and evaluations per registry instance and fans
//! queries out across shards itself.

pub mod analysis;
pub mod compression;
pub mod core;
pub mod index;
pub mod query;
pub mod schema;
pub mod search;
