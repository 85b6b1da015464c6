use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use crate::core::types::{DocId, DocumentAccessor};
use crate::index::text::TextIndex;
use crate::index::FieldIndex;
use crate::schema::schema::{FieldType, Schema};

/// Owns one index per schema field plus the ascending set of all live
/// document ids. Mutations are serialized by the caller; a query sees the
/// state left by every preceding add/remove on the same instance.
#[derive(Debug)]
pub struct FieldIndices {
    schema: Schema,
    indices: HashMap<String, FieldIndex>,
    all_ids: Vec<DocId>,
}

impl FieldIndices {
    pub fn new(schema: Schema) -> Self {
        let indices = schema
            .fields
            .iter()
            .map(|field| (field.alias.clone(), FieldIndex::for_type(field.field_type)))
            .collect();
        FieldIndices {
            schema,
            indices,
            all_ids: Vec::new(),
        }
    }

    /// Index `doc` under every schema field. The caller must not add the
    /// same document twice without removing it in between.
    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor) {
        for field in &self.schema.fields {
            if let Some(index) = self.indices.get_mut(&field.alias) {
                index.add(doc, access, &field.identifier);
            }
        }
        debug_assert!(self.all_ids.binary_search(&doc).is_err());
        let pos = self.all_ids.partition_point(|&id| id <= doc);
        self.all_ids.insert(pos, doc);
    }

    /// Unindex `doc`. Panics when the document was never added: removal of
    /// an unknown id means the caller's bookkeeping is broken.
    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor) {
        for field in &self.schema.fields {
            if let Some(index) = self.indices.get_mut(&field.alias) {
                index.remove(doc, access, &field.identifier);
            }
        }
        match self.all_ids.binary_search(&doc) {
            Ok(pos) => {
                self.all_ids.remove(pos);
            }
            Err(_) => panic!("removing doc {} that was never added", doc),
        }
    }

    pub fn get_index(&self, alias: &str) -> Option<&FieldIndex> {
        self.indices.get(alias)
    }

    /// All TEXT indices in schema order, for unscoped term queries.
    pub fn text_indices(&self) -> Vec<&TextIndex> {
        self.schema
            .fields
            .iter()
            .filter(|field| field.field_type == FieldType::Text)
            .filter_map(|field| self.indices.get(&field.alias).and_then(FieldIndex::as_text))
            .collect()
    }

    /// Every live document id, strictly ascending.
    pub fn all_docs(&self) -> &[DocId] {
        &self.all_ids
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn info(&self, index_name: &str) -> IndexInfo {
        IndexInfo {
            index_name: index_name.to_string(),
            fields: self
                .schema
                .fields
                .iter()
                .map(|field| FieldInfo {
                    identifier: field.identifier.clone(),
                    attribute: field.alias.clone(),
                    field_type: field.field_type,
                })
                .collect(),
            num_docs: self.all_ids.len(),
        }
    }
}

/// Introspection snapshot of one registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub index_name: String,
    pub fields: Vec<FieldInfo>,
    pub num_docs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInfo {
    pub identifier: String,
    pub attribute: String,
    pub field_type: FieldType,
}
