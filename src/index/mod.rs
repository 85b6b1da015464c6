pub mod numeric;
pub mod registry;
pub mod tag;
pub mod text;
pub mod vector;

use crate::core::types::{DocId, DocumentAccessor};
use crate::index::numeric::NumericIndex;
use crate::index::tag::TagIndex;
use crate::index::text::TextIndex;
use crate::index::vector::VectorIndex;
use crate::schema::schema::FieldType;

/// The index container for one schema field, dispatched by field type.
/// Type-specific lookups go through the `as_*` accessors.
#[derive(Debug)]
pub enum FieldIndex {
    Tag(TagIndex),
    Text(TextIndex),
    Numeric(NumericIndex),
    Vector(VectorIndex),
}

impl FieldIndex {
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Tag => FieldIndex::Tag(TagIndex::new()),
            FieldType::Text => FieldIndex::Text(TextIndex::new()),
            FieldType::Numeric => FieldIndex::Numeric(NumericIndex::new()),
            FieldType::Vector => FieldIndex::Vector(VectorIndex::new()),
        }
    }

    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        match self {
            FieldIndex::Tag(index) => index.add(doc, access, identifier),
            FieldIndex::Text(index) => index.add(doc, access, identifier),
            FieldIndex::Numeric(index) => index.add(doc, access, identifier),
            FieldIndex::Vector(index) => index.add(doc, access, identifier),
        }
    }

    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        match self {
            FieldIndex::Tag(index) => index.remove(doc, access, identifier),
            FieldIndex::Text(index) => index.remove(doc, access, identifier),
            FieldIndex::Numeric(index) => index.remove(doc, access, identifier),
            FieldIndex::Vector(index) => index.remove(doc, access, identifier),
        }
    }

    pub fn as_tag(&self) -> Option<&TagIndex> {
        match self {
            FieldIndex::Tag(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextIndex> {
        match self {
            FieldIndex::Text(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericIndex> {
        match self {
            FieldIndex::Numeric(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorIndex> {
        match self {
            FieldIndex::Vector(index) => Some(index),
            _ => None,
        }
    }
}
