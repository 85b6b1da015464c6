use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Identifier of a document within one shard. Assigned by the external
/// indexer; this crate treats it as an ordered key.
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bytes(Vec<u8>),
}

/// Answers field lookups for one document while it is being indexed.
/// An absent identifier skips that field.
pub trait DocumentAccessor {
    fn field_string(&self, identifier: &str) -> Option<&str>;

    fn field_number(&self, identifier: &str) -> Option<f64>;

    /// Raw bytes, decodable as a packed little-endian f32 array.
    fn field_bytes(&self, identifier: &str) -> Option<&[u8]>;
}

/// Owned field map, the crate's reference accessor implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

impl DocumentAccessor for Document {
    fn field_string(&self, identifier: &str) -> Option<&str> {
        match self.fields.get(identifier) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn field_number(&self, identifier: &str) -> Option<f64> {
        match self.fields.get(identifier) {
            Some(FieldValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    fn field_bytes(&self, identifier: &str) -> Option<&[u8]> {
        match self.fields.get(identifier) {
            Some(FieldValue::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }
}
