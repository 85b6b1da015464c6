use log::warn;
use std::collections::HashMap;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, DocumentAccessor};

/// Decode a packed little-endian f32 array, the wire format for vector
/// parameters and stored vector fields.
pub fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::new(
            ErrorKind::Parse,
            format!("vector payload of {} bytes is not a float32 array", bytes.len()),
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Euclidean distance between two vectors of equal dimension.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Per-document vector storage. The dimension is fixed by the first added
/// vector; later adds with a different dimension are rejected.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: HashMap<DocId, Vec<f32>>,
    dim: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        VectorIndex {
            entries: HashMap::new(),
            dim: None,
        }
    }

    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        let bytes = match access.field_bytes(identifier) {
            Some(bytes) => bytes,
            None => return,
        };
        let vector = match decode_vector(bytes) {
            Ok(vector) => vector,
            Err(err) => {
                warn!("skipping vector for doc {} field {:?}: {}", doc, identifier, err);
                return;
            }
        };
        match self.dim {
            Some(dim) if dim != vector.len() => {
                warn!(
                    "skipping vector for doc {}: dimension {} does not match index dimension {}",
                    doc,
                    vector.len(),
                    dim
                );
                return;
            }
            Some(_) => {}
            None => self.dim = Some(vector.len()),
        }
        self.entries.entry(doc).or_insert(vector);
    }

    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if access.field_bytes(identifier).is_some() {
            self.entries.remove(&doc);
        }
    }

    pub fn get(&self, doc: DocId) -> Option<&[f32]> {
        self.entries.get(&doc).map(Vec::as_slice)
    }

    pub fn dim(&self) -> Option<usize> {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Document, FieldValue};

    fn vector_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn doc(values: &[f32]) -> Document {
        Document::new().with_field("vec", FieldValue::Bytes(vector_bytes(values)))
    }

    #[test]
    fn decode_round_trip_and_rejection() {
        let decoded = decode_vector(&vector_bytes(&[0.5, -1.0])).unwrap();
        assert_eq!(decoded, [0.5, -1.0]);
        assert!(decode_vector(&[1, 2, 3]).is_err());
        assert_eq!(decode_vector(&[]).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn first_add_fixes_the_dimension() {
        let mut index = VectorIndex::new();
        index.add(1, &doc(&[0.0, 1.0]), "vec");
        assert_eq!(index.dim(), Some(2));
        index.add(2, &doc(&[1.0, 2.0, 3.0]), "vec");
        assert!(index.get(2).is_none());
        index.add(3, &doc(&[1.0, 0.0]), "vec");
        assert_eq!(index.get(3), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn l2_distance_is_euclidean() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn remove_requires_the_field_to_be_present() {
        let mut index = VectorIndex::new();
        index.add(1, &doc(&[0.0]), "vec");
        index.remove(1, &Document::new(), "vec");
        assert!(index.get(1).is_some());
        index.remove(1, &doc(&[0.0]), "vec");
        assert!(index.get(1).is_none());
    }
}
