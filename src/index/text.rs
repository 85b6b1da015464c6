use std::collections::HashMap;
use crate::analysis::tokenizer::tokenize;
use crate::compression::sorted_set::CompressedSortedSet;
use crate::core::types::{DocId, DocumentAccessor};

/// Token → compressed posting list for one TEXT field.
#[derive(Debug, Default)]
pub struct TextIndex {
    words: HashMap<String, CompressedSortedSet>,
}

impl TextIndex {
    pub fn new() -> Self {
        TextIndex {
            words: HashMap::new(),
        }
    }

    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(text) = access.field_string(identifier) {
            for token in tokenize(text) {
                self.words.entry(token).or_default().insert(doc);
            }
        }
    }

    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(text) = access.field_string(identifier) {
            for token in tokenize(text) {
                if let Some(list) = self.words.get_mut(&token) {
                    list.remove(doc);
                    if list.is_empty() {
                        self.words.remove(&token);
                    }
                }
            }
        }
    }

    /// Posting list for a lowercased term; `None` when the term is absent.
    pub fn matching(&self, word: &str) -> Option<&CompressedSortedSet> {
        self.words.get(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Document, FieldValue};

    fn doc(body: &str) -> Document {
        Document::new().with_field("body", FieldValue::Text(body.to_string()))
    }

    #[test]
    fn tokens_map_to_sorted_postings() {
        let mut index = TextIndex::new();
        index.add(2, &doc("Cheap red phone"), "body");
        index.add(1, &doc("red laptop"), "body");

        let red: Vec<DocId> = index.matching("red").unwrap().iter().collect();
        assert_eq!(red, [1, 2]);
        assert!(index.matching("Red").is_none());
        assert!(index.matching("tablet").is_none());
    }

    #[test]
    fn remove_is_symmetric_with_add() {
        let mut index = TextIndex::new();
        index.add(1, &doc("red phone"), "body");
        index.add(2, &doc("red tablet"), "body");
        index.remove(1, &doc("red phone"), "body");

        let red: Vec<DocId> = index.matching("red").unwrap().iter().collect();
        assert_eq!(red, [2]);
        assert!(index.matching("phone").is_none());
    }
}
