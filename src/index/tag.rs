use std::collections::HashMap;
use crate::compression::sorted_set::CompressedSortedSet;
use crate::core::types::{DocId, DocumentAccessor};

/// Index over comma-separated tag fields. Tags are trimmed and lowercased;
/// each maps to a compressed posting list.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: HashMap<String, CompressedSortedSet>,
}

fn split_tags(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
}

impl TagIndex {
    pub fn new() -> Self {
        TagIndex {
            tags: HashMap::new(),
        }
    }

    pub fn add(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(value) = access.field_string(identifier) {
            for tag in split_tags(value) {
                self.tags.entry(tag).or_default().insert(doc);
            }
        }
    }

    pub fn remove(&mut self, doc: DocId, access: &dyn DocumentAccessor, identifier: &str) {
        if let Some(value) = access.field_string(identifier) {
            for tag in split_tags(value) {
                if let Some(list) = self.tags.get_mut(&tag) {
                    list.remove(doc);
                    if list.is_empty() {
                        self.tags.remove(&tag);
                    }
                }
            }
        }
    }

    pub fn matching(&self, tag: &str) -> Option<&CompressedSortedSet> {
        self.tags.get(tag.trim().to_lowercase().as_str())
    }
}
