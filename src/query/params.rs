use std::collections::HashMap;

/// Placeholder bindings for `$name` references in query text. Values are
/// raw bytes: a UTF-8 term in text position, a packed float32 array in KNN
/// position.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, Vec<u8>>,
}

impl QueryParams {
    pub fn new() -> Self {
        QueryParams {
            params: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, bytes: Vec<u8>) {
        self.params.insert(name.to_string(), bytes);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.params.get(name).map(Vec::as_slice)
    }
}
