use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Tag,
    Text,
    Numeric,
    Vector,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Tag => "TAG",
            FieldType::Text => "TEXT",
            FieldType::Numeric => "NUMERIC",
            FieldType::Vector => "VECTOR",
        }
    }
}

/// One schema field: `alias` is the name used in queries, `identifier` the
/// path handed to the document accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub alias: String,
    pub identifier: String,
    pub field_type: FieldType,
    /// Declared vector dimension, when the definition carried `DIM <n>`.
    pub vector_dim: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    /// Add one field definition. `options` holds the trailing definition
    /// tokens: keyword pairs for TAG/TEXT (`SEPARATOR`, `WEIGHT`), the two
    /// positional arguments plus keyword pairs for VECTOR. Unknown keyword
    /// pairs are ignored so newer definitions keep loading.
    pub fn add_field(
        &mut self,
        alias: &str,
        identifier: &str,
        field_type: FieldType,
        options: &[&str],
    ) -> Result<()> {
        if self.field(alias).is_some() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("duplicate field alias: {}", alias),
            ));
        }

        let mut vector_dim = None;

        let pairs = match field_type {
            FieldType::Vector => {
                // The first two vector arguments are positional: the
                // algorithm name and the count of arguments that follow.
                if options.len() < 2 {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("vector field {} is missing algorithm arguments", alias),
                    ));
                }
                &options[2..]
            }
            _ => options,
        };

        for pair in pairs.chunks(2) {
            let (key, value) = match pair {
                [key, value] => (key.to_ascii_uppercase(), *value),
                _ => continue,
            };
            match (field_type, key.as_str()) {
                (FieldType::Vector, "TYPE") => {
                    if !value.eq_ignore_ascii_case("FLOAT32") {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("unsupported vector type: {}", value),
                        ));
                    }
                }
                (FieldType::Vector, "DIM") => {
                    let dim = value.parse::<usize>().map_err(|_| {
                        Error::new(
                            ErrorKind::InvalidInput,
                            format!("invalid vector dimension: {}", value),
                        )
                    })?;
                    vector_dim = Some(dim);
                }
                (FieldType::Vector, "DISTANCE_METRIC") => {
                    if !value.eq_ignore_ascii_case("L2") {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("unsupported distance metric: {}", value),
                        ));
                    }
                }
                (FieldType::Tag, "SEPARATOR") => {
                    if value != "," {
                        return Err(Error::new(
                            ErrorKind::InvalidInput,
                            format!("unsupported tag separator: {:?}", value),
                        ));
                    }
                }
                // WEIGHT and any forward-compatible keyword pair.
                _ => {}
            }
        }

        self.fields.push(FieldSchema {
            alias: alias.to_string(),
            identifier: identifier.to_string(),
            field_type,
            vector_dim,
        });
        Ok(())
    }

    pub fn field(&self, alias: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.alias == alias)
    }
}
