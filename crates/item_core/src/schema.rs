use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::shadow::{shadow_name, ShadowNameError};
use crate::Field;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("'{record}' declares field '{field}' more than once")]
    DuplicateField { record: String, field: String },
    #[error("'{record}' cannot declare this field: {source}")]
    ReservedName {
        record: String,
        #[source]
        source: ShadowNameError,
    },
}

/// A named record type: its fields in declaration order.
///
/// Schemas are built once and shared behind an `Arc` by every record of the
/// type and by the extractors that produce them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: IndexMap<String, Field>,
}

impl RecordSchema {
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug)]
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<(String, Field)>,
}

impl RecordSchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn build(self) -> Result<Arc<RecordSchema>, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, field) in self.fields {
            shadow_name(&name).map_err(|source| SchemaError::ReservedName {
                record: self.name.clone(),
                source,
            })?;
            if fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField {
                    record: self.name,
                    field: name,
                });
            }
            fields.insert(name, field);
        }
        Ok(Arc::new(RecordSchema {
            name: self.name,
            fields,
        }))
    }
}
