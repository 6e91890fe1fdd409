use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use item_logging::item_trace;
use thiserror::Error;

use crate::field::CoerceError;
use crate::shadow::is_shadow_name;
use crate::value::write_map;
use crate::{RecordSchema, Value};

/// Mapping-style access failures. Kept apart from [`FieldValidationError`]
/// so callers can treat "not present" as an expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("'{record}' object has no key '{key}'")]
    KeyNotFound { record: String, key: String },
    #[error("'{key}' cannot be used as a key on '{record}'")]
    InvalidKey { record: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldValidationError {
    #[error("'{record}.{field}': {source}")]
    Coerce {
        record: String,
        field: String,
        #[source]
        source: CoerceError,
    },
    #[error("'{record}.{field}' has no value yet")]
    Missing { record: String, field: String },
}

impl FieldValidationError {
    pub fn field(&self) -> &str {
        match self {
            FieldValidationError::Coerce { field, .. }
            | FieldValidationError::Missing { field, .. } => field,
        }
    }
}

/// One instance of a record type: an ordered key/value mapping checked
/// against its schema on [`Record::validate`].
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: IndexMap<String, Value>,
}

impl Record {
    /// Creates a record with every declared default applied.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let mut record = Self {
            schema,
            values: IndexMap::new(),
        };
        record.apply_defaults();
        record
    }

    /// Creates a record from caller-supplied pairs, then applies defaults
    /// for declared fields the caller left out.
    pub fn with_values<I, K, V>(
        schema: Arc<RecordSchema>,
        values: I,
    ) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self {
            schema,
            values: IndexMap::new(),
        };
        for (key, value) in values {
            record.set(key, value)?;
        }
        record.apply_defaults();
        Ok(record)
    }

    fn apply_defaults(&mut self) {
        for (name, field) in self.schema.fields() {
            if let Some(default) = field.default_value() {
                if !self.values.contains_key(name) {
                    self.values.insert(name.to_string(), default.clone());
                }
            }
        }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    pub fn get(&self, key: &str) -> Result<&Value, RecordError> {
        self.values.get(key).ok_or_else(|| self.key_not_found(key))
    }

    /// Sets `key`, returning the previous value if there was one.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, RecordError> {
        let key = key.into();
        if key.is_empty() || is_shadow_name(&key) {
            return Err(RecordError::InvalidKey {
                record: self.type_name().to_string(),
                key,
            });
        }
        Ok(self.values.insert(key, value.into()))
    }

    pub fn remove(&mut self, key: &str) -> Result<Value, RecordError> {
        match self.values.shift_remove(key) {
            Some(value) => Ok(value),
            None => Err(self.key_not_found(key)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> IndexMap<String, Value> {
        self.values
    }

    /// Coerces every declared field present on the record to its kind, in
    /// declaration order, and checks required fields are present.
    ///
    /// Keys without a declaration are left untouched. On error the record
    /// keeps the values coerced before the failing field.
    pub fn validate(&mut self) -> Result<(), FieldValidationError> {
        let schema = Arc::clone(&self.schema);
        for (name, field) in schema.fields() {
            match self.values.get_mut(name) {
                Some(value) => {
                    *value = field
                        .validate(value)
                        .map_err(|source| FieldValidationError::Coerce {
                            record: schema.name().to_string(),
                            field: name.to_string(),
                            source,
                        })?;
                }
                None if field.is_nullable() => {
                    item_trace!("{}.{} absent, nullable", schema.name(), name);
                }
                None => {
                    return Err(FieldValidationError::Missing {
                        record: schema.name().to_string(),
                        field: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn key_not_found(&self, key: &str) -> RecordError {
        RecordError::KeyNotFound {
            record: self.type_name().to_string(),
            key: key.to_string(),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.type_name())?;
        write_map(f, &self.values)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
