//! Item core: typed record schemas and the records built from them.
mod field;
mod record;
mod schema;
pub mod shadow;
mod value;

pub use field::{CoerceError, Field, ScalarKind};
pub use record::{FieldValidationError, Record, RecordError};
pub use schema::{RecordSchema, RecordSchemaBuilder, SchemaError};
pub use shadow::ShadowNameError;
pub use value::Value;
