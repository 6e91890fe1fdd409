//! Storage-key naming for declared fields.
//!
//! Every logical field name maps to a storage key made of a reserved prefix
//! followed by the name. Logical names may not start with the prefix, so no
//! logical name can ever alias another field's storage key.

use thiserror::Error;

/// Prefix reserved for storage keys.
pub const SHADOW_PREFIX: &str = "__field#";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShadowNameError {
    #[error("field name must not be empty")]
    Empty,
    #[error("field name {0:?} uses the reserved prefix {SHADOW_PREFIX:?}")]
    Reserved(String),
}

/// Derives the storage key for a logical field name.
pub fn shadow_name(name: &str) -> Result<String, ShadowNameError> {
    if name.is_empty() {
        return Err(ShadowNameError::Empty);
    }
    if name.starts_with(SHADOW_PREFIX) {
        return Err(ShadowNameError::Reserved(name.to_string()));
    }
    Ok(format!("{SHADOW_PREFIX}{name}"))
}

pub fn is_shadow_name(key: &str) -> bool {
    key.starts_with(SHADOW_PREFIX)
}

/// Recovers the logical name from a storage key, `None` if `key` is not one.
pub fn name_from_shadow(key: &str) -> Option<&str> {
    key.strip_prefix(SHADOW_PREFIX).filter(|name| !name.is_empty())
}
