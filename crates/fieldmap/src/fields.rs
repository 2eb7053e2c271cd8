//! Field access on mapped objects.
//!
//! Mapping rules read and write named fields without knowing the concrete
//! type on either side. Any type can take part in a mapping by implementing
//! [`FieldAccess`], either by hand, through the [`field_access!`](crate::field_access)
//! macro for plain structs, or by using the dynamic [`Record`] bag.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
pub use serde_json::Value;

use crate::error::{MapError, Result};

/// Named-field access on a mapped object.
///
/// `get_field` returns the current value of the named field; `set_field`
/// replaces it. Both fail with [`MapError::NoSuchField`] when the object
/// does not expose the field.
pub trait FieldAccess {
    /// Read the named field.
    fn get_field(&self, name: &str) -> Result<Value>;

    /// Write the named field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Truthiness of a field value: `null` and `false` are falsy, everything
/// else (including `0`, `""` and empty containers) is truthy.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// An insertion-ordered bag of named values.
///
/// Records accept any field name on write and answer reads for fields they
/// hold; reading an absent field is an error, like on a typed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for literal records in call sites and tests.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FieldAccess for Record {
    fn get_field(&self, name: &str) -> Result<Value> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| MapError::NoSuchField(name.to_string()))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.fields.insert(name.to_string(), value);
        Ok(())
    }
}

/// Serialize one field's current value. Support for [`field_access!`](crate::field_access).
pub fn to_value<T: Serialize>(field: &T) -> Result<Value> {
    serde_json::to_value(field).map_err(|e| MapError::Conversion(e.to_string()))
}

/// Deserialize a value into one field's type. Support for [`field_access!`](crate::field_access).
pub fn from_value<T: DeserializeOwned>(field: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| MapError::Conversion(format!("field '{field}': {e}")))
}

/// Implement [`FieldAccess`] for a struct over the listed fields.
///
/// Each listed field must serialize to and deserialize from a
/// `serde_json::Value`. Names outside the list fail with
/// [`MapError`](crate::MapError)`::NoSuchField`.
///
/// ```
/// use fieldmap::{field_access, FieldAccess};
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct User {
///     email: String,
///     active: bool,
/// }
///
/// field_access!(User { email, active });
///
/// let mut user = User::default();
/// user.set_field("email", json!("ada@example.com")).unwrap();
/// assert_eq!(user.get_field("email").unwrap(), json!("ada@example.com"));
/// assert!(user.get_field("password").is_err());
/// ```
#[macro_export]
macro_rules! field_access {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::fields::FieldAccess for $ty {
            fn get_field(&self, name: &str) -> $crate::error::Result<$crate::fields::Value> {
                match name {
                    $(stringify!($field) => $crate::fields::to_value(&self.$field),)*
                    _ => Err($crate::error::MapError::NoSuchField(name.to_string())),
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::fields::Value,
            ) -> $crate::error::Result<()> {
                match name {
                    $(stringify!($field) => {
                        self.$field = $crate::fields::from_value(stringify!($field), value)?;
                        Ok(())
                    })*
                    _ => Err($crate::error::MapError::NoSuchField(name.to_string())),
                }
            }
        }
    };
}
