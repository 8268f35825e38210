use std::fmt;

use serde::Serialize;

use crate::scope::Value;

/// The type a template requires of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// Interpolated with `{{ }}`.
    String,
    /// Used as an `if` condition.
    Boolean,
    /// Exempt from checking and never defaulted.
    Any,
}

impl Type {
    /// The value filled in for a variable the caller did not supply.
    pub fn default_value(self) -> Option<Value> {
        match self {
            Type::String => Some(Value::Str(String::new())),
            Type::Boolean => Some(Value::Str("false".to_string())),
            Type::Any => None,
        }
    }

    /// Whether `encoded` is an acceptable string encoding of this type.
    pub fn is_valid(self, encoded: &str) -> bool {
        match self {
            Type::String | Type::Any => true,
            Type::Boolean => matches!(encoded, "" | "true" | "false" | "1" | "0"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Any => "any",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
