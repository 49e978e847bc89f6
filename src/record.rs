//! Caller-supplied form data, validated against the field registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::FieldRegistry;

/// A scalar value for one form field: free text or a boolean flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Empty means "nothing to transcribe". A `false` flag is not empty:
    /// an unchecked checkbox is still a deliberate value.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// String form of the value, as typed into text-like controls and
    /// matched against select/radio option values.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Boolean interpretation for checkbox-like controls. When the mapping
    /// carries a truthy token, a text value must match it exactly.
    pub fn as_flag(&self, truthy_value: Option<&str>) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => match truthy_value {
                Some(token) => s.eq_ignore_ascii_case(token),
                None => matches!(
                    s.to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "checked"
                ),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// One fill request's data: field name to value, keyed by the registry's
/// logical names. Unknown names are rejected at construction so a mistyped
/// field is an input error, not a silent runtime miss. Read-only during a
/// fill; any mapped field may simply be absent.
#[derive(Debug, Clone, Default)]
pub struct FormRecord {
    values: HashMap<String, FieldValue>,
}

impl FormRecord {
    pub fn new(registry: &FieldRegistry, values: HashMap<String, FieldValue>) -> Result<Self> {
        for name in values.keys() {
            if registry.by_name(name).is_none() {
                return Err(Error::UnknownField(name.clone()));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
