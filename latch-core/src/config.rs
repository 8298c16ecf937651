//! Markup Configuration
//!
//! The class and attribute names that tie latches to their markup. The
//! defaults are the names existing templates are written against, so
//! changing them is only useful for hosts with their own conventions.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How a record latch treats bindings that share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Every binding carrying the key receives the value.
    #[default]
    Broadcast,

    /// A repeated key is rejected when the latch is built.
    Unique,
}

/// Names used to discover bindings in markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Class marking an element as a bindable leaf.
    pub bit_class: String,

    /// Attribute holding a leaf's key.
    pub key_attribute: String,

    /// Attribute naming a form field.
    pub field_attribute: String,

    /// Attribute naming a form action.
    pub action_attribute: String,

    pub key_policy: KeyPolicy,
}

impl MarkupConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Same names, different key policy.
    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            bit_class: "bit".to_string(),
            key_attribute: "data-key".to_string(),
            field_attribute: "data-field".to_string(),
            action_attribute: "data-action".to_string(),
            key_policy: KeyPolicy::Broadcast,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
