//! Bit Implementation
//!
//! A Bit is the smallest binding: one element and the last string written
//! into it.
//!
//! # How Bits Work
//!
//! 1. A bit starts with no remembered value.
//!
//! 2. Rendering a string that differs from the remembered one writes it to
//!    the element and remembers it.
//!
//! 3. Rendering the remembered string again is a no-op. The element is not
//!    touched, even if something else changed it in the meantime.
//!
//! Text controls (`input`, `textarea`) receive the string as their value;
//! every other element receives it as text content.

use serde_json::Value;
use tracing::trace;

use super::value_map::describe;
use crate::config::MarkupConfig;
use crate::dom::Node;
use crate::error::{LatchError, Result};

/// A memoized binding between a string and one element.
///
/// # Example
///
/// ```rust
/// use latch_core::dom::Node;
/// use latch_core::Bit;
///
/// let title = Node::element("h1").with_attr("data-key", "title");
/// let mut bit = Bit::new(title.clone());
/// assert_eq!(bit.key(), Some("title"));
///
/// assert!(bit.render("Hello"));
/// assert!(!bit.render("Hello"));
/// assert_eq!(title.text_content(), "Hello");
/// ```
#[derive(Debug)]
pub struct Bit {
    element: Node,

    /// Last value written, `None` until the first write.
    current: Option<String>,

    key: Option<String>,
}

impl Bit {
    /// Bind `element`, taking the key from its `data-key` attribute.
    pub fn new(element: Node) -> Self {
        Self::discover(element, &MarkupConfig::default())
    }

    /// Bind `element` under an explicit key.
    pub fn with_key(element: Node, key: impl Into<String>) -> Self {
        Self {
            element,
            current: None,
            key: Some(key.into()),
        }
    }

    /// Bind `element`, reading the key from the configured attribute.
    pub(crate) fn discover(element: Node, config: &MarkupConfig) -> Self {
        let key = element.attribute(&config.key_attribute);
        Self {
            element,
            current: None,
            key,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The remembered value.
    pub fn current_value(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn element(&self) -> &Node {
        &self.element
    }

    /// Write `value` unless it is already the remembered value.
    ///
    /// Returns whether the element was written.
    pub fn render(&mut self, value: &str) -> bool {
        if self.current.as_deref() == Some(value) {
            trace!(key = ?self.key, "bit unchanged");
            return false;
        }

        if self.element.is_text_control() {
            self.element.set_value(value);
        } else {
            self.element.set_text_content(value);
        }
        self.current = Some(value.to_string());

        trace!(key = ?self.key, value, "bit written");
        true
    }

    /// Show what `baseline` shows and forget the remembered value.
    ///
    /// Returns whether the element was written. A reset bit is in the same
    /// state as a bit freshly discovered on a copy of `baseline`.
    pub(crate) fn reset(&mut self, baseline: &Node) -> bool {
        self.current = None;

        let written = if self.element.is_text_control() {
            let value = baseline.value().unwrap_or_default();
            if self.element.value().as_deref() == Some(value.as_str()) {
                false
            } else {
                self.element.set_value(&value);
                true
            }
        } else {
            let text = baseline.text_content();
            if self.element.text_content() == text {
                false
            } else {
                self.element.set_text_content(&text);
                true
            }
        };

        trace!(key = ?self.key, written, "bit reset");
        written
    }

    /// Render a JSON value, which must be a string.
    pub fn render_json(&mut self, value: &Value) -> Result<bool> {
        match value {
            Value::String(text) => Ok(self.render(text)),
            other => Err(LatchError::argument(
                "value",
                format!("expected a string, got {}", describe(other)),
            )),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
