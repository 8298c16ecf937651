//! Plain Latch Implementation
//!
//! A plain latch binds one markup fragment. Every descendant carrying the
//! bit class becomes a [`Bit`], in document order, exactly once.
//!
//! # Rendering
//!
//! Rendering is a partial update. A bit is rendered only when its key is
//! present in the value map with a non-empty value; every other bit keeps
//! what it shows. An empty string therefore cannot clear a bit through a
//! plain latch.
//!
//! # Cloning
//!
//! [`PlainLatch::clone_with`] deep-copies the root and discovers bits again
//! on the copy, so the copy remembers nothing the original wrote after the
//! markup was copied and never shares bits with it.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::bit::Bit;
use super::value_map::{values_from_json, Values};
use super::{Latch, LatchKind};
use crate::config::{KeyPolicy, MarkupConfig};
use crate::dom::Node;
use crate::error::{LatchError, Result};

/// A markup fragment with keyed, memoized bits.
///
/// # Example
///
/// ```rust
/// use latch_core::dom::Node;
/// use latch_core::{values, PlainLatch};
///
/// let root = Node::element("div")
///     .with_child(Node::element("span").with_class("bit").with_attr("data-key", "a"))
///     .with_child(Node::element("span").with_class("bit").with_attr("data-key", "b"));
///
/// let mut latch = PlainLatch::new(root.clone(), &values([("a", "1"), ("b", "2")]))?;
/// latch.render(&values([("a", "3")]));
/// assert_eq!(root.text_content(), "32");
/// # Ok::<(), latch_core::LatchError>(())
/// ```
#[derive(Debug)]
pub struct PlainLatch {
    root: Node,
    bits: Vec<Bit>,
    config: Arc<MarkupConfig>,
}

impl PlainLatch {
    /// Bind `root` with the default markup names and render `initial`.
    pub fn new(root: Node, initial: &Values) -> Result<Self> {
        Self::with_config(root, initial, Arc::new(MarkupConfig::default()))
    }

    /// Bind `root` with `config` and render `initial`.
    pub fn with_config(root: Node, initial: &Values, config: Arc<MarkupConfig>) -> Result<Self> {
        let mut latch = Self::bind(root, config)?;
        latch.render(initial);
        Ok(latch)
    }

    /// Bind `root`, taking the initial values as a JSON object of strings.
    pub fn from_json(root: Node, initial: &Value) -> Result<Self> {
        let initial = values_from_json(initial)?;
        Self::new(root, &initial)
    }

    fn bind(root: Node, config: Arc<MarkupConfig>) -> Result<Self> {
        if !root.is_element() {
            return Err(LatchError::argument(
                "root",
                "expected an element, got a text node",
            ));
        }

        let bits: Vec<Bit> = root
            .query_class(&config.bit_class)
            .into_iter()
            .map(|element| Bit::discover(element, &config))
            .collect();

        if config.key_policy == KeyPolicy::Unique {
            let mut seen = HashSet::new();
            for key in bits.iter().filter_map(Bit::key) {
                if !seen.insert(key) {
                    return Err(LatchError::DuplicateKey {
                        key: key.to_string(),
                    });
                }
            }
        }

        debug!(root = root.id().raw(), bits = bits.len(), "plain latch bound");
        Ok(Self { root, bits, config })
    }

    /// Render every bit whose key has a non-empty value in `values`.
    ///
    /// Bits are visited in document order; bits sharing a key all receive
    /// the value. Returns the number of elements actually written.
    pub fn render(&mut self, values: &Values) -> usize {
        let mut written = 0;
        for bit in &mut self.bits {
            let value = match bit.key().and_then(|key| values.get(key)) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };
            if bit.render(value) {
                written += 1;
            }
        }
        written
    }

    /// Render `values` over a copy of `template`, leaving it as
    /// [`PlainLatch::clone_with`] would have built it.
    ///
    /// Bits without a non-empty value go back to what the matching template
    /// bit shows instead of keeping an earlier render. Bits are paired in
    /// document order. Returns the number of elements written.
    pub(crate) fn render_over(&mut self, template: &PlainLatch, values: &Values) -> usize {
        let mut written = 0;
        for (bit, baseline) in self.bits.iter_mut().zip(&template.bits) {
            let changed = match bit.key().and_then(|key| values.get(key)) {
                Some(value) if !value.is_empty() => bit.render(value),
                _ => bit.reset(baseline.element()),
            };
            if changed {
                written += 1;
            }
        }
        written
    }

    /// Render from a JSON object of strings.
    pub fn render_json(&mut self, values: &Value) -> Result<usize> {
        let values = values_from_json(values)?;
        Ok(self.render(&values))
    }

    /// Copy the fragment, bind the copy and render `values` into it.
    ///
    /// The copy is detached; inserting it is up to the caller.
    pub fn clone_with(&self, values: &Values) -> Result<Self> {
        let mut copy = Self::bind(self.root.deep_clone(), Arc::clone(&self.config))?;
        copy.render(values);
        Ok(copy)
    }

    /// [`PlainLatch::clone_with`] taking a JSON object of strings.
    pub fn clone_json(&self, values: &Value) -> Result<Self> {
        let values = values_from_json(values)?;
        self.clone_with(&values)
    }

    /// Bits in document order.
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    /// Bits bound under `key`.
    pub fn bits_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Bit> + 'a {
        self.bits.iter().filter(move |bit| bit.key() == Some(key))
    }

    pub fn config(&self) -> &Arc<MarkupConfig> {
        &self.config
    }
}

impl Latch for PlainLatch {
    fn kind(&self) -> LatchKind {
        LatchKind::Plain
    }

    fn root(&self) -> &Node {
        &self.root
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
