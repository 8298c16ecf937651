//! Loop Latch Implementation
//!
//! A loop latch renders a list of value maps into its root by cloning a
//! [`PlainLatch`] template once per item.
//!
//! # Strategies
//!
//! - [`ListStrategy::Rebuild`] (default): every render clears the root and
//!   appends fresh clones. Nothing is reused or memoized between renders,
//!   so unchanged items are rebuilt too. Callers rely on getting fresh
//!   elements each time, which is why this stays the default.
//!
//! - [`ListStrategy::Keyed`]: items are matched across renders by an
//!   identity field. Known items are updated in place through their own
//!   latch, new ones are cloned, vanished ones are dropped, and the
//!   surviving elements are moved into list order. A reused item shows
//!   the same content a fresh clone would: bits the new item leaves out
//!   or sets to `""` go back to the template's content.
//!
//! The template's own element is never inserted into the root.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::plain::PlainLatch;
use super::value_map::{list_from_json, Values};
use super::{Latch, LatchKind};
use crate::config::MarkupConfig;
use crate::dom::Node;
use crate::error::{LatchError, Result};

/// Where a loop latch gets its template from.
#[derive(Debug)]
pub enum Template {
    /// Raw markup, bound with no initial values.
    Element(Node),

    /// An already bound plain latch.
    Plain(PlainLatch),
}

impl From<Node> for Template {
    fn from(node: Node) -> Self {
        Template::Element(node)
    }
}

impl From<PlainLatch> for Template {
    fn from(latch: PlainLatch) -> Self {
        Template::Plain(latch)
    }
}

/// How a loop latch turns a new list into children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStrategy {
    /// Clear the root and clone every item again.
    #[default]
    Rebuild,

    /// Reuse items whose `identity` value was rendered before.
    Keyed { identity: String },
}

impl ListStrategy {
    pub fn keyed(identity: impl Into<String>) -> Self {
        ListStrategy::Keyed {
            identity: identity.into(),
        }
    }
}

/// A list of plain latch clones under one root.
///
/// # Example
///
/// ```rust
/// use latch_core::dom::Node;
/// use latch_core::{values, LoopLatch, Values};
///
/// let list = Node::element("ul");
/// let row = Node::element("li").with_child(
///     Node::element("span").with_class("bit").with_attr("data-key", "x"),
/// );
///
/// let mut latch = LoopLatch::new(list.clone(), row, &[])?;
/// latch.render(&[values([("x", "1")]), values([("x", "2")])])?;
/// assert_eq!(list.text_content(), "12");
/// # Ok::<(), latch_core::LatchError>(())
/// ```
#[derive(Debug)]
pub struct LoopLatch {
    root: Node,
    template: PlainLatch,
    strategy: ListStrategy,

    /// Latches currently rendered, in list order.
    items: Vec<PlainLatch>,

    /// Identity of each entry in `items`. Only filled by the keyed strategy.
    identities: Vec<String>,
}

impl LoopLatch {
    /// Bind `root` with the default markup names and the rebuild strategy.
    pub fn new(root: Node, template: impl Into<Template>, initial: &[Values]) -> Result<Self> {
        Self::with_strategy(root, template, initial, ListStrategy::Rebuild)
    }

    /// Bind `root` with the given strategy.
    pub fn with_strategy(
        root: Node,
        template: impl Into<Template>,
        initial: &[Values],
        strategy: ListStrategy,
    ) -> Result<Self> {
        Self::with_config(
            root,
            template,
            initial,
            strategy,
            Arc::new(MarkupConfig::default()),
        )
    }

    /// Bind `root` with the given strategy and markup names.
    ///
    /// `config` applies to raw element templates; a plain latch template
    /// keeps its own.
    pub fn with_config(
        root: Node,
        template: impl Into<Template>,
        initial: &[Values],
        strategy: ListStrategy,
        config: Arc<MarkupConfig>,
    ) -> Result<Self> {
        if !root.is_element() {
            return Err(LatchError::argument(
                "root",
                "expected an element, got a text node",
            ));
        }

        let template = match template.into() {
            Template::Plain(latch) => latch,
            Template::Element(node) if node.is_element() => {
                PlainLatch::with_config(node, &Values::new(), config)?
            }
            Template::Element(_) => {
                return Err(LatchError::argument(
                    "template",
                    "expected an element or a plain latch, got a text node",
                ));
            }
        };

        let mut latch = Self {
            root,
            template,
            strategy,
            items: Vec::new(),
            identities: Vec::new(),
        };
        latch.render(initial)?;
        Ok(latch)
    }

    /// Bind `root`, taking the initial list as a JSON array of objects.
    pub fn from_json(root: Node, template: impl Into<Template>, initial: &Value) -> Result<Self> {
        let initial = list_from_json(initial)?;
        Self::new(root, template, &initial)
    }

    /// Render `list` into the root, one template clone per item, in order.
    ///
    /// Fails only under the keyed strategy, when an item lacks its identity
    /// or repeats one. Failures leave the root untouched.
    pub fn render(&mut self, list: &[Values]) -> Result<()> {
        match self.strategy.clone() {
            ListStrategy::Rebuild => self.rebuild(list),
            ListStrategy::Keyed { identity } => self.reconcile(list, &identity),
        }
    }

    /// Render from a JSON array of objects of strings.
    pub fn render_json(&mut self, list: &Value) -> Result<()> {
        let list = list_from_json(list)?;
        self.render(&list)
    }

    fn rebuild(&mut self, list: &[Values]) -> Result<()> {
        let items = list
            .iter()
            .map(|values| self.template.clone_with(values))
            .collect::<Result<Vec<_>>>()?;

        let removed = self.root.remove_children();
        for item in &items {
            self.root.append_child(item.root())?;
        }
        debug!(removed, appended = items.len(), "loop latch rebuilt");

        self.items = items;
        self.identities.clear();
        Ok(())
    }

    fn reconcile(&mut self, list: &[Values], identity: &str) -> Result<()> {
        let mut seen = HashSet::with_capacity(list.len());
        let mut ids = Vec::with_capacity(list.len());
        for values in list {
            let id = match values.get(identity) {
                Some(id) if !id.is_empty() => id.clone(),
                _ => {
                    return Err(LatchError::argument(
                        "list",
                        format!("item without a `{identity}` value"),
                    ));
                }
            };
            if !seen.insert(id.clone()) {
                return Err(LatchError::argument(
                    "list",
                    format!("`{identity}` value `{id}` appears more than once"),
                ));
            }
            ids.push(id);
        }

        // clone new items first so a failure leaves the current ones alone
        let mut fresh: HashMap<String, PlainLatch> = HashMap::new();
        {
            let known: HashSet<&str> = self.identities.iter().map(String::as_str).collect();
            for (id, values) in ids.iter().zip(list) {
                if !known.contains(id.as_str()) {
                    fresh.insert(id.clone(), self.template.clone_with(values)?);
                }
            }
        }

        let mut previous: HashMap<String, PlainLatch> = self
            .identities
            .drain(..)
            .zip(self.items.drain(..))
            .collect();

        let mut items = Vec::with_capacity(list.len());
        let mut reused = 0;
        for (id, values) in ids.iter().zip(list) {
            if let Some(mut item) = previous.remove(id) {
                item.render_over(&self.template, values);
                reused += 1;
                items.push(item);
            } else if let Some(item) = fresh.remove(id) {
                items.push(item);
            }
        }

        self.root.remove_children();
        for item in &items {
            self.root.append_child(item.root())?;
        }
        debug!(
            reused,
            created = items.len() - reused,
            dropped = previous.len(),
            "loop latch reconciled"
        );

        self.items = items;
        self.identities = ids;
        Ok(())
    }

    /// The template every item is cloned from.
    pub fn template(&self) -> &PlainLatch {
        &self.template
    }

    pub fn strategy(&self) -> &ListStrategy {
        &self.strategy
    }

    /// Latches rendered by the last call, in list order.
    pub fn items(&self) -> &[PlainLatch] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Latch for LoopLatch {
    fn kind(&self) -> LatchKind {
        LatchKind::Loop
    }

    fn root(&self) -> &Node {
        &self.root
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
