//! Form Latch Implementation
//!
//! A form latch sorts the bit-marked elements under its root into fields,
//! which are read as live values, and actions, which hooks listen on.
//!
//! # Classification
//!
//! - `data-field="name"` makes the element the field `name`.
//! - `data-action="name"` makes the element the action `name`.
//! - An element with both attributes is a field. The action attribute is
//!   ignored and a warning is logged.
//! - An element with neither is ignored.
//! - When two elements claim the same name, the later one in document order
//!   takes the slot.
//!
//! # Hooks
//!
//! Every hook must name an existing action. All hooks are checked before
//! any listener is attached, so a bad hook leaves the markup untouched.
//!
//! Listeners reach the fields through weak handles. An action nested inside
//! a field therefore does not keep that field alive, and a field dropped
//! from the tree is left out of the map a hook receives.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::value_map::Values;
use super::{Latch, LatchKind};
use crate::config::MarkupConfig;
use crate::dom::{Event, ListenerId, Node, WeakNode};
use crate::error::{LatchError, Result};

/// Field name to element.
pub type Fields = IndexMap<String, Node>;

/// Action name to element.
pub type Actions = IndexMap<String, Node>;

/// Callback run by a hook with every field and the triggering event.
pub type HookFn = Arc<dyn Fn(&Fields, &Event) + Send + Sync>;

/// Binds a callback to an event on a named action.
#[derive(Clone)]
pub struct Hook {
    action: String,
    event: String,
    callback: HookFn,
}

impl Hook {
    pub fn new<F>(action: impl Into<String>, event: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Fields, &Event) + Send + Sync + 'static,
    {
        Self {
            action: action.into(),
            event: event.into(),
            callback: Arc::new(callback),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("action", &self.action)
            .field("event", &self.event)
            .finish()
    }
}

/// Live form fields and hooked actions under one root.
///
/// # Example
///
/// ```rust
/// use latch_core::dom::Node;
/// use latch_core::{FormLatch, Hook};
///
/// let root = Node::element("form")
///     .with_child(
///         Node::element("input")
///             .with_class("bit")
///             .with_attr("data-field", "name")
///             .with_attr("value", "Ada"),
///     )
///     .with_child(Node::element("button").with_class("bit").with_attr("data-action", "save"));
///
/// let form = FormLatch::new(
///     root,
///     [Hook::new("save", "click", |fields, _event| {
///         assert!(fields.contains_key("name"));
///     })],
/// )?;
///
/// assert_eq!(form.data()["name"], "Ada");
/// assert_eq!(form.trigger("save", "click")?, 1);
/// # Ok::<(), latch_core::LatchError>(())
/// ```
pub struct FormLatch {
    root: Node,
    fields: Fields,
    actions: Actions,

    /// Listeners attached for hooks, so they can be removed again.
    wired: Vec<(Node, ListenerId)>,
}

impl FormLatch {
    /// Classify `root` with the default markup names and wire `hooks`.
    pub fn new(root: Node, hooks: impl IntoIterator<Item = Hook>) -> Result<Self> {
        Self::with_config(root, hooks, &MarkupConfig::default())
    }

    /// Classify `root` with `config` and wire `hooks`.
    pub fn with_config(
        root: Node,
        hooks: impl IntoIterator<Item = Hook>,
        config: &MarkupConfig,
    ) -> Result<Self> {
        if !root.is_element() {
            return Err(LatchError::argument(
                "root",
                "expected an element, got a text node",
            ));
        }

        let (fields, actions) = classify(&root, config);
        let hooks: Vec<Hook> = hooks.into_iter().collect();

        if let Some(hook) = hooks
            .iter()
            .find(|hook| !actions.contains_key(&hook.action))
        {
            return Err(LatchError::UnknownAction {
                action: hook.action.clone(),
            });
        }

        let mut form = Self {
            root,
            fields,
            actions,
            wired: Vec::with_capacity(hooks.len()),
        };
        let weak_fields: Arc<[(String, WeakNode)]> = form
            .fields
            .iter()
            .map(|(name, element)| (name.clone(), element.downgrade()))
            .collect();
        for hook in hooks {
            if let Err(err) = form.wire(hook, Arc::clone(&weak_fields)) {
                form.unhook();
                return Err(err);
            }
        }

        debug!(
            fields = form.fields.len(),
            actions = form.actions.len(),
            hooks = form.wired.len(),
            "form latch bound"
        );
        Ok(form)
    }

    fn wire(&mut self, hook: Hook, fields: Arc<[(String, WeakNode)]>) -> Result<()> {
        let element = self
            .actions
            .get(&hook.action)
            .cloned()
            .ok_or_else(|| LatchError::UnknownAction {
                action: hook.action.clone(),
            })?;
        let callback = hook.callback;
        let id = element.add_event_listener(hook.event, move |event| {
            let live: Fields = fields
                .iter()
                .filter_map(|(name, weak)| Some((name.clone(), weak.upgrade()?)))
                .collect();
            callback(&live, event)
        });
        self.wired.push((element, id));
        Ok(())
    }

    /// Current value of every field, read now.
    ///
    /// Form controls report their value; other elements their text.
    pub fn data(&self) -> Values {
        self.fields
            .iter()
            .map(|(name, element)| {
                let value = element.value().unwrap_or_else(|| element.text_content());
                (name.clone(), value)
            })
            .collect()
    }

    /// [`FormLatch::data`] as a JSON object.
    pub fn data_json(&self) -> Value {
        let map: Map<String, Value> = self
            .data()
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        Value::Object(map)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields.get(name)
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Node> {
        self.actions.get(name)
    }

    /// Dispatch `event` on the action `action`.
    ///
    /// Returns how many listeners ran.
    pub fn trigger(&self, action: &str, event: &str) -> Result<usize> {
        let element = self
            .actions
            .get(action)
            .ok_or_else(|| LatchError::UnknownAction {
                action: action.to_string(),
            })?;
        Ok(element.dispatch_event(event))
    }

    /// Detach every hook listener. Returns how many were removed.
    pub fn unhook(&mut self) -> usize {
        self.wired
            .drain(..)
            .filter(|(element, id)| element.remove_event_listener(*id))
            .count()
    }
}

impl Latch for FormLatch {
    fn kind(&self) -> LatchKind {
        LatchKind::Form
    }

    fn root(&self) -> &Node {
        &self.root
    }
}

impl fmt::Debug for FormLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormLatch")
            .field("root", &self.root.id())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("hooks", &self.wired.len())
            .finish()
    }
}

fn classify(root: &Node, config: &MarkupConfig) -> (Fields, Actions) {
    let mut fields = Fields::new();
    let mut actions = Actions::new();

    for element in root.query_class(&config.bit_class) {
        let field = element.attribute(&config.field_attribute);
        let action = element.attribute(&config.action_attribute);

        match (field, action) {
            (Some(field), action) => {
                if let Some(action) = action {
                    warn!(%field, %action, "element marked as field and action; using field");
                }
                if fields.insert(field.clone(), element).is_some() {
                    warn!(%field, "duplicate field; later element wins");
                }
            }
            (None, Some(action)) => {
                if actions.insert(action.clone(), element).is_some() {
                    warn!(%action, "duplicate action; later element wins");
                }
            }
            (None, None) => {}
        }
    }

    (fields, actions)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
