//! Tree Nodes
//!
//! A [`Node`] is a shared handle to an element or text node. Cloning the
//! handle does not copy the node; use [`Node::deep_clone`] for that.
//!
//! # Ownership
//!
//! Parents own their children through strong handles. Children point back
//! at their parent through a weak reference, so dropping the last handle to
//! a detached subtree frees it.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::event::{Event, Listener, ListenerFn, ListenerId};
use crate::error::DomError;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lowercase tag name.
    Element { tag: String },

    /// A run of character data. Text nodes never have children.
    Text,
}

struct NodeData {
    id: NodeId,
    kind: NodeKind,
    attributes: IndexMap<String, String>,

    /// Character data of a text node.
    data: String,

    /// Value property of a form control once it has been written.
    /// Until then the value comes from markup.
    value: Option<String>,

    children: Vec<Node>,
    parent: Weak<RwLock<NodeData>>,
    listeners: SmallVec<[Listener; 2]>,

    /// Text and value writes applied to this node.
    writes: u64,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            attributes: IndexMap::new(),
            data: String::new(),
            value: None,
            children: Vec::new(),
            parent: Weak::new(),
            listeners: SmallVec::new(),
            writes: 0,
        }
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text => None,
        }
    }
}

/// Shared handle to a node in the host tree.
#[derive(Clone)]
pub struct Node {
    inner: Arc<RwLock<NodeData>>,
}

impl Node {
    fn from_data(data: NodeData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Create a detached element. The tag is stored lowercase.
    pub fn element(tag: impl Into<String>) -> Self {
        let tag = tag.into().to_ascii_lowercase();
        Self::from_data(NodeData::new(NodeKind::Element { tag }))
    }

    /// Create a detached text node.
    pub fn text(data: impl Into<String>) -> Self {
        let mut node = NodeData::new(NodeKind::Text);
        node.data = data.into();
        Self::from_data(node)
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    /// Set an attribute and return the node.
    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.write().attributes.insert(name.into(), value.into());
        self
    }

    /// Add a class and return the node.
    pub fn with_class(self, class: &str) -> Self {
        {
            let mut data = self.inner.write();
            let classes = data.attributes.entry("class".to_string()).or_default();
            if !classes.split_whitespace().any(|c| c == class) {
                if !classes.is_empty() {
                    classes.push(' ');
                }
                classes.push_str(class);
            }
        }
        self
    }

    /// Replace the node's content with `text` and return the node.
    ///
    /// Unlike [`Node::set_text_content`] this is not counted as a write.
    pub fn with_text(self, text: &str) -> Self {
        self.replace_text(text);
        self
    }

    /// Append `child` and return the node.
    ///
    /// Children offered to a text node are dropped with a warning.
    pub fn with_child(self, child: Node) -> Self {
        if let Err(err) = self.append_child(&child) {
            tracing::warn!(%err, "builder dropped child");
        }
        self
    }

    // ------------------------------------------------------------------
    // Identity and kind
    // ------------------------------------------------------------------

    pub fn id(&self) -> NodeId {
        self.inner.read().id
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.read().kind.clone()
    }

    /// The tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        self.inner.read().tag().map(str::to_string)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.inner.read().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.inner.read().kind, NodeKind::Text)
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A handle that does not keep the node alive.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.read().attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.read().attributes.contains_key(name)
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.write().attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.inner.write().attributes.shift_remove(name)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.inner
            .read()
            .attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Concatenated character data of this node and its descendants.
    pub fn text_content(&self) -> String {
        let data = self.inner.read();
        match data.kind {
            NodeKind::Text => data.data.clone(),
            NodeKind::Element { .. } => data
                .children
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }

    /// Replace the node's content with a single text node holding `text`.
    ///
    /// An empty string leaves the element without children.
    pub fn set_text_content(&self, text: &str) {
        self.replace_text(text);
        self.inner.write().writes += 1;
    }

    fn replace_text(&self, text: &str) {
        let removed = {
            let mut data = self.inner.write();
            if data.kind == NodeKind::Text {
                data.data = text.to_string();
                return;
            }
            mem::take(&mut data.children)
        };
        for child in &removed {
            child.inner.write().parent = Weak::new();
        }

        if !text.is_empty() {
            let child = Node::text(text);
            child.inner.write().parent = Arc::downgrade(&self.inner);
            self.inner.write().children.push(child);
        }
    }

    /// Whether the node is a single-line or multi-line text control.
    pub fn is_text_control(&self) -> bool {
        matches!(self.inner.read().tag(), Some("input" | "textarea"))
    }

    /// Whether the node carries a value property.
    pub fn is_value_control(&self) -> bool {
        matches!(self.inner.read().tag(), Some("input" | "textarea" | "select"))
    }

    /// Current value of a form control, `None` for other nodes.
    ///
    /// Before the first write an `input` reports its `value` attribute, a
    /// `textarea` its text, and a `select` its selected (or first) option.
    pub fn value(&self) -> Option<String> {
        let (tag, dirty, attribute) = {
            let data = self.inner.read();
            (
                data.tag().map(str::to_string),
                data.value.clone(),
                data.attributes.get("value").cloned(),
            )
        };

        match tag.as_deref() {
            Some("input") => Some(dirty.or(attribute).unwrap_or_default()),
            Some("textarea") => Some(dirty.unwrap_or_else(|| self.text_content())),
            Some("select") => Some(dirty.unwrap_or_else(|| self.selected_option())),
            _ => None,
        }
    }

    fn selected_option(&self) -> String {
        let options: Vec<Node> = self
            .descendants()
            .into_iter()
            .filter(|node| node.tag().as_deref() == Some("option"))
            .collect();

        options
            .iter()
            .find(|option| option.has_attribute("selected"))
            .or_else(|| options.first())
            .map(|option| {
                option
                    .attribute("value")
                    .unwrap_or_else(|| option.text_content())
            })
            .unwrap_or_default()
    }

    /// Write the value property.
    pub fn set_value(&self, value: &str) {
        let mut data = self.inner.write();
        data.value = Some(value.to_string());
        data.writes += 1;
    }

    /// Number of text and value writes applied to this node.
    pub fn write_count(&self) -> u64 {
        self.inner.read().writes
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .read()
            .parent
            .upgrade()
            .map(|inner| Node { inner })
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.read().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.read().children.len()
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_inclusive_ancestor_of(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Append `child` as the last child, moving it out of its old parent.
    pub fn append_child(&self, child: &Node) -> Result<(), DomError> {
        if self.is_text() {
            return Err(DomError::NotAContainer(self.id().raw()));
        }
        if child.is_inclusive_ancestor_of(self) {
            return Err(DomError::Hierarchy {
                parent: self.id().raw(),
                child: child.id().raw(),
            });
        }

        child.detach();
        child.inner.write().parent = Arc::downgrade(&self.inner);
        self.inner.write().children.push(child.clone());
        Ok(())
    }

    /// Remove the node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .inner
                .write()
                .children
                .retain(|sibling| !sibling.ptr_eq(self));
        }
        self.inner.write().parent = Weak::new();
    }

    /// Remove every child. Returns how many were removed.
    pub fn remove_children(&self) -> usize {
        let removed = mem::take(&mut self.inner.write().children);
        for child in &removed {
            child.inner.write().parent = Weak::new();
        }
        removed.len()
    }

    /// Copy the node and its subtree.
    ///
    /// The copy is detached, gets fresh IDs, keeps attributes, text and
    /// control values, and carries no listeners.
    pub fn deep_clone(&self) -> Node {
        let data = self.inner.read();

        let mut copy = NodeData::new(data.kind.clone());
        copy.attributes = data.attributes.clone();
        copy.data = data.data.clone();
        copy.value = data.value.clone();
        let copy = Node::from_data(copy);

        for child in &data.children {
            let child_copy = child.deep_clone();
            child_copy.inner.write().parent = Arc::downgrade(&copy.inner);
            copy.inner.write().children.push(child_copy);
        }
        copy
    }

    /// Every descendant, in document order. The node itself is excluded.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Node>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// Descendant elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<Node> {
        self.descendants()
            .into_iter()
            .filter(|node| node.has_class(class))
            .collect()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register `callback` for events named `event` on this node.
    pub fn add_event_listener<F>(&self, event: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let callback: ListenerFn = Arc::new(callback);
        let listener = Listener::new(event.into(), callback);
        let id = listener.id();
        self.inner.write().listeners.push(listener);
        id
    }

    /// Remove a listener. Returns whether it was registered here.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut data = self.inner.write();
        let before = data.listeners.len();
        data.listeners.retain(|listener| listener.id() != id);
        data.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.read().listeners.len()
    }

    /// Dispatch an event named `kind` at this node.
    ///
    /// Listeners run synchronously in registration order. Events do not
    /// bubble. Returns the number of listeners invoked.
    pub fn dispatch_event(&self, kind: &str) -> usize {
        let callbacks: Vec<ListenerFn> = self
            .inner
            .read()
            .listeners
            .iter()
            .filter(|listener| listener.handles(kind))
            .map(Listener::callback)
            .collect();

        let event = Event::new(kind, self.clone());
        for callback in &callbacks {
            callback(&event);
        }
        callbacks.len()
    }
}

/// Non-owning handle to a node, obtained from [`Node::downgrade`].
#[derive(Clone, Default)]
pub struct WeakNode {
    inner: Weak<RwLock<NodeData>>,
}

impl WeakNode {
    /// The node, if some strong handle still holds it.
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.inner.strong_count() > 0 {
            "WeakNode(live)"
        } else {
            "WeakNode(dropped)"
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.read();
        match &data.kind {
            NodeKind::Element { tag } => f
                .debug_struct("Element")
                .field("id", &data.id.raw())
                .field("tag", tag)
                .field("attributes", &data.attributes)
                .field("children", &data.children.len())
                .finish(),
            NodeKind::Text => f
                .debug_struct("Text")
                .field("id", &data.id.raw())
                .field("data", &data.data)
                .finish(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn weak_handles_do_not_keep_nodes_alive() {
        let parent = Node::element("div").with_child(Node::element("span"));
        let child = parent.children()[0].downgrade();
        assert!(child.upgrade().is_some());

        drop(parent);
        assert!(child.upgrade().is_none());
    }

    #[test]
    fn node_ids_are_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn tags_are_lowercase() {
        let node = Node::element("DIV");
        assert_eq!(node.tag().as_deref(), Some("div"));
        assert!(node.is_element());
        assert!(Node::text("x").is_text());
    }

    #[test]
    fn classes_are_whitespace_separated() {
        let node = Node::element("span").with_class("bit").with_class("title");
        assert!(node.has_class("bit"));
        assert!(node.has_class("title"));
        assert!(!node.has_class("bi"));
        assert_eq!(node.attribute("class").as_deref(), Some("bit title"));

        let again = node.with_class("bit");
        assert_eq!(again.attribute("class").as_deref(), Some("bit title"));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let node = Node::element("p")
            .with_child(Node::text("Hello, "))
            .with_child(Node::element("b").with_text("world"));
        assert_eq!(node.text_content(), "Hello, world");

        node.set_text_content("replaced");
        assert_eq!(node.text_content(), "replaced");
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.write_count(), 1);

        node.set_text_content("");
        assert_eq!(node.child_count(), 0);
    }

    #[test]
    fn control_values_start_from_markup() {
        let input = Node::element("input").with_attr("value", "foo");
        assert_eq!(input.value().as_deref(), Some("foo"));

        input.set_value("bar");
        assert_eq!(input.value().as_deref(), Some("bar"));
        assert_eq!(input.attribute("value").as_deref(), Some("foo"));

        let textarea = Node::element("textarea").with_text("notes");
        assert_eq!(textarea.value().as_deref(), Some("notes"));

        let select = Node::element("select")
            .with_child(Node::element("option").with_attr("value", "a"))
            .with_child(
                Node::element("option")
                    .with_attr("value", "b")
                    .with_attr("selected", ""),
            );
        assert_eq!(select.value().as_deref(), Some("b"));

        assert_eq!(Node::element("div").value(), None);
    }

    #[test]
    fn append_moves_between_parents() {
        let a = Node::element("div");
        let b = Node::element("div");
        let child = Node::element("span");

        a.append_child(&child).unwrap();
        assert_eq!(a.child_count(), 1);
        assert_eq!(child.parent(), Some(a.clone()));

        b.append_child(&child).unwrap();
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert_eq!(child.parent(), Some(b.clone()));
    }

    #[test]
    fn append_rejects_ancestors() {
        let outer = Node::element("div");
        let inner = Node::element("div");
        outer.append_child(&inner).unwrap();

        assert!(matches!(
            inner.append_child(&outer),
            Err(DomError::Hierarchy { .. })
        ));
        assert!(matches!(
            outer.append_child(&outer),
            Err(DomError::Hierarchy { .. })
        ));
        assert!(matches!(
            Node::text("t").append_child(&Node::element("b")),
            Err(DomError::NotAContainer(_))
        ));
    }

    #[test]
    fn remove_children_clears_parent_links() {
        let root = Node::element("ul")
            .with_child(Node::element("li"))
            .with_child(Node::element("li"));
        let first = root.children()[0].clone();

        assert_eq!(root.remove_children(), 2);
        assert_eq!(root.child_count(), 0);
        assert!(first.parent().is_none());
    }

    #[test]
    fn deep_clone_is_detached_and_independent() {
        let root = Node::element("div")
            .with_attr("id", "card")
            .with_child(Node::element("span").with_class("bit").with_text("a"));
        let holder = Node::element("section").with_child(root.clone());
        root.add_event_listener("click", |_| {});

        let copy = root.deep_clone();
        assert!(copy.parent().is_none());
        assert!(root.parent().is_some());
        assert_ne!(copy.id(), root.id());
        assert_eq!(copy.attribute("id").as_deref(), Some("card"));
        assert_eq!(copy.text_content(), "a");
        assert_eq!(copy.listener_count(), 0);

        copy.children()[0].set_text_content("b");
        assert_eq!(root.text_content(), "a");
        assert_eq!(holder.child_count(), 1);
    }

    #[test]
    fn query_class_walks_in_document_order() {
        let first = Node::element("span").with_class("bit").with_attr("data-key", "1");
        let nested = Node::element("em").with_class("bit").with_attr("data-key", "2");
        let last = Node::element("span").with_class("bit").with_attr("data-key", "3");
        let root = Node::element("div")
            .with_class("bit")
            .with_child(first)
            .with_child(Node::element("p").with_child(nested))
            .with_child(last);

        let keys: Vec<String> = root
            .query_class("bit")
            .iter()
            .filter_map(|node| node.attribute("data-key"))
            .collect();
        assert_eq!(keys, vec!["1", "2", "3"]);
    }

    #[test]
    fn dispatch_runs_matching_listeners() {
        let button = Node::element("button");
        let clicks = Arc::new(AtomicI32::new(0));

        let clicks_clone = clicks.clone();
        let id = button.add_event_listener("click", move |event| {
            assert_eq!(event.kind(), "click");
            clicks_clone.fetch_add(1, Ordering::SeqCst);
        });
        button.add_event_listener("focus", |_| {});

        assert_eq!(button.dispatch_event("click"), 1);
        assert_eq!(button.dispatch_event("blur"), 0);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        assert!(button.remove_event_listener(id));
        assert!(!button.remove_event_listener(id));
        assert_eq!(button.dispatch_event("click"), 0);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_may_touch_their_own_node() {
        let button = Node::element("button");
        button.add_event_listener("click", |event| {
            event.target().set_text_content("clicked");
        });

        button.dispatch_event("click");
        assert_eq!(button.text_content(), "clicked");
    }
}
