//! In-Memory Host DOM
//!
//! Latches bind to a tree they do not create. This module is a small
//! in-memory rendition of that host tree: elements and text nodes with
//! attributes, form control values, deep cloning, class queries and
//! synchronous event dispatch.
//!
//! It deliberately covers only the primitives latches consume. There is no
//! parser, no styling and no event propagation beyond the target node.
//!
//! # Example
//!
//! ```rust
//! use latch_core::dom::Node;
//!
//! let card = Node::element("div")
//!     .with_child(Node::element("h2").with_class("bit").with_attr("data-key", "title"))
//!     .with_child(Node::element("input").with_class("bit").with_attr("data-key", "name"));
//!
//! assert_eq!(card.query_class("bit").len(), 2);
//! ```

mod event;
mod node;

pub use event::{Event, ListenerFn, ListenerId};
pub use node::{Node, NodeId, NodeKind, WeakNode};
