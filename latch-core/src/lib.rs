//! Latch Core
//!
//! This crate binds value maps to markup that already exists. Instead of
//! rebuilding the markup on every update, it finds the elements that show
//! data once and then writes only the values that changed.
//!
//! - Bits: one element, one remembered value
//! - Plain latches: a fragment of keyed bits, partially re-renderable and
//!   clonable
//! - Loop latches: a list rendered from clones of a plain latch
//! - Form latches: live field values and hooks on action elements
//!
//! # Architecture
//!
//! - `latch`: the bindings themselves
//! - `dom`: an in-memory host tree the bindings operate on
//! - `config`: the class and attribute names bindings are discovered by
//! - `env`: the host capability check run by [`init`]
//! - `error`: the crate's error type
//!
//! # Markup
//!
//! Bindable elements carry the `bit` class. A bit's key comes from its
//! `data-key` attribute; form fields and actions are named by `data-field`
//! and `data-action`.
//!
//! # Example
//!
//! ```rust
//! use latch_core::dom::Node;
//! use latch_core::{values, Environment, PlainLatch};
//!
//! latch_core::init(&Environment::in_memory())?;
//!
//! let card = Node::element("div")
//!     .with_child(Node::element("h2").with_class("bit").with_attr("data-key", "title"))
//!     .with_child(Node::element("p").with_class("bit").with_attr("data-key", "body"));
//!
//! let mut latch = PlainLatch::new(card.clone(), &values([("title", "Hello")]))?;
//! latch.render(&values([("body", "World")]));
//!
//! assert_eq!(card.text_content(), "HelloWorld");
//! # Ok::<(), latch_core::LatchError>(())
//! ```

pub mod config;
pub mod dom;
pub mod env;
pub mod error;
pub mod latch;

pub use config::{KeyPolicy, MarkupConfig};
pub use env::{Capability, Environment};
pub use error::{DomError, LatchError, Result};
pub use latch::{
    list_from_json, values, values_from_json, Bit, FormLatch, Hook, Latch, LatchKind,
    ListStrategy, LoopLatch, PlainLatch, Template, Values,
};

/// Check that `env` offers everything latches need.
///
/// Call once before binding markup in a host other than the bundled
/// in-memory tree.
pub fn init(env: &Environment) -> Result<()> {
    env.ensure()
}
