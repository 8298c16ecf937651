//! Latches
//!
//! This module implements the bindings between value maps and markup: bits,
//! plain latches, loop latches and form latches.
//!
//! # Concepts
//!
//! ## Bits
//!
//! A [`Bit`] wraps one element and remembers the last string written into
//! it. Writing the same string again does nothing.
//!
//! ## Plain Latches
//!
//! A [`PlainLatch`] owns a fragment and every bit-marked element inside it.
//! Rendering a value map updates the bits whose keys it names. A plain latch
//! can be cloned into an independent copy of its fragment.
//!
//! ## Loop Latches
//!
//! A [`LoopLatch`] renders a list by cloning a plain latch template once per
//! item into its root.
//!
//! ## Form Latches
//!
//! A [`FormLatch`] reads named fields as live values and runs [`Hook`]
//! callbacks when events fire on named actions.
//!
//! # Control Flow
//!
//! Nothing here observes the tree. Every update happens inside a call made
//! by the application, and completes before that call returns.

mod bit;
mod form;
mod list;
mod plain;
mod value_map;

pub use bit::Bit;
pub use form::{Actions, Fields, FormLatch, Hook, HookFn};
pub use list::{ListStrategy, LoopLatch, Template};
pub use plain::PlainLatch;
pub use value_map::{list_from_json, values, values_from_json, Values};

use crate::dom::Node;

/// Which kind of latch a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatchKind {
    Plain,
    Loop,
    Form,
}

/// Behavior shared by every latch.
pub trait Latch {
    fn kind(&self) -> LatchKind;

    /// The element the latch was bound to.
    fn root(&self) -> &Node;
}
