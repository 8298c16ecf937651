//! Host Environment Guard
//!
//! Latches need a DOM-like host: element querying by class, deep cloning,
//! text content, form values and event registration. Instead of probing for
//! the host when the crate loads, the embedding application describes its
//! host with an [`Environment`] and calls [`crate::init`] once.

use std::fmt;

use tracing::info;

use crate::error::{LatchError, Result};

/// A primitive the host environment must offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Finding descendants carrying a class, in document order.
    QueryByClass,
    /// Deep-copying a subtree.
    DeepClone,
    /// Reading and writing text content.
    TextContent,
    /// Reading and writing the value of form controls.
    FormValue,
    /// Registering listeners and dispatching events.
    EventListeners,
}

impl Capability {
    /// Every capability the crate relies on.
    pub const REQUIRED: [Capability; 5] = [
        Capability::QueryByClass,
        Capability::DeepClone,
        Capability::TextContent,
        Capability::FormValue,
        Capability::EventListeners,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::QueryByClass => "query-by-class",
            Capability::DeepClone => "deep-clone",
            Capability::TextContent => "text-content",
            Capability::FormValue => "form-value",
            Capability::EventListeners => "event-listeners",
        };
        f.write_str(name)
    }
}

/// Description of what a host environment offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    capabilities: Vec<Capability>,
}

impl Environment {
    /// Describe a host by name and the capabilities it offers.
    pub fn new(name: impl Into<String>, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            name: name.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// The bundled in-memory DOM, which offers everything.
    pub fn in_memory() -> Self {
        Self::new("in-memory", Capability::REQUIRED)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the host offers `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with the first required capability the host lacks.
    pub fn ensure(&self) -> Result<()> {
        match Capability::REQUIRED
            .into_iter()
            .find(|capability| !self.supports(*capability))
        {
            Some(missing) => Err(LatchError::Environment(missing)),
            None => {
                info!(host = %self.name, "latch environment ready");
                Ok(())
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::in_memory()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
