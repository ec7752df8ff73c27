//! Guest-visible identifiers for kernel and domain objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guest-visible handle to a kernel object
///
/// Handles are small integers allocated by the handle table. The value is
/// opaque to the dispatch engine: it is only ever passed back to the handle
/// table or copied into a response's handle descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandleId(u32);

impl HandleId {
    /// Creates a handle ID from its raw guest value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw guest value
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.0)
    }
}

/// Identifier of an object inside a domain
///
/// Object IDs are assigned by the owning domain, start at 1 and are never
/// reused. The value 0 never names an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// The reserved "no object" value
    pub const NONE: ObjectId = ObjectId(0);

    /// Creates an object ID from its raw wire value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw wire value
    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    /// Returns true for the reserved zero ID
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}
