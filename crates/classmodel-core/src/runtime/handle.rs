//! Instance handles and invocation scopes.

use std::fmt;

use crate::TypeHash;

/// Handle to an instance stored in the runtime's instance heap.
///
/// The generational index lets the heap reject handles that outlived the
/// instance they referred to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Index into the heap's slot table
    pub index: u32,
    /// Generation for use-after-release detection
    pub generation: u32,
}

impl ObjectHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// The context a member access is resolved in.
///
/// `origin` is the class whose code is running: its private members are
/// visible, and subtype additions are not. A scope with no receiver is the
/// context of a static method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    pub this: Option<ObjectHandle>,
    pub origin: TypeHash,
}

impl Scope {
    /// Scope of an instance method declared in `origin`.
    pub fn instance(this: ObjectHandle, origin: TypeHash) -> Self {
        Self {
            this: Some(this),
            origin,
        }
    }

    /// Scope of a static method declared in `origin`.
    pub fn class(origin: TypeHash) -> Self {
        Self { this: None, origin }
    }

    /// The same receiver, seen from another class in its chain.
    pub fn with_origin(self, origin: TypeHash) -> Self {
        Self { origin, ..self }
    }

    pub fn is_static(&self) -> bool {
        self.this.is_none()
    }
}
