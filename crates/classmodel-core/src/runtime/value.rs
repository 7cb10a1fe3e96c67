//! Runtime values held in instance slots, arguments and return slots.

use std::fmt;
use std::sync::Arc;

use crate::MemberRecord;

use super::{ObjectHandle, Scope};

/// A value stored in a member slot or passed through a call.
///
/// Instances are always referred to by [`ObjectHandle`]; the handle is the
/// only thing an external caller ever holds, and it is also what
/// [`crate::CallContext::this`] yields inside a method body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value (uninitialized slot, method without a return)
    #[default]
    Null,
    /// Integer value (all integer widths stored as i64)
    Int(i64),
    /// Floating point value (f32 and f64 both stored as f64)
    Float(f64),
    Bool(bool),
    String(String),
    /// Handle to a class instance
    Object(ObjectHandle),
    /// Method bound to a receiver and the scope it runs in
    Method(BoundMethod),
}

impl Value {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Method(_) => "method",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The instance handle, if this value refers to one.
    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }
}

/// A method member read off an instance.
///
/// Carries the scope the method was resolved in, so invoking it later runs
/// the body with the same receiver and the same private view as a direct
/// call would.
#[derive(Clone)]
pub struct BoundMethod {
    pub scope: Scope,
    pub record: Arc<MemberRecord>,
}

impl BoundMethod {
    pub fn new(scope: Scope, record: Arc<MemberRecord>) -> Self {
        Self { scope, record }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.record.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl PartialEq for BoundMethod {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && Arc::ptr_eq(&self.record, &other.record)
    }
}
