//! The seam between method bodies and the runtime that owns instances.

use crate::RuntimeError;

use super::{BoundMethod, Scope, Value};

/// Member access resolved against a [`Scope`].
///
/// Native bodies never see instance storage directly. Every read, write and
/// call they make goes through this trait with the scope of the running
/// method, so the implementor decides which members are visible.
pub trait Dispatch {
    /// Read a member visible from `scope`.
    fn read(&mut self, scope: &Scope, name: &str) -> Result<Value, RuntimeError>;

    /// Write a member visible from `scope`.
    fn write(&mut self, scope: &Scope, name: &str, value: Value) -> Result<(), RuntimeError>;

    /// Invoke a method visible from `scope`.
    fn invoke(&mut self, scope: &Scope, name: &str, args: &[Value])
    -> Result<Value, RuntimeError>;

    /// Invoke a method value previously read off an instance.
    fn invoke_bound(&mut self, method: &BoundMethod, args: &[Value])
    -> Result<Value, RuntimeError>;
}
