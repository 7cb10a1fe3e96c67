//! Runtime value model and the native call bridge.
//!
//! ## Key Types
//!
//! - [`Value`]: Values stored in member slots and passed through calls
//! - [`ObjectHandle`]: The single canonical reference to an instance
//! - [`Scope`]: Receiver plus the class whose code is running
//! - [`NativeFn`]: Type-erased method body
//! - [`CallContext`]: What a method body sees while it runs
//! - [`Dispatch`]: Scope-aware member access, implemented by the runtime

mod call_context;
mod dispatch;
mod handle;
mod native_fn;
mod value;

pub use call_context::CallContext;
pub use dispatch::Dispatch;
pub use handle::{ObjectHandle, Scope};
pub use native_fn::{NativeCallable, NativeFn};
pub use value::{BoundMethod, Value};
