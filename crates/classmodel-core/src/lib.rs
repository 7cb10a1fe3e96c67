//! Core types for the class model: identity, visibility, modifiers, member
//! records, runtime values and the native call bridge.
//!
//! This crate has no notion of inheritance or instance storage. Those live in
//! `classmodel-registry` and `classmodel-runtime`; everything here is shared
//! vocabulary.

pub mod convert;
mod error;
mod member;
mod modifiers;
pub mod runtime;
mod type_hash;
mod visibility;

pub use convert::{FromValue, IntoValue};
pub use error::{ClassError, ConstructionFailure, ConversionError, NativeError, RuntimeError};
pub use member::{Declaration, MemberKind, MemberRecord, MemberValue, MethodBody};
pub use modifiers::Modifiers;
pub use runtime::{
    BoundMethod, CallContext, Dispatch, NativeCallable, NativeFn, ObjectHandle, Scope, Value,
};
pub use type_hash::{TypeHash, hash_constants};
pub use visibility::Visibility;
