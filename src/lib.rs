//! Classical class semantics (visibility, virtual/override/abstract
//! contracts, static members) on top of a flat, dynamically typed member
//! model.
//!
//! The workspace is split by phase:
//!
//! - `classmodel-core`: member records, modifiers, values, errors
//! - `classmodel-registry`: per-class member registries and ancestry lookup
//! - `classmodel-builder`: override validation and the member builders
//! - `classmodel-runtime`: layouts, instantiation and dispatch
//!
//! This crate re-exports all of them and adds [`ClassDefinition`], a fluent
//! front end for defining classes.

mod definition;

pub use classmodel_builder::{
    Capabilities, FallbackMemberBuilder, MemberBuilder, StandardMemberBuilder, build_member,
    validate, validator,
};
pub use classmodel_core::{
    BoundMethod, CallContext, ClassError, ConstructionFailure, ConversionError, Declaration,
    Dispatch, FromValue, IntoValue, MemberKind, MemberRecord, MemberValue, MethodBody, Modifiers,
    NativeCallable, NativeError, NativeFn, ObjectHandle, RuntimeError, Scope, TypeHash, Value,
    Visibility,
};
pub use classmodel_registry::{ClassEntry, ClassRegistry, MemberRegistry};
pub use classmodel_runtime::{
    CONSTRUCTOR, ClassLayout, InstanceData, InstanceHeap, LayoutEntry, Resolved, Runtime,
};

pub use definition::ClassDefinition;
