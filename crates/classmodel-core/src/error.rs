//! Error types for class definition and runtime dispatch.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ClassError       - definition-time failures (builder, registry, construction)
//! ConversionError  - a Value could not be converted to the requested Rust type
//! NativeError      - argument access failures inside native method bodies
//! RuntimeError     - member access and dispatch failures (wraps the others)
//! ```
//!
//! Definition-time errors are programmer errors. None of them is recovered
//! from inside this workspace: each one aborts the enclosing class definition
//! and surfaces to the caller of the builder or the runtime.

use std::fmt;

use thiserror::Error;

use crate::Visibility;

// ============================================================================
// Definition Errors
// ============================================================================

/// Errors raised while defining or constructing a class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// Illegal modifier pairing on a declaration.
    #[error("invalid modifiers for member '{name}': {reason}")]
    InvalidModifierCombination {
        name: String,
        reason: &'static str,
    },

    /// Same name redeclared at the same visibility in the same class.
    #[error("member '{name}' is already defined as {visibility} in class '{class}'")]
    DuplicateDefinition {
        name: String,
        visibility: Visibility,
        class: String,
    },

    /// An inherited concrete member was redeclared without `override`.
    #[error("member '{name}' hides an inherited member and must be declared 'override'")]
    OverrideRequired { name: String },

    /// The inherited member is not virtual.
    #[error("cannot override non-virtual member '{name}'")]
    NonVirtualOverride { name: String },

    /// Methods, properties and accessors cannot replace one another.
    #[error("cannot override {existing} '{name}' with {candidate}")]
    IncompatibleKind {
        name: String,
        /// Description of the inherited member (`method`, `getter`, ...).
        existing: &'static str,
        /// Description of the new member.
        candidate: &'static str,
    },

    /// Static and instance members cannot replace one another.
    #[error("cannot override {existing} member '{name}' with {candidate} member")]
    StaticMismatch {
        name: String,
        /// `static` or `instance`.
        existing: &'static str,
        candidate: &'static str,
    },

    /// An override declares fewer parameters than the method it replaces.
    #[error(
        "method '{name}' declares {candidate} parameter(s) but overrides a method with {existing}"
    )]
    ArityMismatch {
        name: String,
        existing: usize,
        candidate: usize,
    },

    /// A concrete member cannot be made abstract again.
    #[error("cannot override concrete member '{name}' with an abstract member")]
    AbstractOverrideOfConcrete { name: String },

    /// An override may not hide the member from callers that could see it.
    #[error("cannot de-escalate visibility of '{name}' from {existing} to {candidate}")]
    VisibilityDeEscalation {
        name: String,
        existing: Visibility,
        candidate: Visibility,
    },

    /// The builder variant in use cannot construct this kind of member.
    #[error(
        "{operation} construction is unsupported in the current capability set (member '{name}')"
    )]
    UnsupportedFeature {
        name: String,
        operation: &'static str,
    },

    /// The class's member registry no longer accepts members.
    #[error("class '{class}' is finalized; its members cannot be modified")]
    FinalizedRegistry { class: String },

    /// The class cannot be instantiated.
    #[error("cannot construct '{class}': {reason}")]
    Construction {
        class: String,
        reason: ConstructionFailure,
    },

    /// No class is registered under this name or hash.
    #[error("class not found: {0}")]
    UnknownClass(String),

    /// A class with this name already exists.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// Subtypes can only extend finished classes.
    #[error("class '{class}' cannot extend '{parent}' before it is finalized")]
    ParentNotFinalized { class: String, parent: String },
}

/// Why [`ClassError::Construction`] was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionFailure {
    /// The member registry is still being built.
    NotFinalized,
    /// The class still resolves an abstract method.
    Abstract { member: String },
}

impl fmt::Display for ConstructionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionFailure::NotFinalized => f.write_str("class definition is not finalized"),
            ConstructionFailure::Abstract { member } => {
                write!(f, "abstract method '{member}' has no implementation")
            }
        }
    }
}

// ============================================================================
// Native Errors
// ============================================================================

/// A value held the wrong variant for the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("integer {value} does not fit in {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },
}

/// Errors raised by native method bodies while reading their arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    #[error("argument index {index} out of bounds ({count} argument(s) supplied)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Free-form failure reported by a method body.
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised while reading, writing or invoking members.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// No member by this name is visible from the calling context.
    #[error("undefined member '{name}'")]
    UndefinedMember { name: String },

    /// The member does not hold anything callable.
    #[error("member '{name}' is not callable")]
    NotCallable { name: String },

    /// Accessor without a setter.
    #[error("member '{name}' is read-only")]
    ReadOnly { name: String },

    /// Accessor without a getter.
    #[error("member '{name}' is write-only")]
    WriteOnly { name: String },

    /// Methods are fixed by the class definition.
    #[error("method '{name}' cannot be reassigned")]
    ImmutableMethod { name: String },

    /// Abstract methods have no body to run.
    #[error("abstract method '{name}' cannot be invoked")]
    AbstractInvocation { name: String },

    /// The instance handle was released or never existed.
    #[error("stale or invalid instance handle")]
    StaleHandle,

    #[error(transparent)]
    Class(#[from] ClassError),

    #[error(transparent)]
    Native(#[from] NativeError),
}

impl From<ConversionError> for RuntimeError {
    fn from(err: ConversionError) -> Self {
        RuntimeError::Native(NativeError::Conversion(err))
    }
}
