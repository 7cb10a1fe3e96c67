//! Member declarations and committed member records.
//!
//! A [`Declaration`] is what the class-definition orchestrator hands to a
//! member builder: a name, a value, a visibility and a modifier set that has
//! already passed the modifier-internal checks. Once the builder accepts it,
//! the declaration becomes a [`MemberRecord`] owned by the declaring class's
//! registry. Records are shared through `Arc` and never mutated; an override
//! is a new record that shadows the old one.

use std::fmt;

use crate::{ClassError, Modifiers, NativeFn, TypeHash, Value, Visibility};

/// The three shapes a member can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    /// Plain data slot.
    Property,
    /// Getter and/or setter pair.
    Accessor,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Accessor => "accessor",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a method is implemented.
#[derive(Debug, Clone)]
pub enum MethodBody {
    Native(NativeFn),
    /// Declared without a body; subtypes must supply one.
    Abstract,
}

/// The value half of a member.
#[derive(Debug, Clone)]
pub enum MemberValue {
    Method {
        /// Declared parameter count, compared on override.
        arity: usize,
        body: MethodBody,
    },
    /// Initial value of a data member.
    Property(Value),
    Accessor {
        getter: Option<NativeFn>,
        setter: Option<NativeFn>,
    },
}

impl MemberValue {
    /// A concrete method taking `arity` parameters.
    pub fn method<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&mut crate::CallContext<'_>) -> Result<(), crate::RuntimeError>
            + Send
            + Sync
            + 'static,
    {
        MemberValue::Method {
            arity,
            body: MethodBody::Native(NativeFn::new(f)),
        }
    }

    /// A method without a body.
    pub fn abstract_method(arity: usize) -> Self {
        MemberValue::Method {
            arity,
            body: MethodBody::Abstract,
        }
    }

    pub fn property(value: impl Into<Value>) -> Self {
        MemberValue::Property(value.into())
    }

    pub fn getter(getter: NativeFn) -> Self {
        MemberValue::Accessor {
            getter: Some(getter),
            setter: None,
        }
    }

    pub fn setter(setter: NativeFn) -> Self {
        MemberValue::Accessor {
            getter: None,
            setter: Some(setter),
        }
    }

    pub fn accessor(getter: NativeFn, setter: NativeFn) -> Self {
        MemberValue::Accessor {
            getter: Some(getter),
            setter: Some(setter),
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            MemberValue::Method { .. } => MemberKind::Method,
            MemberValue::Property(_) => MemberKind::Property,
            MemberValue::Accessor { .. } => MemberKind::Accessor,
        }
    }

    /// Declared parameter count, for methods only.
    pub fn arity(&self) -> Option<usize> {
        match self {
            MemberValue::Method { arity, .. } => Some(*arity),
            _ => None,
        }
    }

    /// Word used in diagnostics: accessors name the half they carry.
    pub fn describe(&self) -> &'static str {
        match self {
            MemberValue::Method { .. } => "method",
            MemberValue::Property(_) => "property",
            MemberValue::Accessor {
                getter: Some(_),
                setter: Some(_),
            } => "getter/setter",
            MemberValue::Accessor { getter: Some(_), .. } => "getter",
            MemberValue::Accessor { setter: Some(_), .. } => "setter",
            MemberValue::Accessor { .. } => "accessor",
        }
    }

    fn has_body(&self) -> bool {
        !matches!(
            self,
            MemberValue::Method {
                body: MethodBody::Abstract,
                ..
            }
        )
    }
}

/// A validated member declaration, ready to be handed to a builder.
#[derive(Debug, Clone)]
pub struct Declaration {
    name: String,
    value: MemberValue,
    visibility: Visibility,
    modifiers: Modifiers,
}

impl Declaration {
    /// Validate and normalize a declaration.
    ///
    /// Rejects illegal modifier combinations (`static` + `virtual`,
    /// `abstract` + `private`, `abstract` on non-methods) and keeps the
    /// `ABSTRACT` flag in step with the method body.
    pub fn new(
        name: impl Into<String>,
        value: MemberValue,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Self, ClassError> {
        let name = name.into();

        let modifiers = match (value.has_body(), modifiers.is_abstract()) {
            (false, false) => modifiers | Modifiers::ABSTRACT,
            (true, true) => {
                return Err(ClassError::InvalidModifierCombination {
                    name,
                    reason: "abstract methods cannot have a body",
                });
            }
            _ => modifiers,
        };

        let modifiers = modifiers.validate(&name, value.kind(), visibility)?;

        Ok(Self {
            name,
            value,
            visibility,
            modifiers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &MemberValue {
        &self.value
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn kind(&self) -> MemberKind {
        self.value.kind()
    }
}

/// A committed member of one class.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// Identity of this record (declaring class + name + static-ness).
    pub hash: TypeHash,
    pub name: String,
    pub visibility: Visibility,
    /// The class that declared this record.
    pub origin: TypeHash,
    pub modifiers: Modifiers,
    pub value: MemberValue,
}

impl MemberRecord {
    /// Turn an accepted declaration into a record owned by `origin`.
    pub fn new(origin: TypeHash, declaration: Declaration) -> Self {
        let Declaration {
            name,
            value,
            visibility,
            modifiers,
        } = declaration;

        Self {
            hash: TypeHash::from_member(origin, &name, modifiers.is_static()),
            name,
            visibility,
            origin,
            modifiers,
            value,
        }
    }

    pub fn kind(&self) -> MemberKind {
        self.value.kind()
    }

    pub fn arity(&self) -> Option<usize> {
        self.value.arity()
    }

    pub fn describe(&self) -> &'static str {
        self.value.describe()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_virtual(&self) -> bool {
        self.modifiers.is_virtual()
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract()
    }

    pub fn is_override(&self) -> bool {
        self.modifiers.is_override()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> NativeFn {
        NativeFn::new(|_| Ok(()))
    }

    #[test]
    fn method_value_reports_arity() {
        let value = MemberValue::method(2, |_| Ok(()));
        assert_eq!(value.kind(), MemberKind::Method);
        assert_eq!(value.arity(), Some(2));
        assert_eq!(MemberValue::property(1i64).arity(), None);
    }

    #[test]
    fn accessor_descriptions() {
        assert_eq!(MemberValue::getter(noop()).describe(), "getter");
        assert_eq!(MemberValue::setter(noop()).describe(), "setter");
        assert_eq!(
            MemberValue::accessor(noop(), noop()).describe(),
            "getter/setter"
        );
        assert_eq!(MemberValue::property("x").describe(), "property");
    }

    #[test]
    fn abstract_body_sets_flag() {
        let decl = Declaration::new(
            "run",
            MemberValue::abstract_method(1),
            Visibility::Public,
            Modifiers::empty(),
        )
        .unwrap();
        assert!(decl.modifiers().is_abstract());
        assert!(decl.modifiers().is_virtual());
    }

    #[test]
    fn abstract_flag_with_body_rejected() {
        let err = Declaration::new(
            "run",
            MemberValue::method(0, |_| Ok(())),
            Visibility::Public,
            Modifiers::ABSTRACT,
        )
        .unwrap_err();
        assert!(matches!(err, ClassError::InvalidModifierCombination { .. }));
    }

    #[test]
    fn private_abstract_rejected() {
        let err = Declaration::new(
            "run",
            MemberValue::abstract_method(0),
            Visibility::Private,
            Modifiers::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, ClassError::InvalidModifierCombination { .. }));
    }

    #[test]
    fn record_identity() {
        let foo = TypeHash::from_name("Foo");
        let decl = Declaration::new(
            "count",
            MemberValue::property(0i64),
            Visibility::Protected,
            Modifiers::STATIC,
        )
        .unwrap();
        let record = MemberRecord::new(foo, decl);

        assert_eq!(record.origin, foo);
        assert_eq!(record.hash, TypeHash::from_member(foo, "count", true));
        assert_eq!(record.visibility, Visibility::Protected);
        assert!(record.is_static());
        assert!(!record.is_virtual());
        assert_eq!(record.kind(), MemberKind::Property);
    }
}
