//! Member builders: validation plus commit, one declaration at a time.

use std::sync::Arc;

use classmodel_core::{
    ClassError, Declaration, MemberKind, MemberRecord, MemberValue, MethodBody, Modifiers,
    NativeFn, TypeHash, Value, Visibility,
};
use classmodel_registry::ClassRegistry;

use crate::{Capabilities, validator};

/// Builds one member into a class under definition.
///
/// Implementations share the same pipeline ([`build_member`]) and differ
/// only in which member kinds they accept. The provided methods are
/// shorthands that assemble a [`Declaration`] and forward to
/// [`build`](Self::build).
pub trait MemberBuilder {
    /// What this builder can construct.
    fn capabilities(&self) -> Capabilities;

    /// Validate `decl` against `class`'s ancestry and commit it.
    ///
    /// Nothing is committed unless every check passes.
    fn build(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        decl: Declaration,
    ) -> Result<Arc<MemberRecord>, ClassError>;

    /// Build a method taking `arity` parameters.
    #[allow(clippy::too_many_arguments)]
    fn build_method(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        name: &str,
        arity: usize,
        body: MethodBody,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        let value = MemberValue::Method { arity, body };
        let decl = Declaration::new(name, value, visibility, modifiers)?;
        self.build(registry, class, decl)
    }

    /// Build a data member with its initial value.
    fn build_prop(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        name: &str,
        value: Value,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        let value = MemberValue::Property(value);
        let decl = Declaration::new(name, value, visibility, modifiers)?;
        self.build(registry, class, decl)
    }

    fn build_getter(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        name: &str,
        getter: NativeFn,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        let decl = Declaration::new(name, MemberValue::getter(getter), visibility, modifiers)?;
        self.build(registry, class, decl)
    }

    fn build_setter(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        name: &str,
        setter: NativeFn,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        let decl = Declaration::new(name, MemberValue::setter(setter), visibility, modifiers)?;
        self.build(registry, class, decl)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_getter_setter(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        name: &str,
        getter: NativeFn,
        setter: NativeFn,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        let decl = Declaration::new(
            name,
            MemberValue::accessor(getter, setter),
            visibility,
            modifiers,
        )?;
        self.build(registry, class, decl)
    }
}

/// The shared build pipeline.
///
/// 1. the class must still be building
/// 2. a same-class redeclaration must carry override intent
/// 3. the record the class would inherit (or already declares) under this
///    name is looked up
/// 4. [`validator::validate`] approves the transition
/// 5. the record is committed, shadowing whatever it replaces
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_member(
    registry: &mut ClassRegistry,
    class: TypeHash,
    decl: Declaration,
) -> Result<Arc<MemberRecord>, ClassError> {
    let entry = registry.entry(class)?;
    if entry.is_finalized() {
        return Err(ClassError::FinalizedRegistry {
            class: entry.name.clone(),
        });
    }

    let candidate = MemberRecord::new(class, decl);
    entry.members.check_commit(&candidate)?;

    let existing = registry.lookup(&candidate.name, class);
    validator::validate(existing.map(Arc::as_ref), &candidate)?;

    registry.commit(candidate)
}

/// Builder for targets with full accessor support.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMemberBuilder;

impl MemberBuilder for StandardMemberBuilder {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn build(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        decl: Declaration,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        build_member(registry, class, decl)
    }
}

/// Builder for targets without accessor support.
///
/// Identical to [`StandardMemberBuilder`] except that every getter or
/// setter declaration fails with [`ClassError::UnsupportedFeature`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMemberBuilder;

impl MemberBuilder for FallbackMemberBuilder {
    fn capabilities(&self) -> Capabilities {
        Capabilities::REDUCED
    }

    fn build(
        &self,
        registry: &mut ClassRegistry,
        class: TypeHash,
        decl: Declaration,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        if decl.kind() == MemberKind::Accessor {
            return Err(unsupported(decl.name(), decl.value().describe()));
        }
        build_member(registry, class, decl)
    }

    // Accessors are refused before their modifiers are even looked at.

    fn build_getter(
        &self,
        _registry: &mut ClassRegistry,
        _class: TypeHash,
        name: &str,
        _getter: NativeFn,
        _visibility: Visibility,
        _modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        Err(unsupported(name, "getter"))
    }

    fn build_setter(
        &self,
        _registry: &mut ClassRegistry,
        _class: TypeHash,
        name: &str,
        _setter: NativeFn,
        _visibility: Visibility,
        _modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        Err(unsupported(name, "setter"))
    }

    fn build_getter_setter(
        &self,
        _registry: &mut ClassRegistry,
        _class: TypeHash,
        name: &str,
        _getter: NativeFn,
        _setter: NativeFn,
        _visibility: Visibility,
        _modifiers: Modifiers,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        Err(unsupported(name, "getter/setter"))
    }
}

fn unsupported(name: &str, operation: &'static str) -> ClassError {
    ClassError::UnsupportedFeature {
        name: name.to_string(),
        operation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> NativeFn {
        NativeFn::new(|_| Ok(()))
    }

    fn setup() -> (ClassRegistry, TypeHash) {
        let mut registry = ClassRegistry::new();
        let foo = registry.declare("Foo", None).unwrap();
        (registry, foo)
    }

    fn subclass(registry: &mut ClassRegistry, parent: TypeHash, name: &str) -> TypeHash {
        registry.finalize(parent).unwrap();
        let parent_name = registry.get(parent).unwrap().name.clone();
        registry.declare(name, Some(&parent_name)).unwrap()
    }

    #[test]
    fn builds_and_commits() {
        let (mut registry, foo) = setup();
        let record = StandardMemberBuilder
            .build_prop(
                &mut registry,
                foo,
                "pub",
                "foo".into(),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap();

        assert_eq!(record.origin, foo);
        assert!(Arc::ptr_eq(registry.lookup("pub", foo).unwrap(), &record));
    }

    #[test]
    fn shorthands_fix_member_kind() {
        let (mut registry, foo) = setup();
        let method = StandardMemberBuilder
            .build_method(
                &mut registry,
                foo,
                "run",
                1,
                MethodBody::Abstract,
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap();
        let prop = StandardMemberBuilder
            .build_prop(
                &mut registry,
                foo,
                "count",
                Value::Int(0),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap();

        assert_eq!(method.kind(), MemberKind::Method);
        assert!(method.is_abstract());
        assert_eq!(prop.kind(), MemberKind::Property);
        assert_eq!(prop.arity(), None);
    }

    #[test]
    fn failed_build_commits_nothing() {
        let (mut registry, foo) = setup();
        StandardMemberBuilder
            .build_method(
                &mut registry,
                foo,
                "run",
                2,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::VIRTUAL,
            )
            .unwrap();
        let sub = subclass(&mut registry, foo, "SubFoo");

        let err = StandardMemberBuilder
            .build_method(
                &mut registry,
                sub,
                "run",
                1,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::OVERRIDE,
            )
            .unwrap_err();
        assert!(matches!(err, ClassError::ArityMismatch { .. }));
        assert!(registry.get(sub).unwrap().members.is_empty());
        assert_eq!(registry.lookup("run", sub).unwrap().origin, foo);
    }

    #[test]
    fn duplicate_in_same_class() {
        let (mut registry, foo) = setup();
        let build = |registry: &mut ClassRegistry| {
            StandardMemberBuilder.build_method(
                registry,
                foo,
                "run",
                0,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::empty(),
            )
        };

        build(&mut registry).unwrap();
        let err = build(&mut registry).unwrap_err();
        assert!(matches!(err, ClassError::DuplicateDefinition { .. }));
    }

    #[test]
    fn finalized_class_rejects_build() {
        let (mut registry, foo) = setup();
        registry.finalize(foo).unwrap();
        let err = StandardMemberBuilder
            .build_prop(
                &mut registry,
                foo,
                "late",
                Value::Int(1),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap_err();
        assert_eq!(err, ClassError::FinalizedRegistry { class: "Foo".into() });
    }

    #[test]
    fn unknown_class_rejected() {
        let mut registry = ClassRegistry::new();
        let err = StandardMemberBuilder
            .build_prop(
                &mut registry,
                TypeHash::from_name("Ghost"),
                "x",
                Value::Int(1),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, ClassError::UnknownClass(_)));
    }

    #[test]
    fn invalid_modifiers_rejected_before_registry() {
        let (mut registry, foo) = setup();
        let err = StandardMemberBuilder
            .build_method(
                &mut registry,
                foo,
                "make",
                0,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::STATIC | Modifiers::VIRTUAL,
            )
            .unwrap_err();
        assert!(err.to_string().contains("make"));
        assert!(registry.get(foo).unwrap().members.is_empty());
    }

    #[test]
    fn standard_builds_accessors() {
        let (mut registry, foo) = setup();
        let builder = StandardMemberBuilder;
        builder
            .build_getter(&mut registry, foo, "a", noop(), Visibility::Public, Modifiers::empty())
            .unwrap();
        builder
            .build_setter(&mut registry, foo, "b", noop(), Visibility::Public, Modifiers::empty())
            .unwrap();
        builder
            .build_getter_setter(
                &mut registry,
                foo,
                "c",
                noop(),
                noop(),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap();
        assert_eq!(registry.get(foo).unwrap().members.len(), 3);
        assert!(builder.capabilities().accessors);
    }

    #[test]
    fn fallback_rejects_accessors() {
        let (mut registry, foo) = setup();
        let builder = FallbackMemberBuilder;

        let err = builder
            .build_getter(&mut registry, foo, "a", noop(), Visibility::Public, Modifiers::empty())
            .unwrap_err();
        assert_eq!(
            err,
            ClassError::UnsupportedFeature {
                name: "a".into(),
                operation: "getter",
            }
        );

        let err = builder
            .build_setter(&mut registry, foo, "b", noop(), Visibility::Public, Modifiers::empty())
            .unwrap_err();
        assert!(err.to_string().contains("unsupported"));
        assert!(registry.get(foo).unwrap().members.is_empty());
        assert!(!builder.capabilities().accessors);
    }

    #[test]
    fn fallback_rejects_accessors_with_any_modifiers() {
        let (mut registry, foo) = setup();
        let builder = FallbackMemberBuilder;

        for modifiers in [Modifiers::ABSTRACT, Modifiers::STATIC | Modifiers::VIRTUAL] {
            let err = builder
                .build_getter(&mut registry, foo, "g", noop(), Visibility::Public, modifiers)
                .unwrap_err();
            assert_eq!(
                err,
                ClassError::UnsupportedFeature {
                    name: "g".into(),
                    operation: "getter",
                }
            );

            let err = builder
                .build_setter(&mut registry, foo, "s", noop(), Visibility::Private, modifiers)
                .unwrap_err();
            assert!(matches!(
                err,
                ClassError::UnsupportedFeature {
                    operation: "setter",
                    ..
                }
            ));
        }
        assert!(registry.get(foo).unwrap().members.is_empty());
    }

    #[test]
    fn fallback_builds_everything_else() {
        let (mut registry, foo) = setup();
        let builder = FallbackMemberBuilder;
        builder
            .build_method(
                &mut registry,
                foo,
                "run",
                0,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::VIRTUAL,
            )
            .unwrap();
        builder
            .build_prop(
                &mut registry,
                foo,
                "x",
                Value::Int(0),
                Visibility::Private,
                Modifiers::empty(),
            )
            .unwrap();
        let sub = subclass(&mut registry, foo, "SubFoo");

        let err = builder
            .build_method(
                &mut registry,
                sub,
                "run",
                0,
                MethodBody::Native(noop()),
                Visibility::Public,
                Modifiers::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, ClassError::OverrideRequired { .. }));
    }
}
