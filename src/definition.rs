//! Fluent class definition.
//!
//! [`ClassDefinition`] walks a class body the way a declarative front end
//! would: one builder call per member, in declaration order, then a single
//! finalize. Every step returns `Result` so a definition reads as a chain of
//! `?`s and stops at the first rejected member.
//!
//! # Example
//!
//! ```
//! use classmodel::{ClassDefinition, Runtime, Value, Visibility};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rt = Runtime::new();
//!
//! let counter = ClassDefinition::new(&mut rt, "Counter", None)?
//!     .property(Visibility::Private, "count", 0i64)?
//!     .method(Visibility::Public, "increment", 0, |ctx| {
//!         let count: i64 = ctx.get("count")?;
//!         ctx.set("count", count + 1)?;
//!         ctx.set_return(ctx.this());
//!         Ok(())
//!     })?
//!     .method(Visibility::Public, "getCount", 0, |ctx| {
//!         let count: i64 = ctx.get("count")?;
//!         ctx.set_return(count);
//!         Ok(())
//!     })?
//!     .build()?;
//!
//! let obj = rt.instantiate(counter, &[])?;
//! rt.call(obj, "increment", &[])?;
//! assert_eq!(rt.call(obj, "getCount", &[])?, Value::Int(1));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use classmodel_core::{
    CallContext, ClassError, Declaration, MemberRecord, MemberValue, Modifiers, NativeFn,
    RuntimeError, TypeHash, Value, Visibility,
};
use classmodel_runtime::Runtime;

/// A class under definition.
pub struct ClassDefinition<'rt> {
    runtime: &'rt mut Runtime,
    class: TypeHash,
    members: Vec<Arc<MemberRecord>>,
}

impl<'rt> ClassDefinition<'rt> {
    /// Begin a class, optionally extending a finalized parent.
    pub fn new(
        runtime: &'rt mut Runtime,
        name: &str,
        parent: Option<&str>,
    ) -> Result<Self, ClassError> {
        let class = runtime.declare_class(name, parent)?;
        Ok(Self {
            runtime,
            class,
            members: Vec::new(),
        })
    }

    pub fn class(&self) -> TypeHash {
        self.class
    }

    /// Records built so far, in declaration order.
    pub fn members(&self) -> &[Arc<MemberRecord>] {
        &self.members
    }

    /// Build an already assembled declaration.
    pub fn member(mut self, decl: Declaration) -> Result<Self, ClassError> {
        let record = self.runtime.build_member(self.class, decl)?;
        self.members.push(record);
        Ok(self)
    }

    /// Declare any member with an explicit modifier set.
    pub fn declare(
        self,
        name: &str,
        value: MemberValue,
        visibility: Visibility,
        modifiers: Modifiers,
    ) -> Result<Self, ClassError> {
        let decl = Declaration::new(name, value, visibility, modifiers)?;
        self.member(decl)
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    pub fn method<F>(
        self,
        visibility: Visibility,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<Self, ClassError>
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        self.declare(
            name,
            MemberValue::method(arity, f),
            visibility,
            Modifiers::empty(),
        )
    }

    /// A method subtypes may override.
    pub fn virtual_method<F>(
        self,
        visibility: Visibility,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<Self, ClassError>
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        self.declare(
            name,
            MemberValue::method(arity, f),
            visibility,
            Modifiers::VIRTUAL,
        )
    }

    /// Override an inherited virtual method. The override is sealed.
    pub fn override_method<F>(
        self,
        visibility: Visibility,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<Self, ClassError>
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        self.declare(
            name,
            MemberValue::method(arity, f),
            visibility,
            Modifiers::OVERRIDE,
        )
    }

    pub fn abstract_method(
        self,
        visibility: Visibility,
        name: &str,
        arity: usize,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::abstract_method(arity),
            visibility,
            Modifiers::ABSTRACT,
        )
    }

    pub fn static_method<F>(
        self,
        visibility: Visibility,
        name: &str,
        arity: usize,
        f: F,
    ) -> Result<Self, ClassError>
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        self.declare(
            name,
            MemberValue::method(arity, f),
            visibility,
            Modifiers::STATIC,
        )
    }

    // ==========================================================================
    // Data
    // ==========================================================================

    pub fn property(
        self,
        visibility: Visibility,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::property(value),
            visibility,
            Modifiers::empty(),
        )
    }

    pub fn static_property(
        self,
        visibility: Visibility,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::property(value),
            visibility,
            Modifiers::STATIC,
        )
    }

    pub fn getter(
        self,
        visibility: Visibility,
        name: &str,
        getter: NativeFn,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::getter(getter),
            visibility,
            Modifiers::empty(),
        )
    }

    pub fn setter(
        self,
        visibility: Visibility,
        name: &str,
        setter: NativeFn,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::setter(setter),
            visibility,
            Modifiers::empty(),
        )
    }

    pub fn accessor(
        self,
        visibility: Visibility,
        name: &str,
        getter: NativeFn,
        setter: NativeFn,
    ) -> Result<Self, ClassError> {
        self.declare(
            name,
            MemberValue::accessor(getter, setter),
            visibility,
            Modifiers::empty(),
        )
    }

    /// Finalize the class. Returns its hash for instantiation.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(self) -> Result<TypeHash, ClassError> {
        self.runtime.finalize(self.class)?;
        Ok(self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_builds_and_finalizes() {
        let mut rt = Runtime::new();
        let def = ClassDefinition::new(&mut rt, "Foo", None)
            .unwrap()
            .property(Visibility::Public, "a", 1i64)
            .unwrap()
            .virtual_method(Visibility::Public, "run", 0, |_| Ok(()))
            .unwrap();
        assert_eq!(def.members().len(), 2);

        let foo = def.build().unwrap();
        assert!(rt.classes().is_finalized(foo));
    }

    #[test]
    fn first_error_stops_definition() {
        let mut rt = Runtime::new();
        let result = ClassDefinition::new(&mut rt, "Foo", None)
            .and_then(|def| def.property(Visibility::Public, "a", 1i64))
            .and_then(|def| def.property(Visibility::Public, "a", 2i64));

        assert!(matches!(
            result.err(),
            Some(ClassError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn abstract_method_declared_abstract() {
        let mut rt = Runtime::new();
        let def = ClassDefinition::new(&mut rt, "Shape", None)
            .unwrap()
            .abstract_method(Visibility::Public, "area", 0)
            .unwrap();
        let record = &def.members()[0];
        assert!(record.is_abstract());
        assert!(record.is_virtual());
    }

    #[test]
    fn parent_must_exist() {
        let mut rt = Runtime::new();
        assert!(matches!(
            ClassDefinition::new(&mut rt, "Sub", Some("Missing")).err(),
            Some(ClassError::UnknownClass(_))
        ));
    }
}
