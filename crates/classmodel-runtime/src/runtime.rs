//! The runtime: class definition entry points, instantiation and dispatch.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use classmodel_builder::{Capabilities, MemberBuilder};
use classmodel_core::{
    BoundMethod, CallContext, ClassError, ConstructionFailure, Declaration, Dispatch, IntoValue,
    MemberRecord, MemberValue, MethodBody, NativeFn, ObjectHandle, RuntimeError, Scope, TypeHash,
    Value,
};
use classmodel_registry::ClassRegistry;

use crate::heap::{InstanceData, InstanceHeap};
use crate::layout::{ClassLayout, Resolved};

/// Name of the method run by [`Runtime::instantiate`], when a class has one.
pub const CONSTRUCTOR: &str = "__construct";

/// A member located for one access.
struct Resolution {
    record: Arc<MemberRecord>,
    /// Instance the member belongs to; `None` for statics.
    receiver: Option<ObjectHandle>,
    slot: Option<usize>,
}

impl Resolution {
    fn instance(handle: ObjectHandle, record: Arc<MemberRecord>, slot: Option<usize>) -> Self {
        Self {
            record,
            receiver: Some(handle),
            slot,
        }
    }

    fn class(record: Arc<MemberRecord>) -> Self {
        Self {
            record,
            receiver: None,
            slot: None,
        }
    }

    /// The scope the member's own code runs in.
    fn scope(&self) -> Scope {
        Scope {
            this: self.receiver,
            origin: self.record.origin,
        }
    }
}

/// Owns the classes, their resolved layouts, static storage and instances.
///
/// Class definition goes through [`declare_class`](Self::declare_class),
/// [`build_member`](Self::build_member) and [`finalize`](Self::finalize).
/// Once finalized, a class can be instantiated any number of times; every
/// instance gets fresh storage for its data members.
///
/// External access ([`get`](Self::get), [`set`](Self::set),
/// [`call`](Self::call)) sees public members only. Method bodies receive a
/// [`CallContext`] whose accesses resolve from the declaring class, where
/// protected and private members are visible too.
pub struct Runtime {
    classes: ClassRegistry,
    builder: Box<dyn MemberBuilder>,
    layouts: FxHashMap<TypeHash, Arc<ClassLayout>>,
    statics: FxHashMap<TypeHash, FxHashMap<String, Value>>,
    heap: InstanceHeap,
}

impl Runtime {
    /// Create a runtime for the detected target capabilities.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::detect())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            classes: ClassRegistry::new(),
            builder: capabilities.builder(),
            layouts: FxHashMap::default(),
            statics: FxHashMap::default(),
            heap: InstanceHeap::new(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.builder.capabilities()
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassRegistry {
        &mut self.classes
    }

    // ==========================================================================
    // Class Definition
    // ==========================================================================

    /// Begin defining a class.
    pub fn declare_class(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<TypeHash, ClassError> {
        self.classes.declare(name, parent)
    }

    /// Build one member into a class under definition.
    pub fn build_member(
        &mut self,
        class: TypeHash,
        decl: Declaration,
    ) -> Result<Arc<MemberRecord>, ClassError> {
        self.builder.build(&mut self.classes, class, decl)
    }

    /// Complete a class definition.
    pub fn finalize(&mut self, class: TypeHash) -> Result<(), ClassError> {
        self.classes.finalize(class)
    }

    /// The resolved layout of a finalized class, built on first use.
    pub fn layout(&mut self, class: TypeHash) -> Result<Arc<ClassLayout>, ClassError> {
        if let Some(layout) = self.layouts.get(&class) {
            return Ok(Arc::clone(layout));
        }

        let layout = Arc::new(ClassLayout::build(&self.classes, class)?);

        for &ancestor in layout.chain() {
            self.statics.entry(ancestor).or_insert_with(|| {
                layout
                    .statics_of(ancestor)
                    .filter_map(|record| match &record.value {
                        MemberValue::Property(initial) => {
                            Some((record.name.clone(), initial.clone()))
                        }
                        _ => None,
                    })
                    .collect()
            });
        }

        self.layouts.insert(class, Arc::clone(&layout));
        Ok(layout)
    }

    // ==========================================================================
    // Instances
    // ==========================================================================

    /// Create an instance of a finalized, concrete class.
    ///
    /// Runs the class's public `__construct` method with `args` if it has
    /// one. If construction fails the instance is released.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(
        &mut self,
        class: TypeHash,
        args: &[Value],
    ) -> Result<ObjectHandle, RuntimeError> {
        let layout = self.layout(class)?;

        if let Some(member) = layout.abstract_member() {
            return Err(ClassError::Construction {
                class: layout.name().to_string(),
                reason: ConstructionFailure::Abstract {
                    member: member.to_string(),
                },
            }
            .into());
        }

        let handle = self.heap.allocate(InstanceData {
            class,
            slots: layout.defaults().to_vec(),
        });

        if let Some(entry) = layout.resolve_external(CONSTRUCTOR) {
            let ctor = Resolution::instance(handle, Arc::clone(&entry.record), entry.slot);
            if let Err(err) = self.invoke_resolved(&ctor, args) {
                self.heap.free(handle);
                return Err(err);
            }
        }

        Ok(handle)
    }

    /// Release an instance. Later access through `handle` fails.
    pub fn release(&mut self, handle: ObjectHandle) -> Result<(), RuntimeError> {
        if self.heap.free(handle) {
            Ok(())
        } else {
            Err(RuntimeError::StaleHandle)
        }
    }

    /// Class of a live instance.
    pub fn class_of(&self, handle: ObjectHandle) -> Result<TypeHash, RuntimeError> {
        self.heap
            .get(handle)
            .map(|data| data.class)
            .ok_or(RuntimeError::StaleHandle)
    }

    /// Whether the instance's class is `class` or derives from it.
    pub fn is_instance_of(&self, handle: ObjectHandle, class: TypeHash) -> bool {
        self.class_of(handle)
            .is_ok_and(|own| self.classes.is_subclass_of(own, class))
    }

    pub fn live_instances(&self) -> usize {
        self.heap.len()
    }

    // ==========================================================================
    // External Access
    // ==========================================================================

    /// Read a public member.
    pub fn get(&mut self, handle: ObjectHandle, name: &str) -> Result<Value, RuntimeError> {
        let target = self.resolve_external(handle, name)?;
        self.read_resolved(&target)
    }

    /// Write a public member.
    pub fn set(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        value: impl IntoValue,
    ) -> Result<(), RuntimeError> {
        let target = self.resolve_external(handle, name)?;
        self.write_resolved(&target, value.into_value())
    }

    /// Invoke a public method.
    pub fn call(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_external(handle, name)?;
        self.invoke_resolved(&target, args)
    }

    /// Invoke a method value, such as one returned by a method body.
    pub fn call_value(&mut self, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match callee {
            Value::Method(method) => self.invoke_bound(method, args),
            other => Err(RuntimeError::NotCallable {
                name: other.type_name().to_string(),
            }),
        }
    }

    /// Read a public static member.
    pub fn get_static(&mut self, class: TypeHash, name: &str) -> Result<Value, RuntimeError> {
        let target = self.resolve_static_external(class, name)?;
        self.read_resolved(&target)
    }

    /// Write a public static member.
    pub fn set_static(
        &mut self,
        class: TypeHash,
        name: &str,
        value: impl IntoValue,
    ) -> Result<(), RuntimeError> {
        let target = self.resolve_static_external(class, name)?;
        self.write_resolved(&target, value.into_value())
    }

    /// Invoke a public static method.
    pub fn call_static(
        &mut self,
        class: TypeHash,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let target = self.resolve_static_external(class, name)?;
        self.invoke_resolved(&target, args)
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    fn resolve_external(
        &mut self,
        handle: ObjectHandle,
        name: &str,
    ) -> Result<Resolution, RuntimeError> {
        let class = self.class_of(handle)?;
        let layout = self.layout(class)?;

        if let Some(entry) = layout.resolve_external(name) {
            return Ok(Resolution::instance(handle, Arc::clone(&entry.record), entry.slot));
        }

        layout
            .resolve_static_external(name)
            .map(|record| Resolution::class(Arc::clone(record)))
            .ok_or_else(|| undefined(name))
    }

    fn resolve_static_external(
        &mut self,
        class: TypeHash,
        name: &str,
    ) -> Result<Resolution, RuntimeError> {
        let layout = self.layout(class)?;
        layout
            .resolve_static_external(name)
            .map(|record| Resolution::class(Arc::clone(record)))
            .ok_or_else(|| undefined(name))
    }

    fn resolve_internal(&mut self, scope: &Scope, name: &str) -> Result<Resolution, RuntimeError> {
        let Some(handle) = scope.this else {
            let layout = self.layout(scope.origin)?;
            return layout
                .resolve_static(scope.origin, name)
                .map(|record| Resolution::class(Arc::clone(record)))
                .ok_or_else(|| undefined(name));
        };

        let class = self.class_of(handle)?;
        let layout = self.layout(class)?;

        match layout.resolve_internal(scope.origin, name) {
            Some(Resolved::Instance(entry)) => Ok(Resolution::instance(
                handle,
                Arc::clone(&entry.record),
                entry.slot,
            )),
            Some(Resolved::Static(record)) => Ok(Resolution::class(Arc::clone(record))),
            None => Err(undefined(name)),
        }
    }

    // ==========================================================================
    // Member Operations
    // ==========================================================================

    fn read_resolved(&mut self, target: &Resolution) -> Result<Value, RuntimeError> {
        let record = &target.record;
        match &record.value {
            MemberValue::Property(_) => self.load(target),
            MemberValue::Method { .. } => Ok(Value::Method(BoundMethod::new(
                target.scope(),
                Arc::clone(record),
            ))),
            MemberValue::Accessor { getter, .. } => {
                let getter = getter.as_ref().ok_or_else(|| RuntimeError::WriteOnly {
                    name: record.name.clone(),
                })?;
                self.run_native(getter, target.scope(), &[])
            }
        }
    }

    fn write_resolved(&mut self, target: &Resolution, value: Value) -> Result<(), RuntimeError> {
        let record = &target.record;
        match &record.value {
            MemberValue::Property(_) => self.store(target, value),
            MemberValue::Method { .. } => Err(RuntimeError::ImmutableMethod {
                name: record.name.clone(),
            }),
            MemberValue::Accessor { setter, .. } => {
                let setter = setter.as_ref().ok_or_else(|| RuntimeError::ReadOnly {
                    name: record.name.clone(),
                })?;
                self.run_native(setter, target.scope(), &[value])?;
                Ok(())
            }
        }
    }

    fn invoke_resolved(
        &mut self,
        target: &Resolution,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let record = &target.record;
        match &record.value {
            MemberValue::Method {
                body: MethodBody::Native(body),
                ..
            } => self.run_native(body, target.scope(), args),
            MemberValue::Method {
                body: MethodBody::Abstract,
                ..
            } => Err(RuntimeError::AbstractInvocation {
                name: record.name.clone(),
            }),
            _ => match self.read_resolved(target)? {
                Value::Method(method) => self.invoke_bound(&method, args),
                _ => Err(RuntimeError::NotCallable {
                    name: record.name.clone(),
                }),
            },
        }
    }

    fn run_native(
        &mut self,
        body: &NativeFn,
        scope: Scope,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let mut ctx = CallContext::new(self, scope, args);
        body.call(&mut ctx)?;
        Ok(ctx.into_return())
    }

    fn load(&self, target: &Resolution) -> Result<Value, RuntimeError> {
        let record = &target.record;
        match (target.receiver, target.slot) {
            (Some(handle), Some(slot)) => {
                let data = self.heap.get(handle).ok_or(RuntimeError::StaleHandle)?;
                Ok(data.slots[slot].clone())
            }
            _ => self
                .statics
                .get(&record.origin)
                .and_then(|values| values.get(&record.name))
                .cloned()
                .ok_or_else(|| undefined(&record.name)),
        }
    }

    fn store(&mut self, target: &Resolution, value: Value) -> Result<(), RuntimeError> {
        let record = &target.record;
        match (target.receiver, target.slot) {
            (Some(handle), Some(slot)) => {
                let data = self.heap.get_mut(handle).ok_or(RuntimeError::StaleHandle)?;
                data.slots[slot] = value;
                Ok(())
            }
            _ => {
                let slot = self
                    .statics
                    .get_mut(&record.origin)
                    .and_then(|values| values.get_mut(&record.name))
                    .ok_or_else(|| undefined(&record.name))?;
                *slot = value;
                Ok(())
            }
        }
    }
}

fn undefined(name: &str) -> RuntimeError {
    RuntimeError::UndefinedMember {
        name: name.to_string(),
    }
}

impl Dispatch for Runtime {
    fn read(&mut self, scope: &Scope, name: &str) -> Result<Value, RuntimeError> {
        let target = self.resolve_internal(scope, name)?;
        self.read_resolved(&target)
    }

    fn write(&mut self, scope: &Scope, name: &str, value: Value) -> Result<(), RuntimeError> {
        let target = self.resolve_internal(scope, name)?;
        self.write_resolved(&target, value)
    }

    fn invoke(&mut self, scope: &Scope, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let target = self.resolve_internal(scope, name)?;
        self.invoke_resolved(&target, args)
    }

    fn invoke_bound(
        &mut self,
        method: &BoundMethod,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let target = match method.scope.this {
            Some(handle) => {
                if !self.heap.contains(handle) {
                    return Err(RuntimeError::StaleHandle);
                }
                Resolution::instance(handle, Arc::clone(&method.record), None)
            }
            None => Resolution::class(Arc::clone(&method.record)),
        };
        self.invoke_resolved(&target, args)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("classes", &self.classes.len())
            .field("layouts", &self.layouts.len())
            .field("heap", &self.heap)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
