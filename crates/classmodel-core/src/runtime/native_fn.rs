//! Native method bodies and the callable trait.

use std::fmt;
use std::sync::Arc;

use crate::RuntimeError;

use super::CallContext;

/// Type-erased method body.
///
/// Wraps any callable implementing [`NativeCallable`] so method, getter and
/// setter bodies of different closure types can be stored uniformly in
/// member records. Cloning shares the callable.
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a closure.
    ///
    /// ```
    /// use classmodel_core::NativeFn;
    ///
    /// let double = NativeFn::new(|ctx| {
    ///     let x: i64 = ctx.arg(0)?;
    ///     ctx.set_return(x * 2);
    ///     Ok(())
    /// });
    /// # let _ = double;
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap an existing [`NativeCallable`] implementation.
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: NativeCallable + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(callable),
        }
    }

    /// Call this body with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), RuntimeError> {
        self.inner.call(ctx)
    }

    /// Check whether two handles share the same callable.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable method bodies.
///
/// The `call` method receives a [`CallContext`] giving access to the
/// arguments, the receiver's members, and the return slot.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), RuntimeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), RuntimeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), RuntimeError> {
        (self)(ctx)
    }
}
