//! Call context handed to native method bodies.

use crate::convert::{FromValue, IntoValue};
use crate::{NativeError, RuntimeError, TypeHash};

use super::{Dispatch, Scope, Value};

/// Context for a native method call.
///
/// This bridges the runtime and Rust: it exposes the arguments, the
/// receiver's members as seen from the declaring class, and the return slot.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let x: i64 = ctx.arg(0)?;
/// let name: String = ctx.arg(1)?;
/// ```
///
/// ## Member Access
///
/// ```ignore
/// let count: i64 = ctx.get("count")?;
/// ctx.set("count", count + 1)?;
/// ctx.call("notify", &[])?;
/// ```
///
/// ## Return Values
///
/// ```ignore
/// ctx.set_return(x + 1);
/// ctx.set_return(ctx.this()); // chaining
/// ```
pub struct CallContext<'rt> {
    host: &'rt mut dyn Dispatch,
    scope: Scope,
    args: &'rt [Value],
    return_slot: Value,
}

impl<'rt> CallContext<'rt> {
    pub fn new(host: &'rt mut dyn Dispatch, scope: Scope, args: &'rt [Value]) -> Self {
        Self {
            host,
            scope,
            args,
            return_slot: Value::Null,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The class whose code is running.
    pub fn origin(&self) -> TypeHash {
        self.scope.origin
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Get a raw reference to an argument.
    pub fn arg_slot(&self, index: usize) -> Result<&Value, NativeError> {
        self.args
            .get(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.arg_slot(index)?;
        T::from_value(slot).map_err(NativeError::Conversion)
    }

    /// All arguments, in call order.
    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// The receiver, as the handle external callers hold.
    ///
    /// `Null` inside static methods.
    pub fn this(&self) -> Value {
        self.scope.this.map(Value::Object).unwrap_or(Value::Null)
    }

    /// Read a member visible from this method.
    pub fn get<T: FromValue>(&mut self, name: &str) -> Result<T, RuntimeError> {
        let value = self.host.read(&self.scope, name)?;
        Ok(T::from_value(&value)?)
    }

    /// Read a member, treating "not visible from here" as absence.
    pub fn lookup(&mut self, name: &str) -> Result<Option<Value>, RuntimeError> {
        match self.host.read(&self.scope, name) {
            Ok(value) => Ok(Some(value)),
            Err(RuntimeError::UndefinedMember { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write a member visible from this method.
    pub fn set(&mut self, name: &str, value: impl IntoValue) -> Result<(), RuntimeError> {
        self.host.write(&self.scope, name, value.into_value())
    }

    /// Invoke a method visible from this method.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        self.host.invoke(&self.scope, name, args)
    }

    /// Invoke a method value obtained earlier.
    pub fn call_value(&mut self, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match callee {
            Value::Method(method) => self.host.invoke_bound(method, args),
            other => Err(RuntimeError::NotCallable {
                name: other.type_name().to_string(),
            }),
        }
    }

    /// Set the return value from a raw value.
    pub fn set_return_slot(&mut self, value: Value) {
        self.return_slot = value;
    }

    /// Set a typed return value.
    pub fn set_return<T: IntoValue>(&mut self, value: T) {
        self.return_slot = value.into_value();
    }

    /// Consume the context, yielding the return value.
    pub fn into_return(self) -> Value {
        self.return_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundMethod, ObjectHandle};

    /// Flat member table ignoring scope; enough to drive the context.
    #[derive(Default)]
    struct FlatHost {
        members: Vec<(String, Value)>,
        calls: Vec<String>,
    }

    impl Dispatch for FlatHost {
        fn read(&mut self, _scope: &Scope, name: &str) -> Result<Value, RuntimeError> {
            self.members
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| RuntimeError::UndefinedMember {
                    name: name.to_string(),
                })
        }

        fn write(&mut self, _scope: &Scope, name: &str, value: Value) -> Result<(), RuntimeError> {
            match self.members.iter_mut().find(|(n, _)| n == name) {
                Some((_, slot)) => *slot = value,
                None => self.members.push((name.to_string(), value)),
            }
            Ok(())
        }

        fn invoke(
            &mut self,
            _scope: &Scope,
            name: &str,
            args: &[Value],
        ) -> Result<Value, RuntimeError> {
            self.calls.push(name.to_string());
            Ok(Value::Int(args.len() as i64))
        }

        fn invoke_bound(
            &mut self,
            method: &BoundMethod,
            _args: &[Value],
        ) -> Result<Value, RuntimeError> {
            self.calls.push(method.name().to_string());
            Ok(Value::Null)
        }
    }

    fn scope() -> Scope {
        Scope::instance(ObjectHandle::new(1, 0), TypeHash::from_name("Foo"))
    }

    #[test]
    fn typed_arguments() {
        let mut host = FlatHost::default();
        let args = [Value::Int(42), Value::String("hi".into())];
        let ctx = CallContext::new(&mut host, scope(), &args);

        assert_eq!(ctx.arg_count(), 2);
        assert_eq!(ctx.arg::<i64>(0).unwrap(), 42);
        assert_eq!(ctx.arg::<String>(1).unwrap(), "hi");
        assert!(matches!(
            ctx.arg::<i64>(1),
            Err(NativeError::Conversion(_))
        ));
        assert!(matches!(
            ctx.arg::<i64>(5),
            Err(NativeError::ArgumentIndexOutOfBounds { index: 5, count: 2 })
        ));
    }

    #[test]
    fn this_is_receiver_handle() {
        let mut host = FlatHost::default();
        let ctx = CallContext::new(&mut host, scope(), &[]);
        assert_eq!(ctx.this(), Value::Object(ObjectHandle::new(1, 0)));

        let mut host = FlatHost::default();
        let ctx = CallContext::new(&mut host, Scope::class(TypeHash::from_name("Foo")), &[]);
        assert_eq!(ctx.this(), Value::Null);
    }

    #[test]
    fn member_access_goes_through_host() {
        let mut host = FlatHost::default();
        {
            let mut ctx = CallContext::new(&mut host, scope(), &[]);
            ctx.set("count", 3i64).unwrap();
            let count: i64 = ctx.get("count").unwrap();
            assert_eq!(count, 3);
            assert_eq!(ctx.lookup("missing").unwrap(), None);
            assert_eq!(ctx.call("notify", &[Value::Null]).unwrap(), Value::Int(1));
        }
        assert_eq!(host.calls, vec!["notify".to_string()]);
    }

    #[test]
    fn call_value_requires_method() {
        let mut host = FlatHost::default();
        let mut ctx = CallContext::new(&mut host, scope(), &[]);
        let err = ctx.call_value(&Value::Int(1), &[]).unwrap_err();
        assert!(matches!(err, RuntimeError::NotCallable { .. }));
    }

    #[test]
    fn return_value() {
        let mut host = FlatHost::default();
        let mut ctx = CallContext::new(&mut host, scope(), &[]);
        assert_eq!(ctx.scope(), scope());
        ctx.set_return(ctx.this());
        assert_eq!(ctx.into_return(), Value::Object(ObjectHandle::new(1, 0)));

        let mut host = FlatHost::default();
        let mut ctx = CallContext::new(&mut host, scope(), &[]);
        ctx.set_return_slot(Value::Bool(true));
        assert_eq!(ctx.into_return(), Value::Bool(true));
    }
}
