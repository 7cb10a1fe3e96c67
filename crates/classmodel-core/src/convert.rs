//! Conversion traits for argument extraction and return value handling.
//!
//! - [`FromValue`]: Extract a Rust value from a [`Value`]
//! - [`IntoValue`]: Convert a Rust value into a [`Value`]
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `usize`
//! - Floats: `f32`, `f64`
//! - `bool`, `String` (and `&str` / `&String` for [`IntoValue`])
//! - [`ObjectHandle`], [`Value`] itself, and `()` (null)
//!
//! Every [`IntoValue`] type also converts with `From`/`Into`, so APIs taking
//! `impl Into<Value>` accept the same set.
//!
//! ```
//! use classmodel_core::{FromValue, IntoValue, Value};
//!
//! let value = 42i32.into_value();
//! assert_eq!(value, Value::Int(42));
//! assert_eq!(i32::from_value(&value).unwrap(), 42);
//! ```

use crate::{ConversionError, ObjectHandle, Value};

/// Extract a value from a [`Value`].
pub trait FromValue: Sized {
    /// Returns a `ConversionError` if the value holds an incompatible variant.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(mismatch("int", value)),
                    }
                }
            }

            impl IntoValue for $ty {
                // Only `usize` can exceed `i64`; it saturates
                #[allow(clippy::unnecessary_fallible_conversions)]
                fn into_value(self) -> Value {
                    Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.into_value()
                }
            }
        )*
    };
}

impl_value_int!(i8, i16, i32, i64, u8, u16, u32, usize);

// ============================================================================
// Float implementations
// ============================================================================

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(mismatch("float", value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

macro_rules! impl_value_into {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    let $v = self;
                    $body
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.into_value()
                }
            }
        )*
    };
}

impl_value_into! {
    f64 => |v| Value::Float(v),
    f32 => |v| Value::Float(v as f64),
    bool => |v| Value::Bool(v),
    String => |v| Value::String(v),
    &str => |v| Value::String(v.to_string()),
    &String => |v| Value::String(v.clone()),
    ObjectHandle => |v| Value::Object(v),
    () => |_v| Value::Null,
}

// ============================================================================
// Other implementations
// ============================================================================

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", value)),
        }
    }
}

impl FromValue for ObjectHandle {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Object(handle) => Ok(*handle),
            _ => Err(mismatch("object", value)),
        }
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(()),
            _ => Err(mismatch("null", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map(IntoValue::into_value).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_integers() {
        assert_eq!(i8::from_value(&Value::Int(127)).unwrap(), 127);
        assert_eq!(i8::from_value(&Value::Int(-128)).unwrap(), -128);
        assert!(matches!(
            i8::from_value(&Value::Int(128)),
            Err(ConversionError::IntegerOverflow {
                value: 128,
                target_type: "i8"
            })
        ));
        assert!(u32::from_value(&Value::Int(-1)).is_err());
        assert_eq!(usize::from_value(&Value::Int(7)).unwrap(), 7);
    }

    #[test]
    fn oversized_usize_saturates() {
        assert_eq!(usize::MAX.into_value(), Value::Int(i64::MAX));
        assert_eq!(Value::from(7usize), Value::Int(7));
        assert_eq!(i8::MIN.into_value(), Value::Int(-128));
    }

    #[test]
    fn integer_type_mismatch() {
        let err = i64::from_value(&Value::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "int",
                actual: "bool"
            }
        );
    }

    #[test]
    fn floats_accept_ints() {
        assert_eq!(f64::from_value(&Value::Int(2)).unwrap(), 2.0);
        assert_eq!(f32::from_value(&Value::Float(1.5)).unwrap(), 1.5);
        assert!(f64::from_value(&Value::String("1".into())).is_err());
    }

    #[test]
    fn strings() {
        assert_eq!(Value::from("foo"), Value::String("foo".into()));
        assert_eq!(
            String::from_value(&Value::String("bar".into())).unwrap(),
            "bar"
        );
        assert!(String::from_value(&Value::Int(1)).is_err());
    }

    #[test]
    fn unit_and_option() {
        assert_eq!(().into_value(), Value::Null);
        assert_eq!(<()>::from_value(&Value::Null), Ok(()));
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::Int(3)).unwrap(), Some(3));
        assert_eq!(Some(true).into_value(), Value::Bool(true));
        assert_eq!(None::<bool>.into_value(), Value::Null);
    }

    #[test]
    fn handles() {
        let handle = ObjectHandle::new(2, 5);
        assert_eq!(Value::from(handle), Value::Object(handle));
        assert_eq!(ObjectHandle::from_value(&Value::Object(handle)).unwrap(), handle);
        assert!(ObjectHandle::from_value(&Value::Null).is_err());
    }
}
