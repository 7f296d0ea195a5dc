use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use vc_utils::IndexMap;

use super::Value;
use crate::object::ObjectRef;

// -----------------------------------------------------------------------------
// Traits

/// Reads a Rust value as a [`Value`].
///
/// Used by [`impl_object!`](crate::impl_object) to expose struct fields.
pub trait IntoValue {
    fn to_value(&self) -> Value;
}

/// Builds a Rust value from a [`Value`].
///
/// Returns `None` when the value has the wrong kind. Conversions are strict,
/// the loose casts are applied earlier by [`Type::convert`](crate::types::Type::convert).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

/// The declared type of a field holding `Self`.
///
/// The expression uses the type-expression syntax, e.g. `int`, `string`,
/// `list<float>`. Nullability is reported separately.
pub trait TypeExpression {
    const NULLABLE: bool = false;

    fn type_expression() -> Cow<'static, str>;
}

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_int {
    ($($ty:ty),*) => {$(
        impl IntoValue for $ty {
            #[inline]
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }
        }

        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(i) => <$ty>::try_from(i).ok(),
                    _ => None,
                }
            }
        }

        impl TypeExpression for $ty {
            #[inline]
            fn type_expression() -> Cow<'static, str> {
                Cow::Borrowed("int")
            }
        }
    )*};
}

impl_int!(i8, i16, i32, i64, u8, u16, u32, usize);

macro_rules! impl_float {
    ($($ty:ty),*) => {$(
        impl IntoValue for $ty {
            #[inline]
            fn to_value(&self) -> Value {
                Value::Float(*self as f64)
            }
        }

        impl FromValue for $ty {
            #[inline]
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Float(f) => Some(f as $ty),
                    Value::Int(i) => Some(i as $ty),
                    _ => None,
                }
            }
        }

        impl TypeExpression for $ty {
            #[inline]
            fn type_expression() -> Cow<'static, str> {
                Cow::Borrowed("float")
            }
        }
    )*};
}

impl_float!(f32, f64);

impl IntoValue for bool {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl TypeExpression for bool {
    #[inline]
    fn type_expression() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }
}

impl IntoValue for String {
    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl TypeExpression for String {
    #[inline]
    fn type_expression() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }
}

// -----------------------------------------------------------------------------
// Dynamic

impl IntoValue for Value {
    #[inline]
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl TypeExpression for Value {
    #[inline]
    fn type_expression() -> Cow<'static, str> {
        Cow::Borrowed("mixed")
    }
}

impl IntoValue for ObjectRef {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl FromValue for ObjectRef {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        value.into_object()
    }
}

impl TypeExpression for ObjectRef {
    #[inline]
    fn type_expression() -> Cow<'static, str> {
        Cow::Borrowed("mixed")
    }
}

// -----------------------------------------------------------------------------
// Containers

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: TypeExpression> TypeExpression for Option<T> {
    const NULLABLE: bool = true;

    #[inline]
    fn type_expression() -> Cow<'static, str> {
        T::type_expression()
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(IntoValue::to_value).collect())
    }
}

/// Accepts lists and the values of maps.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(list) => list.into_iter().map(T::from_value).collect(),
            Value::Map(map) => map.into_values().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: TypeExpression> TypeExpression for Vec<T> {
    fn type_expression() -> Cow<'static, str> {
        Cow::Owned(format!("list<{}>", T::type_expression()))
    }
}

impl<T: IntoValue> IntoValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            Value::List(list) if list.is_empty() => Some(IndexMap::new()),
            _ => None,
        }
    }
}

impl<T: TypeExpression> TypeExpression for IndexMap<String, T> {
    fn type_expression() -> Cow<'static, str> {
        Cow::Owned(format!("array<{}>", T::type_expression()))
    }
}
