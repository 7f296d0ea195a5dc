//! Items used by the code generated by [`impl_object!`](crate::impl_object)
//! and [`impl_auto_register!`](crate::impl_auto_register).

pub use alloc::string::String;
pub use alloc::vec::Vec;

use crate::class::{FieldInfo, Visibility};
use crate::object::FieldError;
use crate::value::{FromValue, IntoValue, TypeExpression, Value};

#[inline]
pub fn is_public(vis: &str) -> bool {
    Visibility::from_keyword(vis) == Visibility::Public
}

#[cold]
pub fn undefined(class: &str, field: &str) -> FieldError {
    FieldError::Undefined {
        class: class.into(),
        field: field.into(),
    }
}

#[cold]
pub fn inaccessible(class: &str, field: &str) -> FieldError {
    FieldError::Inaccessible {
        class: class.into(),
        field: field.into(),
    }
}

/// Converts `value` into the type of `slot` and stores it.
pub fn assign<T: FromValue + TypeExpression>(
    slot: &mut T,
    class: &str,
    field: &str,
    value: Value,
) -> Result<(), FieldError> {
    let found = value.kind_name();
    match T::from_value(value) {
        Some(value) => {
            *slot = value;
            Ok(())
        }
        None => Err(FieldError::TypeMismatch {
            class: class.into(),
            field: field.into(),
            expected: T::type_expression().into_owned(),
            found,
        }),
    }
}

pub fn field_info<T: TypeExpression + IntoValue>(
    name: &str,
    vis: &str,
    default: &T,
    declared: Option<&'static str>,
) -> FieldInfo {
    let info = FieldInfo::of_type(name, default).visibility(Visibility::from_keyword(vis));
    match declared {
        Some(declared) => info.typed(declared),
        None => info,
    }
}

// -----------------------------------------------------------------------------
// auto_register

#[cfg(feature = "auto_register")]
pub use inventory;

/// A class submitted by [`impl_auto_register!`](crate::impl_auto_register).
#[cfg(feature = "auto_register")]
pub struct AutoRegisterClass(pub fn() -> crate::class::ClassInfo);

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegisterClass);
