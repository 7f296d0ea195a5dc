use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use chrono::{DateTime, FixedOffset};

use super::{FieldError, Object, ObjectRef};
use crate::class::names;
use crate::value::Value;

/// A point in time with a fixed UTC offset.
///
/// The class name tells mutable (`DateTime`) and immutable
/// (`DateTimeImmutable`) instances apart, both share this representation.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeObject {
    class: String,
    value: DateTime<FixedOffset>,
}

impl DateTimeObject {
    /// A `DateTime` instance.
    #[inline]
    pub fn new(value: DateTime<FixedOffset>) -> Self {
        Self::with_class(names::DATE_TIME, value)
    }

    /// A `DateTimeImmutable` instance.
    #[inline]
    pub fn immutable(value: DateTime<FixedOffset>) -> Self {
        Self::with_class(names::DATE_TIME_IMMUTABLE, value)
    }

    #[inline]
    pub fn with_class(class: impl Into<String>, value: DateTime<FixedOffset>) -> Self {
        Self {
            class: class.into(),
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> DateTime<FixedOffset> {
        self.value
    }

    #[inline]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }
}

impl Object for DateTimeObject {
    #[inline]
    fn class_name(&self) -> &str {
        &self.class
    }

    fn field(&self, name: &str) -> Result<Value, FieldError> {
        Err(FieldError::Undefined {
            class: self.class.clone(),
            field: name.into(),
        })
    }

    fn set_field(&mut self, name: &str, _value: Value) -> Result<(), FieldError> {
        Err(FieldError::Undefined {
            class: self.class.clone(),
            field: name.into(),
        })
    }

    #[inline]
    fn public_fields(&self) -> Vec<(String, Value)> {
        Vec::new()
    }

    fn object_eq(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<DateTimeObject>()
            .is_some_and(|other| self.class == other.class && self.value == other.value)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
