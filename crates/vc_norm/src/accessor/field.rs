use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use super::{AccessorError, PropertyAccessor};
use crate::class::{ReadFn, WriteFn};
use crate::object::{FieldError, Object};
use crate::value::Value;

// -----------------------------------------------------------------------------
// PublicAccessor

/// Accesses a public field.
///
/// Reading a field the object does not have gives `null`.
#[derive(Debug, Clone)]
pub struct PublicAccessor {
    property: String,
}

impl PublicAccessor {
    #[inline]
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl PropertyAccessor for PublicAccessor {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        match object.field(&self.property) {
            Ok(value) => Ok(value),
            Err(FieldError::Undefined { .. }) => Ok(Value::Null),
            Err(err) => Err(AccessorError::field(object.class_name(), &self.property, err)),
        }
    }

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        object
            .set_field(&self.property, value)
            .map_err(|err| AccessorError::field(object.class_name(), &self.property, err))
    }
}

// -----------------------------------------------------------------------------
// ReflectionAccessor

/// Accesses a field regardless of its visibility.
#[derive(Debug, Clone)]
pub struct ReflectionAccessor {
    class: String,
    property: String,
}

impl ReflectionAccessor {
    #[inline]
    pub fn new(class: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            property: property.into(),
        }
    }
}

impl PropertyAccessor for ReflectionAccessor {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        object
            .field_raw(&self.property)
            .map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        object
            .set_field_raw(&self.property, value)
            .map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }
}

// -----------------------------------------------------------------------------
// ClosureAccessor

/// Accesses a field regardless of its visibility, through closures created
/// once for the property.
#[derive(Clone)]
pub struct ClosureAccessor {
    class: String,
    property: String,
    reader: ReadFn,
    writer: WriteFn,
}

impl ClosureAccessor {
    pub fn new(class: impl Into<String>, property: impl Into<String>) -> Self {
        let property: String = property.into();
        let name = property.clone();
        let reader: ReadFn = Arc::new(move |object: &dyn Object| object.field_raw(&name));
        let name = property.clone();
        let writer: WriteFn = Arc::new(move |object: &mut dyn Object, value| {
            object.set_field_raw(&name, value)
        });
        Self {
            class: class.into(),
            property,
            reader,
            writer,
        }
    }
}

impl PropertyAccessor for ClosureAccessor {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        (self.reader)(object).map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        (self.writer)(object, value)
            .map_err(|err| AccessorError::field(&self.class, &self.property, err))
    }
}

impl fmt::Debug for ClosureAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureAccessor")
            .field("class", &self.class)
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}
