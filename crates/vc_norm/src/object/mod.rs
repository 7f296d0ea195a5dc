//! Live objects: the [`Object`] trait, shared [`ObjectRef`] handles and
//! the built-in object kinds.
//!
//! ## Menu
//!
//! - [`Object`]: a class instance with named fields.
//! - [`ObjectRef`]: a shared, lockable handle to an object, with an identity.
//! - [`DynamicObject`]: slot-based object of a declared class, or `stdClass`.
//! - [`ArrayObject`]: a [`Traversable`] collection object.
//! - [`DateTimeObject`]: a date-time object.
//! - [`impl_object!`](crate::impl_object): implements [`Object`] and
//!   [`Class`](crate::class::Class) for plain structs.

// -----------------------------------------------------------------------------
// Modules

mod array;
mod date_time;
mod dynamic;
mod macros;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayObject;
pub use date_time::DateTimeObject;
pub use dynamic::DynamicObject;

// -----------------------------------------------------------------------------
// Object

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::value::Value;

/// Failure of an object-level field access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    #[error("Undefined property {class}::{field}")]
    Undefined { class: String, field: String },

    #[error("Typed property {class}::{field} must not be accessed before initialization")]
    Uninitialized { class: String, field: String },

    #[error("Cannot access non-public property {class}::{field}")]
    Inaccessible { class: String, field: String },

    #[error("Cannot modify readonly property {class}::{field}")]
    ReadOnly { class: String, field: String },

    #[error("Cannot assign {found} to property {class}::{field} of type {expected}")]
    TypeMismatch {
        class: String,
        field: String,
        expected: String,
        found: &'static str,
    },
}

/// An instance of a class.
///
/// `field`/`set_field` follow the visibility rules of the class,
/// `field_raw`/`set_field_raw` bypass them.
pub trait Object: Any + Send + Sync {
    /// The fully qualified class name.
    fn class_name(&self) -> &str;

    fn field(&self, name: &str) -> Result<Value, FieldError>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError>;

    #[inline]
    fn field_raw(&self, name: &str) -> Result<Value, FieldError> {
        self.field(name)
    }

    #[inline]
    fn set_field_raw(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        self.set_field(name, value)
    }

    /// The initialized public fields, in declaration order.
    fn public_fields(&self) -> Vec<(String, Value)>;

    /// Structural equality with another object.
    fn object_eq(&self, other: &dyn Object) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    #[inline]
    fn as_traversable(&self) -> Option<&dyn Traversable> {
        None
    }

    #[inline]
    fn as_traversable_mut(&mut self) -> Option<&mut dyn Traversable> {
        None
    }
}

/// An object that can be iterated like a collection.
pub trait Traversable {
    /// The contained items, as a [`Value::List`] or a [`Value::Map`].
    fn items(&self) -> Value;

    /// Sets the item at `key`, or appends it when `key` is `None`.
    fn offset_set(&mut self, key: Option<String>, value: Value);
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared handle to an [`Object`].
///
/// Cloning the handle shares the object. Two handles are equal when they
/// point to the same object or when the objects are structurally equal.
///
/// # Examples
///
/// ```
/// use vc_norm::object::{DynamicObject, ObjectRef};
/// use vc_norm::value::Value;
///
/// let object = DynamicObject::std().with("id", 1).into_ref();
/// let alias = object.clone();
///
/// alias.write().set_field("id", Value::from(2)).unwrap();
///
/// assert_eq!(object.read().field("id").unwrap(), Value::from(2));
/// assert_eq!(object.identity(), alias.identity());
/// ```
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn Object>>);

impl ObjectRef {
    #[inline]
    pub fn new<T: Object>(object: T) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Takes a read lock on the object.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Object> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the object.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Object> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// An identifier unique among live objects.
    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The class name of the object.
    #[inline]
    pub fn class_name(&self) -> String {
        self.read().class_name().into()
    }

    /// Runs `f` on the object if it is a `T`.
    pub fn with<T: Object, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        guard.as_any().downcast_ref::<T>().map(f)
    }

    /// Runs `f` on the object if it is a `T`, with mutable access.
    pub fn with_mut<T: Object, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write();
        guard.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let this = self.read();
        let that = other.read();
        this.object_eq(&*that)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:x}", self.class_name(), self.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_follows_the_allocation() {
        let a = DynamicObject::std().into_ref();
        let b = DynamicObject::std().into_ref();
        assert_eq!(a.identity(), a.clone().identity());
        assert_ne!(a.identity(), b.identity());
        // structurally equal, distinct identities
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn downcast_helpers() {
        let object = ArrayObject::new().into_ref();
        assert_eq!(object.with(|a: &ArrayObject| a.len()), Some(0));
        assert_eq!(object.with(|_: &DynamicObject| ()), None);
        object.with_mut(|a: &mut ArrayObject| a.push(Value::from(1)));
        assert_eq!(object.with(|a: &ArrayObject| a.len()), Some(1));
    }
}
