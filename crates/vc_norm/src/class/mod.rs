//! Class descriptors and the class registry.
//!
//! A [`ClassInfo`] describes a class the way the serializer sees it: name,
//! parent, interfaces, fields with their declared types, and the methods
//! accessors and hooks can call. The [`ClassRegistry`] maps class names to
//! descriptors and instantiates classes by name during denormalization.

// -----------------------------------------------------------------------------
// Modules

mod info;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use info::{
    ClassInfo, ClassKind, ConstructorFn, FieldInfo, HookFn, LoaderFn, MethodBody, MethodInfo,
    ReadFn, Visibility, WriteFn,
};
pub use registry::{ClassRegistry, ClassRegistryArc};

/// A Rust type describing itself as a class.
///
/// Usually implemented through [`impl_object!`](crate::impl_object).
pub trait Class {
    fn class_info() -> ClassInfo;
}

/// Names of the built-in classes.
pub mod names {
    pub const STD_CLASS: &str = "stdClass";
    pub const TRAVERSABLE: &str = "Traversable";
    pub const ARRAY_OBJECT: &str = "ArrayObject";
    pub const DATE_TIME_INTERFACE: &str = "DateTimeInterface";
    pub const DATE_TIME: &str = "DateTime";
    pub const DATE_TIME_IMMUTABLE: &str = "DateTimeImmutable";
}
