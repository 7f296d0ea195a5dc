#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// `impl_object!` and `impl_auto_register!` expand to `vc_norm::...` paths,
// which must also resolve inside this crate's own tests.
extern crate self as vc_norm;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod accessor;
pub mod class;
pub mod context;
pub mod metadata;
pub mod normalizer;
pub mod object;
pub mod serializer;
pub mod types;
pub mod value;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::Error;
pub use serializer::{Format, Payload, Serializer, SerializerBuilder};

/// The commonly used items.
pub mod prelude {
    pub use crate::Error;
    pub use crate::class::{Class, ClassInfo, ClassRegistry, ClassRegistryArc, FieldInfo};
    pub use crate::context::{DenormalizationContext, NormalizationContext};
    pub use crate::metadata::{ClassMetadata, ClassMetadataBuilder, PropertyMetadata};
    pub use crate::object::{DynamicObject, Object, ObjectRef};
    pub use crate::serializer::{Format, Payload, Serializer, SerializerBuilder};
    pub use crate::types::Type;
    pub use crate::value::{FromValue, IntoValue, Options, Value};
}
