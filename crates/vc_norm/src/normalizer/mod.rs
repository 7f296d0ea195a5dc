//! Normalization strategies and their dispatch.
//!
//! ## Menu
//!
//! - [`Normalizer`]: converts objects of the classes it supports.
//! - [`NormalizerLoader`]: resolves and caches the normalizer of a class.
//! - [`PropertyNormalizer`]: metadata driven, for declared classes.
//! - [`ObjectNormalizer`]: `stdClass` objects.
//! - [`TraversableNormalizer`]: collection objects.
//! - [`DateTimeNormalizer`]: date objects.

// -----------------------------------------------------------------------------
// Modules

mod date_time;
mod loader;
mod object;
mod property;
mod traversable;

// -----------------------------------------------------------------------------
// Exports

pub use date_time::DateTimeNormalizer;
pub use loader::NormalizerLoader;
pub use object::ObjectNormalizer;
pub use property::PropertyNormalizer;
pub use traversable::TraversableNormalizer;

// -----------------------------------------------------------------------------
// Normalizer

use alloc::sync::Arc;
use core::fmt;

use crate::Error;
use crate::class::ClassRegistry;
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::object::ObjectRef;
use crate::types::Type;
use crate::value::Value;

/// A shared normalizer.
pub type SharedNormalizer = Arc<dyn Normalizer>;

/// Converts objects to structural values and back.
///
/// Nested values go back through the serializer, reachable with
/// `context.root()`.
pub trait Normalizer: fmt::Debug + Send + Sync {
    fn normalize(&self, object: &ObjectRef, context: &NormalizationContext<'_>) -> Result<Value, Error>;

    /// Denormalizes `data` into an object of type `ty`, or into `target`
    /// when given.
    fn denormalize(
        &self,
        data: Value,
        ty: &Type,
        target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error>;

    fn supports(&self, class: &str, registry: &ClassRegistry) -> bool;

    /// Classes bound to this normalizer when it is added to a loader.
    ///
    /// A normalizer returning classes is never asked if it
    /// [`supports`](Normalizer::supports) other ones.
    #[inline]
    fn registered_classes(&self) -> &[&'static str] {
        &[]
    }
}
