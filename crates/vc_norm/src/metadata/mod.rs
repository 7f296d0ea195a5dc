//! Class and property metadata: the model, its builders, the drivers
//! producing it and the factory resolving it.
//!
//! ## Menu
//!
//! - [`ClassMetadata`] / [`PropertyMetadata`]: the resolved descriptions.
//! - [`ClassMetadataBuilder`] / [`PropertyMetadataBuilder`]: collect them.
//! - [`Driver`]: a metadata source, see [`StaticMethodDriver`] and
//!   [`DeclarationDriver`].
//! - [`MetadataFactory`]: resolves and memoizes metadata per class.
//! - [`MetadataCache`]: an external store, see [`MemoryCache`].

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod cache;
mod class;
mod driver;
mod factory;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{ClassMetadataBuilder, PropertyMetadataBuilder};
pub use cache::{MemoryCache, MetadataCache, cache_key};
pub use class::ClassMetadata;
pub use driver::{DeclarationDriver, Driver, StaticMethodDriver};
pub use factory::MetadataFactory;
pub use property::PropertyMetadata;
