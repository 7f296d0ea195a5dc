//! Metadata sources.

mod declaration;
mod static_method;

pub use declaration::DeclarationDriver;
pub use static_method::StaticMethodDriver;

use alloc::sync::Arc;
use core::fmt;

use super::ClassMetadata;
use crate::Error;
use crate::class::ClassInfo;

/// A source of class metadata.
///
/// Drivers are tried in order by the
/// [`MetadataFactory`](super::MetadataFactory), the first one returning
/// `Some` wins. A driver walks the class hierarchy itself when it needs to.
pub trait Driver: fmt::Debug + Send + Sync {
    fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Option<ClassMetadata>, Error>;
}
