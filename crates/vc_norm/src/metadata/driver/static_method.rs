use alloc::string::String;
use alloc::sync::Arc;

use super::Driver;
use crate::Error;
use crate::accessor::AccessorConfig;
use crate::class::ClassInfo;
use crate::metadata::{ClassMetadata, ClassMetadataBuilder};

/// Loads metadata from a static loader of the class.
///
/// The loader, registered with [`ClassInfo::with_static`], receives a fresh
/// [`ClassMetadataBuilder`]. Interfaces and classes without the loader
/// are left to the next driver.
#[derive(Debug, Clone)]
pub struct StaticMethodDriver {
    method: String,
    config: AccessorConfig,
}

impl Default for StaticMethodDriver {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT_METHOD, AccessorConfig::default())
    }
}

impl StaticMethodDriver {
    pub const DEFAULT_METHOD: &'static str = "load_serializer_metadata";

    #[inline]
    pub fn new(method: impl Into<String>, config: AccessorConfig) -> Self {
        Self {
            method: method.into(),
            config,
        }
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Driver for StaticMethodDriver {
    fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Option<ClassMetadata>, Error> {
        if class.is_interface() {
            return Ok(None);
        }
        let Some(loader) = class.static_method(&self.method) else {
            return Ok(None);
        };

        let mut builder = ClassMetadataBuilder::new(class.clone(), self.config);
        loader(&mut builder);
        builder.build().map(Some)
    }
}
