use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::hash::HashMap;

use super::SharedNormalizer;
use crate::Error;
use crate::class::ClassRegistryArc;

/// Resolves the normalizer of a class.
///
/// A class bound with [`associate`](Self::associate) uses its normalizer.
/// Other classes go through the registered normalizers in order, the
/// first supporting the class is bound to it.
pub struct NormalizerLoader {
    registry: ClassRegistryArc,
    normalizers: Vec<SharedNormalizer>,
    cached: RwLock<HashMap<String, SharedNormalizer>>,
}

impl NormalizerLoader {
    pub fn new(registry: ClassRegistryArc) -> Self {
        Self {
            registry,
            normalizers: Vec::new(),
            cached: RwLock::new(HashMap::default()),
        }
    }

    /// Creates a loader with `normalizers`, see [`add_normalizer`](Self::add_normalizer).
    pub fn with_normalizers(
        registry: ClassRegistryArc,
        normalizers: impl IntoIterator<Item = SharedNormalizer>,
    ) -> Self {
        let mut loader = Self::new(registry);
        for normalizer in normalizers {
            loader.add_normalizer(normalizer);
        }
        loader
    }

    #[inline]
    pub fn registry(&self) -> &ClassRegistryArc {
        &self.registry
    }

    /// Binds a normalizer to its registered classes, or appends it to the
    /// normalizers asked for unbound classes.
    pub fn add_normalizer(&mut self, normalizer: SharedNormalizer) -> &mut Self {
        let classes = normalizer.registered_classes();
        if classes.is_empty() {
            self.normalizers.push(normalizer);
            return self;
        }
        for class in classes {
            self.associate(class, normalizer.clone());
        }
        self
    }

    /// Binds `class` to `normalizer`.
    pub fn associate(&self, class: &str, normalizer: SharedNormalizer) -> &Self {
        self.cached
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(class.into(), normalizer);
        self
    }

    /// The normalizer of `class`.
    ///
    /// # Errors
    ///
    /// [`Error::NoNormalizer`] if no normalizer supports the class.
    pub fn get_normalizer(&self, class: &str) -> Result<SharedNormalizer, Error> {
        let cached = self
            .cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class)
            .cloned();
        if let Some(normalizer) = cached {
            return Ok(normalizer);
        }

        let found = {
            let registry = self.registry.read();
            self.normalizers
                .iter()
                .find(|normalizer| normalizer.supports(class, &registry))
                .cloned()
        };
        let normalizer = found.ok_or_else(|| Error::no_normalizer(class))?;

        log::debug!("Normalizer {normalizer:?} resolved for the class \"{class}\"");
        self.associate(class, normalizer.clone());
        Ok(normalizer)
    }
}

impl fmt::Debug for NormalizerLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizerLoader")
            .field("normalizers", &self.normalizers)
            .finish_non_exhaustive()
    }
}
