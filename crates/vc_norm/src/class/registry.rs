use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use vc_utils::hash::HashMap;

use super::{Class, ClassInfo, names};
use crate::Error;
use crate::object::{ArrayObject, DateTimeObject, ObjectRef};

// -----------------------------------------------------------------------------
// ClassRegistry

/// A registry of class descriptors, keyed by class name.
///
/// # Examples
///
/// ```
/// use vc_norm::class::{ClassInfo, ClassRegistry, FieldInfo};
///
/// let mut registry = ClassRegistry::new();
/// registry.register_info(ClassInfo::new("App\\Tag").with_field(FieldInfo::new("name").public()));
///
/// assert!(registry.is_a("ArrayObject", "Traversable"));
///
/// let tag = registry.instantiate("App\\Tag").unwrap();
/// assert_eq!(tag.class_name(), "App\\Tag");
/// assert!(registry.instantiate("App\\Missing").is_err());
/// ```
pub struct ClassRegistry {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl Default for ClassRegistry {
    /// See [`ClassRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create an empty [`ClassRegistry`].
    #[inline]
    pub fn empty() -> Self {
        Self {
            classes: HashMap::default(),
        }
    }

    /// Create a registry with the built-in classes.
    ///
    /// - `stdClass`
    /// - `Traversable`, `ArrayObject`
    /// - `DateTimeInterface`, `DateTime`, `DateTimeImmutable`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_info(ClassInfo::new(names::STD_CLASS));
        registry.register_info(ClassInfo::interface(names::TRAVERSABLE));
        registry.register_info(
            ClassInfo::new(names::ARRAY_OBJECT)
                .implements(names::TRAVERSABLE)
                .with_constructor(|| ArrayObject::new().into_ref()),
        );
        registry.register_info(ClassInfo::interface(names::DATE_TIME_INTERFACE));
        for name in [names::DATE_TIME, names::DATE_TIME_IMMUTABLE] {
            registry.register_info(
                ClassInfo::new(name)
                    .implements(names::DATE_TIME_INTERFACE)
                    .with_constructor(move || {
                        let epoch = DateTime::<Utc>::default().fixed_offset();
                        DateTimeObject::with_class(name, epoch).into_ref()
                    }),
            );
        }
        registry
    }

    /// Registers `T`, replacing a class of the same name.
    #[inline]
    pub fn register<T: Class>(&mut self) {
        self.register_info(T::class_info());
    }

    /// Registers a class descriptor and the parents it declares.
    pub fn register_info(&mut self, info: impl Into<Arc<ClassInfo>>) {
        let info: Arc<ClassInfo> = info.into();
        let mut parent = info.parent().cloned();
        while let Some(class) = parent {
            parent = class.parent().cloned();
            if !self.classes.contains_key(class.name()) {
                self.classes.insert(class.name().into(), class);
            }
        }
        log::trace!("register class \"{}\"", info.name());
        self.classes.insert(info.name().into(), info);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        self.classes.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns `true` if `class` is registered and is, extends or implements `parent`.
    pub fn is_a(&self, class: &str, parent: &str) -> bool {
        self.get(class).is_some_and(|info| info.is_a(parent))
    }

    /// Creates an instance of a registered class.
    pub fn instantiate(&self, name: &str) -> Result<ObjectRef, Error> {
        self.get(name)
            .and_then(ClassInfo::instantiate)
            .ok_or_else(|| Error::Instantiation { class: name.into() })
    }

    /// Registers every class submitted with [`impl_auto_register!`](crate::impl_auto_register).
    ///
    /// Returns `false` when the `auto_register` feature is disabled.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for class in inventory::iter::<crate::__macro_exports::AutoRegisterClass> {
                self.register_info((class.0)());
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.classes.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// ClassRegistryArc

#[derive(Clone, Default)]
pub struct ClassRegistryArc {
    /// The wrapped [`ClassRegistry`].
    pub internal: Arc<RwLock<ClassRegistry>>,
}

impl ClassRegistryArc {
    #[inline]
    pub fn new(registry: ClassRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`ClassRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, ClassRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ClassRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, ClassRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up a class, cloning the descriptor handle out of the lock.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.read().get(name).cloned()
    }
}

impl fmt::Debug for ClassRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::FieldInfo;

    #[test]
    fn builtins() {
        let registry = ClassRegistry::new();
        assert!(registry.contains("stdClass"));
        assert!(registry.is_a("DateTimeImmutable", "DateTimeInterface"));
        assert!(!registry.is_a("stdClass", "Traversable"));
        assert!(registry.instantiate("Traversable").is_err());

        let array = registry.instantiate("ArrayObject").unwrap();
        assert!(array.read().as_traversable().is_some());
        assert_eq!(registry.instantiate("DateTime").unwrap().class_name(), "DateTime");
    }

    #[test]
    fn parents_are_registered() {
        let mut registry = ClassRegistry::empty();
        let base = ClassInfo::new("Base").with_field(FieldInfo::new("id"));
        registry.register_info(ClassInfo::new("Child").extends(base));
        assert!(registry.contains("Base"));
        assert!(registry.is_a("Child", "Base"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn shared_registry() {
        let shared = ClassRegistryArc::new(ClassRegistry::empty());
        shared.write().register_info(ClassInfo::new("A"));
        assert!(shared.clone().get("A").is_some());
    }
}
