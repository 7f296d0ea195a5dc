use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use std::sync::OnceLock;

use vc_utils::IndexMap;

use super::{FieldError, Object, ObjectRef};
use crate::class::{ClassInfo, FieldInfo, names};
use crate::value::Value;

/// A slot-based instance of a declared class.
///
/// Every declared field gets a slot on instantiation. Undeclared fields
/// can be added at runtime and are public, as on `stdClass`.
///
/// A typed field without default starts uninitialized: reading it fails
/// until it has been written.
#[derive(Debug, Clone)]
pub struct DynamicObject {
    class: Arc<ClassInfo>,
    slots: IndexMap<String, Option<Value>>,
}

fn std_class() -> &'static Arc<ClassInfo> {
    static STD_CLASS: OnceLock<Arc<ClassInfo>> = OnceLock::new();
    STD_CLASS.get_or_init(|| Arc::new(ClassInfo::new(names::STD_CLASS)))
}

impl DynamicObject {
    /// An empty `stdClass` object.
    #[inline]
    pub fn std() -> Self {
        Self::instantiate(std_class().clone())
    }

    /// A fresh instance of `class`, with declared defaults applied.
    pub fn instantiate(class: Arc<ClassInfo>) -> Self {
        let mut slots = IndexMap::new();
        for field in class.all_fields() {
            slots.insert(field.name.clone(), field.initial_value());
        }
        Self { class, slots }
    }

    /// Sets a slot without any check.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slots.insert(name.into(), Some(value.into()));
        self
    }

    #[inline]
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    #[inline]
    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    fn declared(&self, name: &str) -> Option<&FieldInfo> {
        self.class.find_field(name)
    }

    fn read_slot(&self, name: &str) -> Result<Value, FieldError> {
        match self.slots.get(name) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(FieldError::Uninitialized {
                class: self.class.name().into(),
                field: name.into(),
            }),
            None => Err(FieldError::Undefined {
                class: self.class.name().into(),
                field: name.into(),
            }),
        }
    }

    fn check_type(&self, field: &FieldInfo, value: &Value) -> Result<(), FieldError> {
        if field.accepts(value) {
            return Ok(());
        }
        Err(FieldError::TypeMismatch {
            class: self.class.name().into(),
            field: field.name.clone(),
            expected: field.declared.clone().unwrap_or_default(),
            found: value.kind_name(),
        })
    }

    fn inaccessible(&self, name: &str) -> FieldError {
        FieldError::Inaccessible {
            class: self.class.name().into(),
            field: name.into(),
        }
    }
}

impl Object for DynamicObject {
    #[inline]
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn field(&self, name: &str) -> Result<Value, FieldError> {
        if self.declared(name).is_some_and(|field| !field.is_public()) {
            return Err(self.inaccessible(name));
        }
        self.read_slot(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        let Some(field) = self.declared(name) else {
            self.slots.insert(name.into(), Some(value));
            return Ok(());
        };
        if !field.is_public() {
            return Err(self.inaccessible(name));
        }
        if field.readonly {
            return Err(FieldError::ReadOnly {
                class: self.class.name().into(),
                field: name.into(),
            });
        }
        self.check_type(field, &value)?;
        self.slots.insert(name.into(), Some(value));
        Ok(())
    }

    #[inline]
    fn field_raw(&self, name: &str) -> Result<Value, FieldError> {
        self.read_slot(name)
    }

    fn set_field_raw(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        if let Some(field) = self.declared(name) {
            if field.readonly && matches!(self.slots.get(name), Some(Some(_))) {
                return Err(FieldError::ReadOnly {
                    class: self.class.name().into(),
                    field: name.into(),
                });
            }
            self.check_type(field, &value)?;
        }
        self.slots.insert(name.into(), Some(value));
        Ok(())
    }

    fn public_fields(&self) -> Vec<(String, Value)> {
        self.slots
            .iter()
            .filter(|(name, _)| self.declared(name).is_none_or(FieldInfo::is_public))
            .filter_map(|(name, slot)| slot.as_ref().map(|value| (name.clone(), value.clone())))
            .collect()
    }

    fn object_eq(&self, other: &dyn Object) -> bool {
        other
            .as_any()
            .downcast_ref::<DynamicObject>()
            .is_some_and(|other| {
                self.class.name() == other.class.name() && self.slots == other.slots
            })
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
