use alloc::string::String;
use core::fmt;

use vc_utils::IndexMap;
use vc_utils::hash::HashMap;

use super::PropertyMetadata;
use crate::class::HookFn;
use crate::object::Object;

/// The resolved description of a class.
///
/// Properties keep their declaration order. The alias map resolves
/// serialized names to property names.
#[derive(Clone)]
pub struct ClassMetadata {
    name: String,
    properties: IndexMap<String, PropertyMetadata>,
    aliases: HashMap<String, String>,
    post_denormalization: Option<HookFn>,
}

impl ClassMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            aliases: HashMap::default(),
            post_denormalization: None,
        }
    }

    /// Adds a property and registers its alias.
    pub fn with_property(mut self, property: PropertyMetadata) -> Self {
        self.aliases
            .insert(property.alias.clone(), property.name.clone());
        self.properties.insert(property.name.clone(), property);
        self
    }

    /// Sets the hook called at the end of denormalization.
    #[inline]
    pub fn with_post_denormalization(mut self, hook: HookFn) -> Self {
        self.post_denormalization = Some(hook);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The properties, in declaration order.
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = &PropertyMetadata> {
        self.properties.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by name, then by alias.
    ///
    /// An alias resolves once: the name it points to must be a property.
    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        if let Some(property) = self.properties.get(name) {
            return Some(property);
        }
        let target = self.aliases.get(name)?;
        self.properties.get(target.as_str())
    }

    #[inline]
    pub fn has_post_denormalization(&self) -> bool {
        self.post_denormalization.is_some()
    }

    /// Runs the post denormalization hook, if any.
    pub fn post_denormalization(&self, object: &mut dyn Object) {
        if let Some(hook) = &self.post_denormalization {
            hook(object);
        }
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("aliases", &self.aliases)
            .field("post_denormalization", &self.post_denormalization.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;

    use crate::object::DynamicObject;
    use crate::value::Value;

    fn metadata() -> ClassMetadata {
        let mut id = PropertyMetadata::new("User", "id");
        id.alias = "identifier".into();
        let mut name = PropertyMetadata::new("User", "name");
        // Aliased to another property's name: direct names win.
        name.alias = "id".into();

        ClassMetadata::new("User").with_property(id).with_property(name)
    }

    #[test]
    fn lookup_by_name_then_alias() {
        let metadata = metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.property("id").unwrap().name, "id");
        assert_eq!(metadata.property("identifier").unwrap().name, "id");
        assert_eq!(metadata.property("name").unwrap().name, "name");
        assert!(metadata.property("missing").is_none());

        let names: Vec<_> = metadata.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "name"]);
    }

    #[test]
    fn dangling_alias_is_not_found() {
        let mut metadata = ClassMetadata::new("User");
        metadata.aliases.insert("a".into(), "b".into());
        metadata.aliases.insert("b".into(), "a".into());
        assert!(metadata.property("a").is_none());
    }

    #[test]
    fn post_denormalization_hook() {
        let metadata = ClassMetadata::new("stdClass").with_post_denormalization(Arc::new(
            |object: &mut dyn Object| {
                let _ = object.set_field("woken", Value::Bool(true));
            },
        ));
        assert!(metadata.has_post_denormalization());

        let mut object = DynamicObject::std();
        metadata.post_denormalization(&mut object);
        assert_eq!(object.field("woken").unwrap(), Value::Bool(true));
    }
}
