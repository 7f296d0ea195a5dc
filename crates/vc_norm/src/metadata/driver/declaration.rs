use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::sync::Arc;

use vc_utils::IndexMap;
use vc_utils::hash::HashMap;

use super::Driver;
use crate::Error;
use crate::accessor::AccessorConfig;
use crate::class::{ClassInfo, FieldInfo, names};
use crate::metadata::{ClassMetadata, ClassMetadataBuilder};
use crate::types::Type;
use crate::types::parser::{self, Intersection};
use crate::value::Options;

/// The attributes collected for one field across the hierarchy.
#[derive(Debug, Default)]
struct Declaration {
    ty: Option<String>,
    since: Option<String>,
    until: Option<String>,
    ignore: bool,
}

impl Declaration {
    /// Completes the attributes of a child with the ones of its parent.
    fn inherit(&mut self, parent: Declaration) {
        if self.ty.is_none() {
            self.ty = parent.ty;
        }
        if self.since.is_none() {
            self.since = parent.since;
        }
        if self.until.is_none() {
            self.until = parent.until;
        }
    }
}

/// Builds metadata from the field declarations of the class and its
/// parents.
///
/// Types come from the `var` attribute, then from the declared type, and
/// go through an alias table (`int` is `integer`, `object` is `stdClass`,
/// templates are `mixed`...). Fields marked `ignore` are skipped, a
/// `__wakeup` hook becomes the post denormalization hook. Interfaces and
/// abstract classes are left to the next driver.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_norm::class::{ClassInfo, FieldInfo};
/// use vc_norm::metadata::{DeclarationDriver, Driver};
///
/// let class = Arc::new(
///     ClassInfo::new("User")
///         .with_field(FieldInfo::new("id").typed("int"))
///         .with_field(FieldInfo::new("tags").var("string[]"))
///         .with_field(FieldInfo::new("password").ignore()),
/// );
///
/// let metadata = DeclarationDriver::default()
///     .get_metadata_for_class(&class)
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(metadata.property("id").unwrap().ty.name(), "integer");
/// assert!(metadata.property("tags").unwrap().ty.is_collection());
/// assert!(metadata.property("password").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DeclarationDriver {
    type_mapping: HashMap<String, String>,
    config: AccessorConfig,
}

impl Default for DeclarationDriver {
    #[inline]
    fn default() -> Self {
        Self::new(AccessorConfig::default())
    }
}

impl DeclarationDriver {
    const HOOK: &'static str = "__wakeup";

    pub fn new(config: AccessorConfig) -> Self {
        let type_mapping = [
            ("bool", Type::BOOLEAN),
            ("false", Type::BOOLEAN),
            ("true", Type::BOOLEAN),
            ("int", Type::INTEGER),
            ("void", Type::NULL),
            ("scalar", Type::STRING),
            ("iterable", Type::ARRAY),
            ("list", Type::ARRAY),
            ("object", names::STD_CLASS),
            ("callback", "callable"),
            ("non-empty-string", Type::STRING),
            ("non-empty-list", Type::ARRAY),
            ("non-empty-array", Type::ARRAY),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_owned(), to.to_owned()))
        .collect();

        Self {
            type_mapping,
            config,
        }
    }

    /// Adds or replaces a type alias.
    pub fn with_type_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.type_mapping.insert(from.into(), to.into());
        self
    }

    fn declaration(&self, owner: &ClassInfo, field: &FieldInfo) -> Declaration {
        let ty = field
            .var
            .as_deref()
            .and_then(|var| self.find_type(var, owner, owner.templates()))
            .or_else(|| {
                field
                    .declared
                    .as_deref()
                    .and_then(|declared| self.find_type(declared, owner, &[]))
            });

        Declaration {
            ty,
            since: field.since.clone(),
            until: field.until.clone(),
            ignore: field.ignore,
        }
    }

    /// Resolves a type expression to the first usable member of its union,
    /// keeping at most one simple generic argument.
    fn find_type(&self, expression: &str, owner: &ClassInfo, templates: &[String]) -> Option<String> {
        for intersection in parser::parse(expression) {
            let Some(atom) = intersection.first() else {
                continue;
            };
            let candidate = self.resolve(&atom.name, owner, templates);
            if candidate.is_empty() || candidate == Type::NULL {
                continue;
            }

            let generic = match atom.generics.as_slice() {
                [union] if union.len() == 1 => first_name(&union[0]),
                _ => None,
            };
            return Some(match generic {
                Some(generic) => {
                    let generic = self.resolve(generic, owner, templates);
                    alloc::format!("{candidate}<{generic}>")
                }
                None => candidate,
            });
        }
        None
    }

    fn resolve(&self, name: &str, owner: &ClassInfo, templates: &[String]) -> String {
        let name = name.trim_start_matches('?').trim_start_matches('\\');
        match name {
            "self" | "$this" | "static" => owner.name().into(),
            _ => {
                if let Some(mapped) = self.type_mapping.get(name) {
                    mapped.clone()
                } else if templates.iter().any(|template| template == name) {
                    Type::MIXED.into()
                } else {
                    name.into()
                }
            }
        }
    }
}

fn first_name(intersection: &Intersection) -> Option<&str> {
    intersection.first().map(|atom| atom.name.as_str())
}

impl Driver for DeclarationDriver {
    fn get_metadata_for_class(&self, class: &Arc<ClassInfo>) -> Result<Option<ClassMetadata>, Error> {
        if class.is_interface() || class.is_abstract() {
            return Ok(None);
        }

        let mut declarations: IndexMap<String, Declaration> = IndexMap::new();
        for owner in class.hierarchy() {
            for field in owner.fields() {
                let declaration = self.declaration(owner, field);
                match declarations.get_mut(field.name.as_str()) {
                    Some(child) => child.inherit(declaration),
                    None => {
                        declarations.insert(field.name.clone(), declaration);
                    }
                }
            }
        }

        let mut builder = ClassMetadataBuilder::new(class.clone(), self.config);

        let has_hook = class
            .method(Self::HOOK)
            .is_some_and(|method| method.as_hook().is_some());
        if has_hook {
            builder.post_denormalization(Self::HOOK);
        }

        let options = Options::new();
        for (name, declaration) in declarations {
            if declaration.ignore {
                continue;
            }
            let ty = declaration.ty.as_deref().unwrap_or(Type::MIXED);
            let property = builder.add(&name, ty, &options);
            if let Some(since) = declaration.since {
                property.since(since);
            }
            if let Some(until) = declaration.until {
                property.until(until);
            }
        }

        builder.build().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::class::{ClassKind, MethodInfo};
    use crate::object::{DynamicObject, Object};
    use crate::value::Value;

    fn resolve(expression: &str) -> Option<String> {
        let owner = ClassInfo::new("App\\Node").with_template("T");
        DeclarationDriver::default().find_type(expression, &owner, owner.templates())
    }

    #[test]
    fn type_aliases() {
        assert_eq!(resolve("int").as_deref(), Some("integer"));
        assert_eq!(resolve("?bool").as_deref(), Some("boolean"));
        assert_eq!(resolve("null|\\App\\User").as_deref(), Some("App\\User"));
        assert_eq!(resolve("self").as_deref(), Some("App\\Node"));
        assert_eq!(resolve("T").as_deref(), Some("mixed"));
        assert_eq!(resolve("object").as_deref(), Some("stdClass"));
        assert_eq!(resolve("null"), None);
        assert_eq!(resolve("").as_deref(), Some("mixed"));
    }

    #[test]
    fn generic_arguments() {
        assert_eq!(resolve("list<int>").as_deref(), Some("array<integer>"));
        assert_eq!(resolve("Collection<T>").as_deref(), Some("Collection<mixed>"));
        assert_eq!(resolve("array<string, int>").as_deref(), Some("array"));
        assert_eq!(resolve("array<int|string>").as_deref(), Some("array"));
        assert_eq!(resolve("int[]").as_deref(), Some("int[]"));
    }

    fn hierarchy() -> Arc<ClassInfo> {
        let parent = ClassInfo::new("Base")
            .kind(ClassKind::Abstract)
            .with_field(FieldInfo::new("id").typed("int").since("1.0"))
            .with_field(FieldInfo::new("secret").ignore());
        Arc::new(
            ClassInfo::new("Child")
                .extends(parent)
                .with_field(FieldInfo::new("name").var("string").until("2.0"))
                .with_field(FieldInfo::new("id").var("float"))
                .with_method(MethodInfo::hook("__wakeup", |object| {
                    let _ = object.set_field_raw("name", Value::from("awake"));
                })),
        )
    }

    #[test]
    fn merges_the_hierarchy() {
        let class = hierarchy();
        let metadata = DeclarationDriver::default()
            .get_metadata_for_class(&class)
            .unwrap()
            .unwrap();

        let names: Vec<_> = metadata.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "id"]);

        let id = metadata.property("id").unwrap();
        assert_eq!(id.ty.name(), "float");
        assert_eq!(id.since.as_deref(), Some("1.0"));
        assert_eq!(metadata.property("name").unwrap().until.as_deref(), Some("2.0"));

        let mut object = DynamicObject::instantiate(class);
        metadata.post_denormalization(&mut object);
        assert_eq!(object.field_raw("name").unwrap(), Value::from("awake"));
    }

    #[test]
    fn skips_abstract_classes() {
        let class = hierarchy();
        let parent = class.parent().unwrap().clone();
        assert!(
            DeclarationDriver::default()
                .get_metadata_for_class(&parent)
                .unwrap()
                .is_none()
        );
    }
}
