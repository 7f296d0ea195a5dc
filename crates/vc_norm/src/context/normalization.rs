use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use vc_utils::hash::{HashMap, HashSet};

use super::string_list;
use crate::Error;
use crate::metadata::PropertyMetadata;
use crate::object::ObjectRef;
use crate::serializer::Serializer;
use crate::value::{Options, Value};

type References = Rc<RefCell<HashMap<usize, usize>>>;

/// The context of a normalization call.
///
/// Declared options are parsed into typed settings, other options are
/// kept verbatim and read with [`option`](Self::option).
///
/// | key | default | synonyms |
/// |-----|---------|----------|
/// | `groups` | none | `group` |
/// | `exclude`, `include` | none | |
/// | `null` | `false` | `serializeNull`, `serialize_null` |
/// | `include_type` | `false` | |
/// | `version` | none | |
/// | `circular_reference_limit` | `1` | |
/// | `remove_default_value` | `false` | |
/// | `throws_on_accessor_error` | `false` | |
///
/// Duplicates share the circular-reference counters of the context they
/// come from, so a context must not outlive its call nor be shared
/// between calls.
#[derive(Clone)]
pub struct NormalizationContext<'a> {
    root: &'a Serializer,
    options: Options,
    groups: Option<Vec<String>>,
    excludes: Option<HashSet<String>>,
    includes: Option<HashSet<String>>,
    include_null: bool,
    include_type: bool,
    version: Option<String>,
    circular_reference_limit: usize,
    remove_default_value: bool,
    throws_on_accessor_error: bool,
    references: References,
}

impl<'a> NormalizationContext<'a> {
    pub const EXCLUDES: &'static str = "exclude";
    pub const INCLUDES: &'static str = "include";
    pub const GROUPS: &'static str = "groups";
    pub const NULL: &'static str = "null";
    pub const META_TYPE: &'static str = "include_type";
    pub const VERSION: &'static str = "version";
    pub const DATE_FORMAT: &'static str = "dateFormat";
    pub const TIMEZONE: &'static str = "dateTimezone";
    pub const CIRCULAR_REFERENCE_LIMIT: &'static str = "circular_reference_limit";
    pub const REMOVE_DEFAULT_VALUE: &'static str = "remove_default_value";
    pub const THROWS_ON_ACCESSOR_ERROR: &'static str = "throws_on_accessor_error";

    pub fn new(root: &'a Serializer, options: &Options) -> Self {
        let mut context = Self {
            root,
            options: Options::new(),
            groups: None,
            excludes: None,
            includes: None,
            include_null: false,
            include_type: false,
            version: None,
            circular_reference_limit: 1,
            remove_default_value: false,
            throws_on_accessor_error: false,
            references: Rc::default(),
        };
        context.prepare_options(options);
        context
    }

    /// The serializer driving the call.
    #[inline]
    pub fn root(&self) -> &'a Serializer {
        self.root
    }

    /// An undeclared option.
    #[inline]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    #[inline]
    pub fn groups(&self) -> Option<&[String]> {
        self.groups.as_deref()
    }

    #[inline]
    pub fn exclude_properties(&self) -> Option<&HashSet<String>> {
        self.excludes.as_ref()
    }

    #[inline]
    pub fn include_properties(&self) -> Option<&HashSet<String>> {
        self.includes.as_ref()
    }

    #[inline]
    pub fn should_add_null(&self) -> bool {
        self.include_null
    }

    #[inline]
    pub fn include_meta_type(&self) -> bool {
        self.include_type
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[inline]
    pub fn circular_reference_limit(&self) -> usize {
        self.circular_reference_limit
    }

    #[inline]
    pub fn remove_default_value(&self) -> bool {
        self.remove_default_value
    }

    #[inline]
    pub fn throws_on_accessor_error(&self) -> bool {
        self.throws_on_accessor_error
    }

    /// A context with `options` applied over this one.
    ///
    /// Without options, or with an empty map, the context itself is
    /// returned.
    pub fn duplicate(&self, options: Option<&Options>) -> Cow<'_, Self> {
        match options {
            Some(options) if !options.is_empty() => {
                let mut context = self.clone();
                context.prepare_options(options);
                Cow::Owned(context)
            }
            _ => Cow::Borrowed(self),
        }
    }

    fn prepare_options(&mut self, options: &Options) {
        for (key, value) in options.iter() {
            match key.as_str() {
                "group" | Self::GROUPS => {
                    self.groups = (!value.is_null()).then(|| string_list(value));
                }
                "serializeNull" | "serialize_null" | Self::NULL => {
                    self.include_null = value.cast_bool();
                }
                Self::EXCLUDES => {
                    self.excludes = (!value.is_null()).then(|| string_list(value).into_iter().collect());
                }
                Self::INCLUDES => {
                    self.includes = (!value.is_null()).then(|| string_list(value).into_iter().collect());
                }
                Self::META_TYPE => self.include_type = value.cast_bool(),
                Self::VERSION => {
                    self.version = (!value.is_null()).then(|| value.cast_string());
                }
                Self::CIRCULAR_REFERENCE_LIMIT => {
                    self.circular_reference_limit = usize::try_from(value.cast_int()).unwrap_or(0);
                }
                Self::REMOVE_DEFAULT_VALUE => self.remove_default_value = value.cast_bool(),
                Self::THROWS_ON_ACCESSOR_ERROR => self.throws_on_accessor_error = value.cast_bool(),
                _ => self.options.set(key.as_str(), value.clone()),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Filters

    /// Returns `true` if the property is filtered out by the groups, the
    /// version or the include and exclude lists.
    pub fn skip_property(&self, property: &PropertyMetadata) -> bool {
        if let Some(groups) = &self.groups {
            if !property.has_groups(groups) {
                return true;
            }
        }
        if let Some(version) = &self.version {
            if !property.match_version(version) {
                return true;
            }
        }
        !self.should_normalize_property(&property.class, &property.name)
    }

    /// Checks `property` of `class` against the exclude list, then the
    /// include list. Entries match the bare name or `Class::property`.
    pub fn should_normalize_property(&self, class: &str, property: &str) -> bool {
        let path = alloc::format!("{class}::{property}");
        let listed = |set: &HashSet<String>| set.contains(property) || set.contains(path.as_str());

        if self.excludes.as_ref().is_some_and(listed) {
            return false;
        }
        if let Some(includes) = &self.includes {
            return listed(includes);
        }
        true
    }

    /// Returns `true` if the normalized `value` of `property` must be left
    /// out.
    ///
    /// `null` is dropped unless `null` is set, for untyped or nullable
    /// properties. With `remove_default_value`, a value equal to the
    /// default of the property is dropped, `null` included.
    pub fn skip_value(&self, property: &PropertyMetadata, value: &Value) -> bool {
        if value.is_null() && property.allows_null_skip() && !self.include_null {
            return true;
        }
        self.remove_default_value && property.default_value.as_ref() == Some(value)
    }

    // -------------------------------------------------------------------------
    // Circular references

    /// Counts a visit of `object` and returns its identity.
    ///
    /// # Errors
    ///
    /// [`Error::CircularReference`] when the object is already being
    /// normalized `circular_reference_limit` times. Its counter is reset.
    pub fn assert_no_circular_reference(&self, object: &ObjectRef) -> Result<usize, Error> {
        let key = object.identity();
        let mut references = self.references.borrow_mut();

        let Some(count) = references.get_mut(&key) else {
            references.insert(key, 1);
            return Ok(key);
        };
        if *count < self.circular_reference_limit {
            *count += 1;
            return Ok(key);
        }

        references.remove(&key);
        Err(Error::CircularReference {
            class: object.class_name(),
            limit: self.circular_reference_limit,
        })
    }

    /// Releases one visit of the object `key`.
    pub fn release_reference(&self, key: usize) {
        let mut references = self.references.borrow_mut();
        match references.get_mut(&key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                references.remove(&key);
            }
            None => {}
        }
    }

    /// Counts a visit of `object`, released when the guard drops.
    pub fn guard(&self, object: &ObjectRef) -> Result<ReferenceGuard, Error> {
        let key = self.assert_no_circular_reference(object)?;
        Ok(ReferenceGuard {
            references: self.references.clone(),
            key,
        })
    }
}

impl fmt::Debug for NormalizationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizationContext")
            .field("options", &self.options)
            .field("groups", &self.groups)
            .field("excludes", &self.excludes)
            .field("includes", &self.includes)
            .field("include_null", &self.include_null)
            .field("include_type", &self.include_type)
            .field("version", &self.version)
            .field("circular_reference_limit", &self.circular_reference_limit)
            .field("remove_default_value", &self.remove_default_value)
            .field("throws_on_accessor_error", &self.throws_on_accessor_error)
            .finish_non_exhaustive()
    }
}

/// A visit counted by [`NormalizationContext::guard`].
#[must_use]
pub struct ReferenceGuard {
    references: References,
    key: usize,
}

impl ReferenceGuard {
    #[inline]
    pub fn key(&self) -> usize {
        self.key
    }
}

impl Drop for ReferenceGuard {
    fn drop(&mut self) {
        let mut references = self.references.borrow_mut();
        match references.get_mut(&self.key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                references.remove(&self.key);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::object::DynamicObject;

    fn options(pairs: &[(&str, Value)]) -> Options {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn property() -> PropertyMetadata {
        let mut property = PropertyMetadata::new("App\\User", "name");
        property.groups.insert("A".into());
        property.groups.insert("B".into());
        property.since = Some("1.0.0".into());
        property.until = Some("2.0.0".into());
        property.default_value = Some(Value::Int(1));
        property
    }

    #[test]
    fn defaults_and_synonyms() {
        let serializer = Serializer::builder().build();
        let context = NormalizationContext::new(&serializer, &Options::new());
        assert!(context.groups().is_none());
        assert!(!context.should_add_null());
        assert!(!context.include_meta_type());
        assert_eq!(context.circular_reference_limit(), 1);
        assert!(!context.remove_default_value());
        assert!(!context.throws_on_accessor_error());

        let context = NormalizationContext::new(
            &serializer,
            &options(&[
                ("group", Value::from("api")),
                ("serializeNull", Value::Int(1)),
                ("exclude", Value::from("password")),
                ("custom", Value::from("x")),
            ]),
        );
        assert_eq!(context.groups(), Some(&[String::from("api")][..]));
        assert!(context.should_add_null());
        assert!(context.exclude_properties().unwrap().contains("password"));
        assert_eq!(context.option("custom"), Some(&Value::from("x")));
        assert_eq!(context.option("group"), None);
    }

    #[test]
    fn duplicate_without_options_is_the_same_context() {
        let serializer = Serializer::builder().build();
        let context = NormalizationContext::new(&serializer, &Options::new());

        assert!(matches!(context.duplicate(None), Cow::Borrowed(_)));
        assert!(matches!(context.duplicate(Some(&Options::new())), Cow::Borrowed(_)));

        let overrides = Options::new().with("null", true);
        let duplicated = context.duplicate(Some(&overrides));
        assert!(matches!(duplicated, Cow::Owned(_)));
        assert!(duplicated.should_add_null());
        assert!(!context.should_add_null());
    }

    #[test]
    fn group_filter() {
        let serializer = Serializer::builder().build();
        let property = property();
        let with = |groups: Value| {
            NormalizationContext::new(&serializer, &Options::new().with("groups", groups))
                .skip_property(&property)
        };

        assert!(!with(Value::from_iter([Value::from("A")])));
        assert!(!with(Value::from_iter([Value::from("B"), Value::from("C")])));
        assert!(with(Value::from_iter([Value::from("C")])));
        assert!(with(Value::list()));
        assert!(!with(Value::Null));
    }

    #[test]
    fn version_filter() {
        let serializer = Serializer::builder().build();
        let property = property();
        let skipped = |version: &str| {
            NormalizationContext::new(&serializer, &Options::new().with("version", version))
                .skip_property(&property)
        };

        for version in ["1.0.0", "1.5.0", "2.0.0"] {
            assert!(!skipped(version), "{version}");
        }
        for version in ["0.9.0", "2.0.1"] {
            assert!(skipped(version), "{version}");
        }
    }

    #[test]
    fn include_and_exclude() {
        let serializer = Serializer::builder().build();
        let context = NormalizationContext::new(
            &serializer,
            &options(&[
                ("exclude", Value::from_iter([Value::from("App\\User::id")])),
                ("include", Value::from_iter([Value::from("id"), Value::from("name")])),
            ]),
        );
        assert!(!context.should_normalize_property("App\\User", "id"));
        assert!(context.should_normalize_property("App\\Post", "id"));
        assert!(context.should_normalize_property("App\\User", "name"));
        assert!(!context.should_normalize_property("App\\User", "email"));
    }

    #[test]
    fn value_filter() {
        let serializer = Serializer::builder().build();
        let property = property();

        let default = NormalizationContext::new(&serializer, &Options::new());
        assert!(!default.skip_value(&property, &Value::Int(0)));
        assert!(default.skip_value(&property, &Value::Null));
        assert!(!default.skip_value(&property, &Value::Int(1)));

        let with_null = NormalizationContext::new(&serializer, &Options::new().with("null", true));
        assert!(!with_null.skip_value(&property, &Value::Null));

        let remove_default = NormalizationContext::new(
            &serializer,
            &Options::new().with("remove_default_value", true),
        );
        assert!(remove_default.skip_value(&property, &Value::Int(1)));
        assert!(!remove_default.skip_value(&property, &Value::Int(0)));
        assert!(!remove_default.skip_value(&property, &Value::Float(1.0)));

        // A null default is removed even when nulls are kept.
        let mut nullable = property.clone();
        nullable.default_value = Some(Value::Null);
        let both = NormalizationContext::new(
            &serializer,
            &Options::new().with("remove_default_value", true).with("null", true),
        );
        assert!(both.skip_value(&nullable, &Value::Null));

        // Typed, non nullable properties ignore the null rule.
        let mut typed = property.clone();
        typed.typed = true;
        assert!(!default.skip_value(&typed, &Value::Null));
    }

    #[test]
    fn circular_reference_limit() {
        let serializer = Serializer::builder().build();
        let object = DynamicObject::std().into_ref();

        let context = NormalizationContext::new(&serializer, &Options::new());
        let key = context.assert_no_circular_reference(&object).unwrap();
        let err = context.assert_no_circular_reference(&object).unwrap_err();
        assert!(matches!(err, Error::CircularReference { limit: 1, .. }));

        let context = NormalizationContext::new(
            &serializer,
            &Options::new().with("circular_reference_limit", 2),
        );
        assert_eq!(context.assert_no_circular_reference(&object).unwrap(), key);
        assert_eq!(context.assert_no_circular_reference(&object).unwrap(), key);
        context.release_reference(key);
        context.release_reference(key);
        // Fresh count: two more visits are allowed.
        context.assert_no_circular_reference(&object).unwrap();
        context.assert_no_circular_reference(&object).unwrap();
        assert!(context.assert_no_circular_reference(&object).is_err());
    }

    #[test]
    fn duplicates_share_references() {
        let serializer = Serializer::builder().build();
        let object = DynamicObject::std().into_ref();
        let context = NormalizationContext::new(&serializer, &Options::new());
        let overrides = Options::new().with("null", true);

        let guard = context.guard(&object).unwrap();
        {
            let duplicated = context.duplicate(Some(&overrides));
            assert!(duplicated.guard(&object).is_err());
        }
        drop(guard);
        let _guard = context.guard(&object).unwrap();
    }
}
