use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::Error;
use crate::accessor::{AccessorConfig, AccessorSpec, PropertyAccessor, SharedAccessor, guesser};
use crate::class::ClassInfo;
use crate::context::{DenormalizationContext, NormalizationContext, string_list};
use crate::metadata::PropertyMetadata;
use crate::types::Type;
use crate::value::{Options, Value};

/// Collects the description of one property.
///
/// Setters return the builder, so calls chain:
///
/// ```
/// use std::sync::Arc;
/// use vc_norm::accessor::AccessorConfig;
/// use vc_norm::class::{ClassInfo, FieldInfo};
/// use vc_norm::metadata::ClassMetadataBuilder;
///
/// let class = Arc::new(ClassInfo::new("User").with_field(FieldInfo::new("roles")));
/// let mut builder = ClassMetadataBuilder::new(class, AccessorConfig::default());
/// builder
///     .property("roles")
///     .collection_of("string")
///     .alias("user_roles")
///     .groups(["admin"]);
///
/// let metadata = builder.build().unwrap();
/// let roles = metadata.property("user_roles").unwrap();
/// assert_eq!(roles.ty.to_string(), "array<string>");
/// ```
#[derive(Debug, Clone)]
pub struct PropertyMetadataBuilder {
    class: Arc<ClassInfo>,
    config: AccessorConfig,
    name: String,
    alias: Option<String>,
    ty: Option<String>,
    groups: Vec<String>,
    accessor: Option<SharedAccessor>,
    getter: Option<AccessorSpec>,
    setter: Option<AccessorSpec>,
    since: Option<String>,
    until: Option<String>,
    read_only: bool,
    inline: bool,
    normalization: Option<Options>,
    denormalization: Option<Options>,
}

impl PropertyMetadataBuilder {
    pub fn new(class: Arc<ClassInfo>, name: impl Into<String>, config: AccessorConfig) -> Self {
        Self {
            class,
            config,
            name: name.into(),
            alias: None,
            ty: None,
            groups: Vec::new(),
            accessor: None,
            getter: None,
            setter: None,
            since: None,
            until: None,
            read_only: false,
            inline: false,
            normalization: None,
            denormalization: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type expression collected so far.
    #[inline]
    pub fn type_expression(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    #[inline]
    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    #[inline]
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    // -------------------------------------------------------------------------
    // Type

    pub fn type_(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    /// Makes the current type a collection of itself.
    pub fn collection(&mut self) -> &mut Self {
        self.ty.get_or_insert_with(String::new).push_str("[]");
        self
    }

    pub fn collection_of(&mut self, ty: impl Into<String>) -> &mut Self {
        self.type_(ty).collection()
    }

    /// Parametrizes the current type: `Wrapper` becomes `Wrapper<ty>`.
    pub fn wrapper_of(&mut self, ty: &str) -> &mut Self {
        let current = self.ty.get_or_insert_with(String::new);
        current.push('<');
        current.push_str(ty);
        current.push('>');
        self
    }

    // -------------------------------------------------------------------------
    // Naming and filters

    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.alias = Some(alias.into());
        self
    }

    /// Replaces the groups of the property.
    pub fn groups<I, S>(&mut self, groups: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_group(&mut self, group: impl Into<String>) -> &mut Self {
        self.groups.push(group.into());
        self
    }

    pub fn since(&mut self, version: impl Into<String>) -> &mut Self {
        self.since = Some(version.into());
        self
    }

    pub fn until(&mut self, version: impl Into<String>) -> &mut Self {
        self.until = Some(version.into());
        self
    }

    pub fn read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    /// Merges the normalized map of the property into its parent.
    pub fn inline(&mut self, inline: bool) -> &mut Self {
        self.inline = inline;
        self
    }

    // -------------------------------------------------------------------------
    // Access

    /// Uses `accessor` for both reads and writes.
    pub fn accessor(&mut self, accessor: impl PropertyAccessor + 'static) -> &mut Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    /// Reads with a method of the class, or a custom accessor.
    pub fn read_with(&mut self, getter: impl Into<AccessorSpec>) -> &mut Self {
        self.getter = Some(getter.into());
        self
    }

    /// Writes with a method of the class, or a custom accessor.
    pub fn write_with(&mut self, setter: impl Into<AccessorSpec>) -> &mut Self {
        self.setter = Some(setter.into());
        self
    }

    /// A read-only property computed by `getter`.
    pub fn virtual_(&mut self, getter: impl Into<AccessorSpec>) -> &mut Self {
        self.read_with(getter).read_only(true)
    }

    // -------------------------------------------------------------------------
    // Context overrides

    /// Sets an option of the normalization context of this property.
    pub fn normalization(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.normalization
            .get_or_insert_with(Options::new)
            .set(key, value);
        self
    }

    /// Sets an option of the denormalization context of this property.
    pub fn denormalization(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.denormalization
            .get_or_insert_with(Options::new)
            .set(key, value);
        self
    }

    /// The format of the date, in both directions.
    pub fn date_format(&mut self, format: &str) -> &mut Self {
        self.normalization(NormalizationContext::DATE_FORMAT, format)
            .denormalization(DenormalizationContext::DATE_FORMAT, format)
    }

    /// The timezone of denormalized dates.
    pub fn timezone(&mut self, timezone: &str) -> &mut Self {
        self.denormalization(DenormalizationContext::TIMEZONE, timezone)
    }

    /// Converts dates to `timezone` before normalizing them, and reads
    /// dates without offset in that timezone.
    pub fn to_timezone(&mut self, timezone: &str) -> &mut Self {
        self.normalization(NormalizationContext::TIMEZONE, timezone)
            .denormalization(DenormalizationContext::TIMEZONE_HINT, timezone)
    }

    /// Keeps the property when its value is `null`.
    pub fn conserve_null(&mut self) -> &mut Self {
        self.normalization(NormalizationContext::NULL, true)
    }

    /// Keeps the property when its value is the default one.
    pub fn conserve_default(&mut self) -> &mut Self {
        self.normalization(NormalizationContext::REMOVE_DEFAULT_VALUE, false)
    }

    /// Applies declarative options.
    ///
    /// Known keys: `type`, `group`/`groups`, `alias`/`serializedName`,
    /// `since`, `until` and `readOnly`. Others are ignored.
    pub fn configure(&mut self, options: &Options) -> &mut Self {
        for (key, value) in options.iter() {
            match key.as_str() {
                "type" => {
                    self.type_(value.cast_string());
                }
                "group" | "groups" => {
                    self.groups(string_list(value));
                }
                "alias" | "serializedName" => {
                    self.alias(value.cast_string());
                }
                "since" => {
                    self.since(value.cast_string());
                }
                "until" => {
                    self.until(value.cast_string());
                }
                "readOnly" => {
                    self.read_only(value.cast_bool());
                }
                _ => {}
            }
        }
        self
    }

    // -------------------------------------------------------------------------
    // Build

    /// Resolves the type, the alias, the accessor and the default value.
    ///
    /// The accessor is, by priority, the custom accessor, the one built
    /// from the getter and the setter, or the accessor of the field.
    pub fn build(self) -> Result<PropertyMetadata, Error> {
        let accessor = self.build_accessor()?;
        let field = self.class.find_field(&self.name);

        let mut property = PropertyMetadata::new(self.class.name(), self.name.as_str());
        property.ty = Type::create(self.ty.as_deref().unwrap_or(""));
        property.alias = self
            .alias
            .filter(|alias| !alias.is_empty())
            .unwrap_or_else(|| self.name.clone());
        property.groups = self.groups.into_iter().collect();
        property.accessor = accessor;
        property.since = self.since;
        property.until = self.until;
        property.read_only = self.read_only;
        property.inline = self.inline;
        property.normalization = self.normalization;
        property.denormalization = self.denormalization;

        if let Some(field) = field {
            property.default_value = field.initial_value();
            property.typed = field.is_typed();
            property.nullable = field.nullable;
        }
        Ok(property)
    }

    fn build_accessor(&self) -> Result<SharedAccessor, Error> {
        if let Some(accessor) = &self.accessor {
            return Ok(accessor.clone());
        }
        if self.getter.is_some() || self.setter.is_some() {
            return guesser::method_accessor(
                &self.class,
                &self.name,
                self.getter.as_ref(),
                self.setter.as_ref(),
                self.read_only,
                self.config,
            );
        }
        guesser::property_accessor(&self.class, &self.name, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    use crate::accessor::NullAccessor;
    use crate::class::{FieldInfo, MethodInfo};

    fn class() -> Arc<ClassInfo> {
        Arc::new(
            ClassInfo::new("Post")
                .with_field(FieldInfo::new("title").public().default("untitled"))
                .with_field(FieldInfo::new("views").typed("?int"))
                .with_field(FieldInfo::new("body"))
                .with_method(MethodInfo::reader("excerpt", |_| Ok(Value::from("..."))))
                .with_method(MethodInfo::reader("getBody", |_| Ok(Value::Null)))
                .with_method(MethodInfo::writer("setBody", |_, _| Ok(()))),
        )
    }

    fn builder(name: &str) -> PropertyMetadataBuilder {
        PropertyMetadataBuilder::new(class(), name, AccessorConfig::default())
    }

    #[test]
    fn defaults_from_the_field() {
        let property = builder("title").build().unwrap();
        assert_eq!(property.alias, "title");
        assert_eq!(property.class, "Post");
        assert!(property.ty.is_mixed());
        assert_eq!(property.default_value, Some(Value::from("untitled")));
        assert!(!property.typed);

        let views = builder("views").build().unwrap();
        assert!(views.typed);
        assert!(views.nullable);
        assert_eq!(views.default_value, None);

        let body = builder("body").build().unwrap();
        assert_eq!(body.default_value, Some(Value::Null));
    }

    #[test]
    fn type_assembly() {
        let mut b = builder("title");
        b.collection_of("string");
        assert_eq!(b.type_expression(), Some("string[]"));

        let mut b = builder("title");
        b.type_("Option").wrapper_of("int");
        let property = b.build().unwrap();
        assert_eq!(property.ty.name(), "Option");
        assert_eq!(property.ty.sub_type().unwrap().name(), "int");
    }

    #[test]
    fn accessor_priority() {
        let mut b = builder("body");
        b.read_with("getBody").write_with("setBody");
        b.accessor(NullAccessor);
        let property = b.build().unwrap();
        assert!(format!("{:?}", property.accessor).starts_with("NullAccessor"));

        let mut b = builder("body");
        b.read_with("getBody").write_with("setBody");
        let property = b.build().unwrap();
        assert!(format!("{:?}", property.accessor).starts_with("MethodAccessor"));

        let mut b = builder("excerpt");
        b.virtual_("excerpt");
        let property = b.build().unwrap();
        assert!(property.read_only);
        assert_eq!(property.default_value, None);

        assert!(matches!(
            builder("missing").build(),
            Err(Error::UnknownProperty { .. })
        ));
    }

    #[test]
    fn configure_from_options() {
        let options = Options::new()
            .with("type", "int")
            .with("group", "api")
            .with("serializedName", "hits")
            .with("since", "1.2")
            .with("readOnly", 1);
        let mut b = builder("views");
        b.configure(&options);
        let property = b.build().unwrap();

        assert_eq!(property.ty.name(), "int");
        assert!(property.has_groups(&["api"]));
        assert_eq!(property.alias, "hits");
        assert_eq!(property.since.as_deref(), Some("1.2"));
        assert!(property.read_only);
    }

    #[test]
    fn context_overrides() {
        let mut b = builder("title");
        b.date_format("%Y").to_timezone("+02:00").conserve_null();
        let property = b.build().unwrap();

        let normalization = property.normalization.unwrap();
        assert_eq!(normalization.get("dateFormat"), Some(&Value::from("%Y")));
        assert_eq!(normalization.get("dateTimezone"), Some(&Value::from("+02:00")));
        assert_eq!(normalization.get("null"), Some(&Value::Bool(true)));

        let denormalization = property.denormalization.unwrap();
        assert_eq!(denormalization.get("timezoneHint"), Some(&Value::from("+02:00")));
        assert!(!denormalization.contains("dateTimezone"));
    }
}
