use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::metadata::ClassMetadataBuilder;
use crate::object::{DynamicObject, FieldError, Object, ObjectRef};
use crate::value::{IntoValue, TypeExpression, Value};

// -----------------------------------------------------------------------------
// Function types

/// A method reading a value from an object.
pub type ReadFn = Arc<dyn Fn(&dyn Object) -> Result<Value, FieldError> + Send + Sync>;

/// A method writing a value to an object.
pub type WriteFn = Arc<dyn Fn(&mut dyn Object, Value) -> Result<(), FieldError> + Send + Sync>;

/// A method called without arguments, e.g. a post-denormalization hook.
pub type HookFn = Arc<dyn Fn(&mut dyn Object) + Send + Sync>;

/// A static method filling a metadata builder.
pub type LoaderFn = Arc<dyn Fn(&mut ClassMetadataBuilder) + Send + Sync>;

/// Creates an instance without running any user constructor.
pub type ConstructorFn = Arc<dyn Fn() -> ObjectRef + Send + Sync>;

// -----------------------------------------------------------------------------
// Visibility & kind

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Private,
}

impl Visibility {
    /// Maps a Rust visibility keyword, as produced by `stringify!($vis)`.
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword == "pub" {
            Visibility::Public
        } else if keyword.starts_with("pub") {
            Visibility::Protected
        } else {
            Visibility::Private
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    #[default]
    Concrete,
    Abstract,
    Interface,
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A declared field.
///
/// `var`, `since`, `until` and `ignore` are declaration attributes read by
/// [`DeclarationDriver`](crate::metadata::DeclarationDriver).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub visibility: Visibility,
    pub readonly: bool,
    /// The declared type expression, `None` for untyped fields.
    pub declared: Option<String>,
    pub nullable: bool,
    pub default: Option<Value>,
    /// A type expression overriding `declared` for serialization.
    pub var: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub ignore: bool,
}

impl FieldInfo {
    /// A private, untyped field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Private,
            readonly: false,
            declared: None,
            nullable: false,
            default: None,
            var: None,
            since: None,
            until: None,
            ignore: false,
        }
    }

    /// A field holding a Rust value, typed after `T` with `default` as default value.
    pub fn of_type<T: TypeExpression + IntoValue>(name: impl Into<String>, default: &T) -> Self {
        let mut info = Self::new(name).typed(T::type_expression()).default(default.to_value());
        info.nullable = T::NULLABLE;
        info
    }

    #[inline]
    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    #[inline]
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    #[inline]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[inline]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Declares the field type. A leading `?` marks it nullable.
    pub fn typed(mut self, expression: impl Into<Cow<'static, str>>) -> Self {
        let expression = expression.into();
        match expression.strip_prefix('?') {
            Some(inner) => {
                self.declared = Some(inner.into());
                self.nullable = true;
            }
            None => self.declared = Some(expression.into_owned()),
        }
        self
    }

    #[inline]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[inline]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[inline]
    pub fn var(mut self, expression: impl Into<String>) -> Self {
        self.var = Some(expression.into());
        self
    }

    #[inline]
    pub fn since(mut self, version: impl Into<String>) -> Self {
        self.since = Some(version.into());
        self
    }

    #[inline]
    pub fn until(mut self, version: impl Into<String>) -> Self {
        self.until = Some(version.into());
        self
    }

    #[inline]
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    #[inline]
    pub fn is_typed(&self) -> bool {
        self.declared.is_some()
    }

    /// The value of a freshly instantiated slot, `None` meaning uninitialized.
    pub(crate) fn initial_value(&self) -> Option<Value> {
        match (&self.default, &self.declared) {
            (Some(default), _) => Some(default.clone()),
            (None, None) => Some(Value::Null),
            (None, Some(_)) => None,
        }
    }

    /// Whether a typed slot accepts `value`.
    pub(crate) fn accepts(&self, value: &Value) -> bool {
        let Some(declared) = &self.declared else {
            return true;
        };
        let base = declared
            .split('<')
            .next()
            .unwrap_or(declared)
            .trim_start_matches('\\')
            .to_ascii_lowercase();
        match value {
            Value::Null => self.nullable || base == "mixed" || base == "null",
            Value::Bool(_) => matches!(base.as_str(), "bool" | "mixed"),
            Value::Int(_) => matches!(base.as_str(), "int" | "float" | "mixed"),
            Value::Float(_) => matches!(base.as_str(), "float" | "mixed"),
            Value::String(_) => matches!(base.as_str(), "string" | "mixed"),
            Value::List(_) | Value::Map(_) => {
                matches!(base.as_str(), "array" | "list" | "iterable" | "mixed")
            }
            Value::Object(_) => !matches!(
                base.as_str(),
                "bool" | "int" | "float" | "string" | "array" | "list" | "null"
            ),
        }
    }
}

// -----------------------------------------------------------------------------
// MethodInfo

#[derive(Clone)]
pub enum MethodBody {
    Reader(ReadFn),
    Writer(WriteFn),
    Hook(HookFn),
}

/// A named method of a class.
#[derive(Clone)]
pub struct MethodInfo {
    name: String,
    body: MethodBody,
}

impl MethodInfo {
    pub fn reader(
        name: impl Into<String>,
        f: impl Fn(&dyn Object) -> Result<Value, FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            body: MethodBody::Reader(Arc::new(f)),
        }
    }

    pub fn writer(
        name: impl Into<String>,
        f: impl Fn(&mut dyn Object, Value) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            body: MethodBody::Writer(Arc::new(f)),
        }
    }

    pub fn hook(name: impl Into<String>, f: impl Fn(&mut dyn Object) + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            body: MethodBody::Hook(Arc::new(f)),
        }
    }

    /// A reader on a concrete object type.
    pub fn getter<T: Object>(
        name: impl Into<String>,
        f: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let method = name.clone();
        Self::reader(name, move |object| match object.as_any().downcast_ref::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(FieldError::Undefined {
                class: object.class_name().into(),
                field: method.clone(),
            }),
        })
    }

    /// A writer on a concrete object type.
    pub fn setter<T: Object>(
        name: impl Into<String>,
        f: impl Fn(&mut T, Value) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let method = name.clone();
        Self::writer(name, move |object, value| {
            let class: String = object.class_name().into();
            match object.as_any_mut().downcast_mut::<T>() {
                Some(object) => f(object, value),
                None => Err(FieldError::Undefined {
                    class,
                    field: method.clone(),
                }),
            }
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    #[inline]
    pub fn as_reader(&self) -> Option<&ReadFn> {
        match &self.body {
            MethodBody::Reader(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_writer(&self) -> Option<&WriteFn> {
        match &self.body {
            MethodBody::Writer(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_hook(&self) -> Option<&HookFn> {
        match &self.body {
            MethodBody::Hook(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            MethodBody::Reader(_) => "reader",
            MethodBody::Writer(_) => "writer",
            MethodBody::Hook(_) => "hook",
        };
        write!(f, "{}() [{kind}]", self.name)
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// The runtime description of a class.
///
/// # Examples
///
/// ```
/// use vc_norm::class::{ClassInfo, FieldInfo};
///
/// let base = ClassInfo::new("App\\Entity").with_field(FieldInfo::new("id").typed("int"));
/// let user = ClassInfo::new("App\\User")
///     .extends(base)
///     .with_field(FieldInfo::new("name").public().typed("?string"));
///
/// assert!(user.is_a("App\\Entity"));
/// assert_eq!(user.field_owner("id").unwrap().name(), "App\\Entity");
/// assert!(user.find_field("name").unwrap().nullable);
/// ```
#[derive(Clone)]
pub struct ClassInfo {
    name: String,
    kind: ClassKind,
    parent: Option<Arc<ClassInfo>>,
    interfaces: Vec<String>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    statics: Vec<(String, LoaderFn)>,
    templates: Vec<String>,
    constructor: Option<ConstructorFn>,
}

impl ClassInfo {
    /// A concrete class without members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Concrete,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            statics: Vec::new(),
            templates: Vec::new(),
            constructor: None,
        }
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name).kind(ClassKind::Interface)
    }

    // ------------------------------------------------------------------
    // Declaration

    #[inline]
    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn extends(mut self, parent: impl Into<Arc<ClassInfo>>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[inline]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[inline]
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    #[inline]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Declares a static method filling a metadata builder.
    pub fn with_static(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut ClassMetadataBuilder) + Send + Sync + 'static,
    ) -> Self {
        self.statics.push((name.into(), Arc::new(f)));
        self
    }

    /// Declares a template parameter name.
    #[inline]
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.templates.push(name.into());
        self
    }

    #[inline]
    pub fn with_constructor(mut self, f: impl Fn() -> ObjectRef + Send + Sync + 'static) -> Self {
        self.constructor = Some(Arc::new(f));
        self
    }

    // ------------------------------------------------------------------
    // Queries

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn class_kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Abstract
    }

    #[inline]
    pub fn parent(&self) -> Option<&Arc<ClassInfo>> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Fields declared by this class, without inherited ones.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Iterates this class and its ancestors, nearest first.
    pub fn hierarchy(&self) -> impl Iterator<Item = &ClassInfo> {
        core::iter::successors(Some(self), |class| class.parent.as_deref())
    }

    /// All fields, declared ones first and then inherited ones not redeclared.
    pub fn all_fields(&self) -> Vec<&FieldInfo> {
        let mut fields: Vec<&FieldInfo> = Vec::new();
        for class in self.hierarchy() {
            for field in &class.fields {
                if !fields.iter().any(|f| f.name == field.name) {
                    fields.push(field);
                }
            }
        }
        fields
    }

    /// The nearest class of the hierarchy declaring `field`.
    pub fn field_owner(&self, field: &str) -> Option<&ClassInfo> {
        self.hierarchy()
            .find(|class| class.fields.iter().any(|f| f.name == field))
    }

    pub fn find_field(&self, field: &str) -> Option<&FieldInfo> {
        self.hierarchy()
            .find_map(|class| class.fields.iter().find(|f| f.name == field))
    }

    /// Looks up a method, including inherited ones.
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.hierarchy()
            .find_map(|class| class.methods.iter().find(|m| m.name == name))
    }

    #[inline]
    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }

    /// Looks up a static metadata method, including inherited ones.
    pub fn static_method(&self, name: &str) -> Option<&LoaderFn> {
        self.hierarchy().find_map(|class| {
            class
                .statics
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, f)| f)
        })
    }

    /// Returns `true` if the class is `name`, extends it or implements it.
    pub fn is_a(&self, name: &str) -> bool {
        self.hierarchy()
            .any(|class| class.name == name || class.interfaces.iter().any(|i| i == name))
    }

    /// Creates an instance, `None` for interfaces and abstract classes.
    ///
    /// Classes without a constructor are instantiated as [`DynamicObject`].
    pub fn instantiate(self: &Arc<Self>) -> Option<ObjectRef> {
        if let Some(constructor) = &self.constructor {
            return Some(constructor());
        }
        match self.kind {
            ClassKind::Concrete => Some(DynamicObject::instantiate(self.clone()).into_ref()),
            ClassKind::Abstract | ClassKind::Interface => None,
        }
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_fields() {
        let field = FieldInfo::new("name").typed("?string");
        assert_eq!(field.declared.as_deref(), Some("string"));
        assert!(field.nullable);
        assert!(field.accepts(&Value::Null));
        assert!(field.accepts(&Value::from("a")));
        assert!(!field.accepts(&Value::from(1)));

        let id = FieldInfo::new("id").typed("int");
        assert!(!id.accepts(&Value::Null));
        assert_eq!(id.initial_value(), None);
        assert_eq!(FieldInfo::new("x").initial_value(), Some(Value::Null));
        assert_eq!(
            FieldInfo::new("x").typed("int").default(3).initial_value(),
            Some(Value::Int(3))
        );
    }

    #[test]
    fn hierarchy_lookups() {
        let base = ClassInfo::new("Base")
            .implements("Stringable")
            .with_field(FieldInfo::new("id"))
            .with_method(MethodInfo::hook("__wakeup", |_| {}));
        let child = ClassInfo::new("Child")
            .extends(base)
            .with_field(FieldInfo::new("name"))
            .with_field(FieldInfo::new("id").public());

        assert!(child.is_a("Base"));
        assert!(child.is_a("Stringable"));
        assert!(!child.is_a("Other"));
        assert!(child.has_method("__wakeup"));
        assert_eq!(child.field_owner("id").unwrap().name(), "Child");

        let names: Vec<_> = child.all_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "id"]);
    }

    #[test]
    fn abstract_classes_are_not_instantiated() {
        let class = Arc::new(ClassInfo::new("A").kind(ClassKind::Abstract));
        assert!(class.instantiate().is_none());
        let class = Arc::new(ClassInfo::new("B"));
        assert_eq!(class.instantiate().unwrap().class_name(), "B");
    }

    #[test]
    fn visibility_keywords() {
        assert_eq!(Visibility::from_keyword("pub"), Visibility::Public);
        assert_eq!(Visibility::from_keyword("pub(crate)"), Visibility::Protected);
        assert_eq!(Visibility::from_keyword(""), Visibility::Private);
    }
}
