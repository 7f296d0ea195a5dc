//! The resolved [`Type`] model and the type-expression [`parser`].

pub mod parser;

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::value::Value;

// -----------------------------------------------------------------------------
// Type

/// A resolved type: a name, a builtin flag, a collection flag and an
/// optional element (or parameter) type.
///
/// Types are values: they never carry the hydration target of a
/// denormalization, which is passed next to them.
///
/// # Examples
///
/// ```
/// use vc_norm::types::Type;
///
/// let ty = Type::create("App\\User[]");
/// assert_eq!(ty.name(), "array");
/// assert!(ty.is_collection());
/// assert_eq!(ty.sub_type().unwrap().name(), "App\\User");
///
/// let wrapper = Type::create("Option<int>");
/// assert!(!wrapper.is_collection());
/// assert!(wrapper.is_parametrized());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    name: String,
    builtin: bool,
    collection: bool,
    sub_type: Option<Box<Type>>,
}

impl Type {
    pub const STRING: &'static str = "string";
    pub const BOOLEAN: &'static str = "boolean";
    pub const INTEGER: &'static str = "integer";
    pub const FLOAT: &'static str = "float";
    pub const DOUBLE: &'static str = "double";
    pub const ARRAY: &'static str = "array";
    pub const NULL: &'static str = "null";
    pub const MIXED: &'static str = "mixed";

    const BUILTIN: [&'static str; 10] = [
        Self::STRING,
        Self::INTEGER,
        Self::FLOAT,
        Self::DOUBLE,
        Self::BOOLEAN,
        Self::NULL,
        Self::ARRAY,
        "int",
        "bool",
        "list",
    ];

    pub fn new(
        name: impl Into<String>,
        builtin: bool,
        collection: bool,
        sub_type: Option<Type>,
    ) -> Self {
        Self {
            name: name.into(),
            builtin,
            collection,
            sub_type: sub_type.map(Box::new),
        }
    }

    /// The universal `mixed` type.
    #[inline]
    pub fn mixed() -> Self {
        Self::new(Self::MIXED, true, false, None)
    }

    /// Resolves a type expression.
    ///
    /// - `""` and `mixed` give [`Type::mixed`].
    /// - `X[]` gives an `array` collection of `X`.
    /// - `array` and `list` give a collection of `mixed`.
    /// - `Name<Sub>` gives `Name` parametrized by `Sub`, a collection
    ///   when `Name` is `array` or `list`.
    pub fn create(expression: &str) -> Self {
        if expression.is_empty() || expression == Self::MIXED {
            return Self::mixed();
        }

        let (name, collection, sub_type) = if let Some(item) = expression.strip_suffix("[]") {
            (Self::ARRAY, true, Some(item))
        } else if expression == Self::ARRAY || expression == "list" {
            (expression, true, Some(Self::MIXED))
        } else if let Some((name, sub)) = split_generic(expression) {
            (name, name == "list" || name == Self::ARRAY, Some(sub))
        } else {
            (expression, false, None)
        };

        let sub_type = sub_type.filter(|sub| !sub.is_empty()).map(Self::create);
        Self::new(name, Self::is_builtin_name(name), collection, sub_type)
    }

    /// The type of a value: its class for objects, its kind otherwise.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self::create(&object.class_name()),
            other => Self::create(other.kind_name()),
        }
    }

    #[inline]
    pub fn is_builtin_name(name: &str) -> bool {
        Self::BUILTIN.contains(&name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    #[inline]
    pub fn sub_type(&self) -> Option<&Type> {
        self.sub_type.as_deref()
    }

    #[inline]
    pub fn is_parametrized(&self) -> bool {
        self.sub_type.is_some()
    }

    #[inline]
    pub fn is_mixed(&self) -> bool {
        self.name == Self::MIXED
    }

    /// Refines the type from the data about to be denormalized.
    ///
    /// A `{"@type": T, "data": D}` map switches the type to `T` and replaces
    /// the data by `D`. A `mixed` type becomes a collection of `mixed` for
    /// collection data, and a plain `mixed` otherwise.
    ///
    /// ```
    /// use vc_norm::types::Type;
    /// use vc_norm::value::Value;
    ///
    /// let mut data = Value::from_iter([
    ///     ("@type", Value::from("App\\User")),
    ///     ("data", Value::from_iter([("id", 1)])),
    /// ]);
    /// let ty = Type::mixed();
    /// let hinted = ty.hint(&mut data);
    ///
    /// assert_eq!(hinted.name(), "App\\User");
    /// assert_eq!(data, Value::from_iter([("id", 1)]));
    /// ```
    pub fn hint(&self, value: &mut Value) -> Cow<'_, Type> {
        if let Some(tag) = type_tag(value) {
            let ty = Self::create(&tag);
            *value = match core::mem::take(value) {
                Value::Map(mut map) => map.shift_remove("data").unwrap_or_default(),
                _ => Value::Null,
            };
            return Cow::Owned(ty);
        }

        if self.is_mixed() {
            let mut ty = self.clone();
            if value.is_collection() {
                ty.collection = true;
                ty.sub_type = Some(Box::new(Self::mixed()));
            } else {
                ty.collection = false;
                ty.sub_type = None;
            }
            return Cow::Owned(ty);
        }

        Cow::Borrowed(self)
    }

    /// Casts a value to a builtin scalar type. Other types return it unchanged.
    pub fn convert(&self, value: Value) -> Value {
        match self.name.as_str() {
            Self::INTEGER | "int" => Value::Int(value.cast_int()),
            Self::FLOAT | Self::DOUBLE => Value::Float(value.cast_float()),
            Self::STRING => Value::String(value.cast_string()),
            Self::BOOLEAN | "bool" => Value::Bool(value.cast_bool()),
            Self::NULL => Value::Null,
            Self::ARRAY => value.cast_collection(),
            _ => value,
        }
    }
}

impl Default for Type {
    #[inline]
    fn default() -> Self {
        Self::mixed()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_type() {
            Some(sub) => write!(f, "{}<{sub}>", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Splits `Name<Sub>` at the first `<`.
fn split_generic(expression: &str) -> Option<(&str, &str)> {
    let inner = expression.strip_suffix('>')?;
    let (name, sub) = inner.split_once('<')?;
    Some((name, sub))
}

fn type_tag(value: &Value) -> Option<String> {
    match value.get("@type")? {
        Value::Null => None,
        Value::String(tag) => Some(tag.clone()),
        other => Some(other.cast_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn create_builtins_and_classes() {
        let ty = Type::create("string");
        assert!(ty.is_builtin());
        assert!(!ty.is_collection());
        assert!(ty.sub_type().is_none());

        let ty = Type::create("Customer");
        assert!(!ty.is_builtin());

        let ty = Type::create("int");
        assert_eq!(ty.name(), "int");
        assert!(ty.is_builtin());

        let ty = Type::create("mixed");
        assert!(ty.is_builtin());
        assert!(!ty.is_collection());
    }

    #[test]
    fn create_collections() {
        let ty = Type::create("Customer[]");
        assert_eq!(ty.name(), "array");
        assert!(ty.is_collection());
        assert!(ty.is_builtin());
        assert_eq!(ty.sub_type().unwrap().name(), "Customer");

        let ty = Type::create("array");
        assert!(ty.is_collection());
        assert!(ty.sub_type().unwrap().is_mixed());

        let ty = Type::create("list<SubType>");
        assert_eq!(ty.name(), "list");
        assert!(ty.is_collection());
        assert_eq!(ty.sub_type().unwrap().name(), "SubType");

        let ty = Type::create("MyType<SubType>");
        assert!(!ty.is_collection());
        assert!(ty.is_parametrized());
        assert_eq!(ty.to_string(), "MyType<SubType>");
    }

    #[test]
    fn create_nested() {
        let ty = Type::create("Wrapper<MyType<SubType>>[]");
        assert!(ty.is_collection());
        let wrapper = ty.sub_type().unwrap();
        assert_eq!(wrapper.name(), "Wrapper");
        assert!(!wrapper.is_collection());
        let inner = wrapper.sub_type().unwrap();
        assert_eq!(inner.name(), "MyType");
        assert_eq!(inner.sub_type().unwrap().name(), "SubType");
    }

    #[test]
    fn from_values() {
        assert_eq!(Type::from_value(&Value::Null).name(), "null");
        assert_eq!(Type::from_value(&Value::from(1)).name(), "integer");
        assert!(Type::from_value(&Value::list()).is_collection());
        let object = crate::object::DynamicObject::std().into_ref();
        assert_eq!(Type::from_value(&Value::Object(object)).name(), "stdClass");
    }

    #[test]
    fn conversions() {
        let int = Type::create("integer");
        assert_eq!(int.convert(Value::from("123")), Value::Int(123));
        assert_eq!(int.convert(Value::from(12.3)), Value::Int(12));
        assert_eq!(int.convert(Value::Null), Value::Int(0));

        let string = Type::create("string");
        assert_eq!(string.convert(Value::from(true)), Value::from("1"));
        assert_eq!(string.convert(Value::Null), Value::from(""));
        assert_eq!(string.convert(Value::from(12.3)), Value::from("12.3"));

        let float = Type::create("float");
        assert_eq!(float.convert(Value::from("123")), Value::Float(123.0));

        let boolean = Type::create("boolean");
        assert_eq!(boolean.convert(Value::from("123")), Value::Bool(true));
        assert_eq!(boolean.convert(Value::Null), Value::Bool(false));

        assert_eq!(Type::create("null").convert(Value::from(1)), Value::Null);
        assert_eq!(
            Type::create("array").convert(Value::from("123")),
            Value::List(vec![Value::from("123")])
        );
        assert_eq!(Type::create("unknown").convert(Value::from(1)), Value::Int(1));
    }

    #[test]
    fn hint_without_change() {
        let ty = Type::create("string");
        let mut value = Value::from("my value");
        assert!(matches!(ty.hint(&mut value), Cow::Borrowed(_)));
        assert_eq!(value, Value::from("my value"));
    }

    #[test]
    fn hint_mixed() {
        let ty = Type::mixed();
        let mut scalar = Value::from("foo");
        assert_eq!(*ty.hint(&mut scalar), Type::mixed());

        let mut list = Value::from_iter([Value::from("foo"), Value::from("bar")]);
        let hinted = ty.hint(&mut list);
        assert!(hinted.is_collection());
        assert_eq!(hinted.sub_type(), Some(&Type::mixed()));
        assert!(!ty.is_collection());
    }

    #[test]
    fn hint_type_tag() {
        let ty = Type::create("string");
        let mut value = Value::from_iter([
            ("@type", Value::from("stdClass")),
            ("data", Value::from_iter([("foo", "bar")])),
        ]);
        let hinted = ty.hint(&mut value);
        assert_eq!(*hinted, Type::create("stdClass"));
        assert_eq!(value, Value::from_iter([("foo", "bar")]));
    }
}
