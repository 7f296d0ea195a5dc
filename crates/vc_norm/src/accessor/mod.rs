//! Property accessors: how a property value is read from and written to a
//! live object.
//!
//! An accessor is selected once, when the property metadata is built:
//!
//! - [`PublicAccessor`]: the public field of the same name.
//! - [`ReflectionAccessor`]: the field, bypassing visibility.
//! - [`ClosureAccessor`]: the field, through closures bound at build time.
//! - [`MethodAccessor`]: a getter/setter method pair of the class.
//! - [`DelegateAccessor`]: an independent reader and writer.
//! - [`TypedPropertyAccessor`]: turns failures on typed fields, like reading
//!   an uninitialized one, into [`AccessorError`]s.
//! - [`NullAccessor`]: reads `null`, ignores writes.
//!
//! [`guesser`] holds the selection rules.

// -----------------------------------------------------------------------------
// Modules

mod delegate;
mod field;
mod method;
mod null;
mod typed;

pub mod guesser;

// -----------------------------------------------------------------------------
// Exports

pub use delegate::DelegateAccessor;
pub use field::{ClosureAccessor, PublicAccessor, ReflectionAccessor};
pub use method::MethodAccessor;
pub use null::NullAccessor;
pub use typed::TypedPropertyAccessor;

// -----------------------------------------------------------------------------
// PropertyAccessor

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use crate::object::{FieldError, Object};
use crate::value::Value;

/// Reads and writes one property of an object.
pub trait PropertyAccessor: fmt::Debug + Send + Sync {
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError>;

    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError>;
}

/// A shared accessor, as stored in property metadata.
pub type SharedAccessor = Arc<dyn PropertyAccessor>;

/// Where a property is read from or written to, as given to the builders.
#[derive(Debug, Clone)]
pub enum AccessorSpec {
    /// A method of the class.
    Method(String),
    /// A custom accessor.
    Custom(SharedAccessor),
}

impl AccessorSpec {
    #[inline]
    pub fn custom(accessor: impl PropertyAccessor + 'static) -> Self {
        Self::Custom(Arc::new(accessor))
    }

    #[inline]
    pub fn as_method(&self) -> Option<&str> {
        match self {
            Self::Method(name) => Some(name),
            Self::Custom(_) => None,
        }
    }
}

impl From<&str> for AccessorSpec {
    #[inline]
    fn from(method: &str) -> Self {
        Self::Method(method.into())
    }
}

impl From<String> for AccessorSpec {
    #[inline]
    fn from(method: String) -> Self {
        Self::Method(method)
    }
}

impl From<SharedAccessor> for AccessorSpec {
    #[inline]
    fn from(accessor: SharedAccessor) -> Self {
        Self::Custom(accessor)
    }
}

// -----------------------------------------------------------------------------
// Configuration

/// Accessor selection settings, passed to metadata builders and drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessorConfig {
    /// Use [`ClosureAccessor`] instead of [`ReflectionAccessor`] for
    /// non-public fields.
    pub use_closure: bool,
}

// -----------------------------------------------------------------------------
// Error

/// The kind of [`AccessorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorErrorKind {
    MissingGetter,
    MissingSetter,
    /// A typed property could not be read.
    Read,
    /// A typed property could not be written.
    Write,
    /// The object refused the field access.
    Field,
}

/// An error raised while reading or writing a property.
///
/// Use the `Display` impl of this type to get information on the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorError {
    kind: AccessorErrorKind,
    class: String,
    property: String,
    cause: Option<FieldError>,
}

impl AccessorError {
    pub fn new(kind: AccessorErrorKind, class: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            kind,
            class: class.into(),
            property: property.into(),
            cause: None,
        }
    }

    #[inline]
    pub fn with_cause(mut self, cause: FieldError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Wraps an object-level failure.
    #[inline]
    pub fn field(class: &str, property: &str, cause: FieldError) -> Self {
        Self::new(AccessorErrorKind::Field, class, property).with_cause(cause)
    }

    #[inline]
    pub fn kind(&self) -> AccessorErrorKind {
        self.kind
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    pub fn cause(&self) -> Option<&FieldError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for AccessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { class, property, .. } = self;
        match (self.kind, &self.cause) {
            (AccessorErrorKind::MissingGetter, _) => {
                write!(f, "Could not find getter method for \"{property}\"")
            }
            (AccessorErrorKind::MissingSetter, _) => {
                write!(f, "Could not find setter method for \"{property}\"")
            }
            (AccessorErrorKind::Read, _) => write!(
                f,
                "Cannot read value of the property {class}::{property} on serializer"
            ),
            (AccessorErrorKind::Write, _) => write!(
                f,
                "Cannot write value on the property {class}::{property} on serializer"
            ),
            (AccessorErrorKind::Field, Some(cause)) => cause.fmt(f),
            (AccessorErrorKind::Field, None) => {
                write!(f, "Cannot access the property {class}::{property}")
            }
        }
    }
}

impl core::error::Error for AccessorError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn core::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        let err = AccessorError::new(AccessorErrorKind::MissingGetter, "Foo", "bar");
        assert_eq!(err.to_string(), "Could not find getter method for \"bar\"");

        let err = AccessorError::new(AccessorErrorKind::Write, "Foo", "bar");
        assert_eq!(
            err.to_string(),
            "Cannot write value on the property Foo::bar on serializer"
        );

        let cause = FieldError::Undefined {
            class: "Foo".into(),
            field: "bar".into(),
        };
        let err = AccessorError::field("Foo", "bar", cause.clone());
        assert_eq!(err.to_string(), cause.to_string());
        assert!(core::error::Error::source(&err).is_some());
    }
}
