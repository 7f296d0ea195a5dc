use alloc::borrow::Cow;
use core::fmt;

use crate::metadata::PropertyMetadata;
use crate::serializer::Serializer;
use crate::value::{Options, Value};

/// The context of a denormalization call: a plain option map.
#[derive(Clone)]
pub struct DenormalizationContext<'a> {
    root: &'a Serializer,
    options: Options,
}

impl<'a> DenormalizationContext<'a> {
    pub const DATE_FORMAT: &'static str = "dateFormat";
    pub const TIMEZONE: &'static str = "dateTimezone";
    pub const TIMEZONE_HINT: &'static str = "timezoneHint";
    pub const THROWS_ON_ACCESSOR_ERROR: &'static str = "throws_on_accessor_error";

    pub fn new(root: &'a Serializer, options: &Options) -> Self {
        Self {
            root,
            options: options.clone(),
        }
    }

    #[inline]
    pub fn root(&self) -> &'a Serializer {
        self.root
    }

    #[inline]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// A string option, `None` when unset or `null`.
    pub fn option_str(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.options.get(key)? {
            Value::Null => None,
            Value::String(value) => Some(Cow::Borrowed(value)),
            other => Some(Cow::Owned(other.cast_string())),
        }
    }

    #[inline]
    pub fn throws_on_accessor_error(&self) -> bool {
        self.options
            .get(Self::THROWS_ON_ACCESSOR_ERROR)
            .is_some_and(Value::cast_bool)
    }

    /// A context with `options` merged over this one, or the context
    /// itself when there is nothing to merge.
    pub fn duplicate(&self, options: Option<&Options>) -> Cow<'_, Self> {
        match options {
            Some(options) if !options.is_empty() => {
                let mut context = self.clone();
                context.options.merge(options);
                Cow::Owned(context)
            }
            _ => Cow::Borrowed(self),
        }
    }

    /// Read-only properties are never written.
    #[inline]
    pub fn skip_property(&self, property: &PropertyMetadata) -> bool {
        property.read_only
    }
}

impl fmt::Debug for DenormalizationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenormalizationContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_overrides() {
        let serializer = Serializer::builder().build();
        let context = DenormalizationContext::new(
            &serializer,
            &Options::new().with("dateFormat", "%Y").with("throws_on_accessor_error", true),
        );
        assert!(context.throws_on_accessor_error());
        assert!(matches!(context.duplicate(None), Cow::Borrowed(_)));

        let duplicated = context.duplicate(Some(&Options::new().with("dateFormat", "%d")));
        assert_eq!(duplicated.option_str("dateFormat").as_deref(), Some("%d"));
        assert_eq!(context.option_str("dateFormat").as_deref(), Some("%Y"));
        assert!(duplicated.throws_on_accessor_error());
        assert_eq!(context.option_str("timezoneHint"), None);
    }

    #[test]
    fn read_only_properties_are_skipped() {
        let serializer = Serializer::builder().build();
        let context = DenormalizationContext::new(&serializer, &Options::new());
        let mut property = PropertyMetadata::new("Foo", "bar");
        assert!(!context.skip_property(&property));
        property.read_only = true;
        assert!(context.skip_property(&property));
    }
}
