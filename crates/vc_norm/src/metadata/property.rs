use alloc::string::String;
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;

use vc_utils::hash::HashSet;

use crate::accessor::{NullAccessor, SharedAccessor};
use crate::context::version_compare;
use crate::types::Type;
use crate::value::{Options, Value};

/// The resolved description of one property.
///
/// Built by [`PropertyMetadataBuilder`](super::PropertyMetadataBuilder),
/// read-only once the owning [`ClassMetadata`](super::ClassMetadata) is built.
#[derive(Clone)]
pub struct PropertyMetadata {
    /// The class declaring the property.
    pub class: String,
    pub name: String,
    /// The serialized name, defaults to `name`.
    pub alias: String,
    pub ty: Type,
    pub groups: HashSet<String>,
    pub accessor: SharedAccessor,
    /// First version including the property.
    pub since: Option<String>,
    /// Last version including the property.
    pub until: Option<String>,
    pub read_only: bool,
    pub inline: bool,
    /// The class default, `None` when the field has none.
    pub default_value: Option<Value>,
    /// Whether the backing field declares a type.
    pub typed: bool,
    /// Whether the declared type accepts `null`.
    pub nullable: bool,
    /// Overrides applied to the normalization context of this property.
    pub normalization: Option<Options>,
    /// Overrides applied to the denormalization context of this property.
    pub denormalization: Option<Options>,
}

impl PropertyMetadata {
    /// An untyped, ungrouped property read through a [`NullAccessor`].
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            class: class.into(),
            alias: name.clone(),
            name,
            ty: Type::mixed(),
            groups: HashSet::default(),
            accessor: Arc::new(NullAccessor),
            since: None,
            until: None,
            read_only: false,
            inline: false,
            default_value: None,
            typed: false,
            nullable: false,
            normalization: None,
            denormalization: None,
        }
    }

    /// Returns `true` if the property belongs to at least one of `groups`.
    pub fn has_groups<S: AsRef<str>>(&self, groups: &[S]) -> bool {
        groups
            .iter()
            .any(|group| self.groups.contains(group.as_ref()))
    }

    /// Returns `true` if `version` is in the `since..=until` range.
    pub fn match_version(&self, version: &str) -> bool {
        if let Some(since) = &self.since {
            if version_compare(version, since) == Ordering::Less {
                return false;
            }
        }
        if let Some(until) = &self.until {
            if version_compare(version, until) == Ordering::Greater {
                return false;
            }
        }
        true
    }

    /// Whether a `null` value may be dropped by the null policy.
    ///
    /// Typed fields that are not nullable never hold `null`, so only the
    /// default value rule applies to them.
    #[inline]
    pub fn allows_null_skip(&self) -> bool {
        !self.typed || self.nullable
    }
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("class", &self.class)
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("ty", &self.ty)
            .field("groups", &self.groups)
            .field("accessor", &self.accessor)
            .field("since", &self.since)
            .field("until", &self.until)
            .field("read_only", &self.read_only)
            .field("inline", &self.inline)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property() -> PropertyMetadata {
        let mut property = PropertyMetadata::new("Foo", "bar");
        property.groups.insert("A".into());
        property.groups.insert("B".into());
        property.since = Some("1.0.0".into());
        property.until = Some("2.0.0".into());
        property
    }

    #[test]
    fn groups() {
        let property = property();
        assert!(property.has_groups(&["A"]));
        assert!(property.has_groups(&["C", "B"]));
        assert!(!property.has_groups(&["C"]));
        assert!(!property.has_groups::<&str>(&[]));
    }

    #[test]
    fn version_range_is_inclusive() {
        let property = property();
        for version in ["1.0.0", "1.5.0", "2.0.0"] {
            assert!(property.match_version(version), "{version}");
        }
        for version in ["0.9.0", "2.0.1"] {
            assert!(!property.match_version(version), "{version}");
        }

        let open = PropertyMetadata::new("Foo", "baz");
        assert!(open.match_version("0.0.1"));
    }

    #[test]
    fn null_skip_policy() {
        let mut property = PropertyMetadata::new("Foo", "bar");
        assert!(property.allows_null_skip());
        property.typed = true;
        assert!(!property.allows_null_skip());
        property.nullable = true;
        assert!(property.allows_null_skip());
    }
}
