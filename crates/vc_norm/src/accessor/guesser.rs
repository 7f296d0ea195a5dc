//! Accessor selection rules.

use alloc::string::String;
use alloc::sync::Arc;

use super::{
    AccessorConfig, AccessorSpec, ClosureAccessor, DelegateAccessor, MethodAccessor,
    PublicAccessor, ReflectionAccessor, SharedAccessor, TypedPropertyAccessor,
};
use crate::Error;
use crate::class::ClassInfo;

/// Guesses the getter of a property: a method named like the property,
/// or `get` followed by the capitalized property name.
pub fn guess_getter(class: &ClassInfo, property: &str) -> Option<String> {
    if class.has_method(property) {
        return Some(property.into());
    }
    let method = prefixed("get", property);
    class.has_method(&method).then_some(method)
}

/// Guesses the setter of a property: `set` followed by the capitalized
/// property name.
pub fn guess_setter(class: &ClassInfo, property: &str) -> Option<String> {
    let method = prefixed("set", property);
    class.has_method(&method).then_some(method)
}

fn prefixed(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    let mut method = String::from(prefix);
    if let Some(first) = chars.next() {
        method.extend(first.to_uppercase());
        method.push_str(chars.as_str());
    }
    method
}

/// Selects the accessor of a property from its getter and setter.
///
/// Two method names give a [`MethodAccessor`]. Otherwise the reader and
/// the writer are selected independently, falling back to
/// [`property_accessor`], and combined in a [`DelegateAccessor`]. A
/// read-only property only gets its reader.
pub fn method_accessor(
    class: &ClassInfo,
    property: &str,
    getter: Option<&AccessorSpec>,
    setter: Option<&AccessorSpec>,
    read_only: bool,
    config: AccessorConfig,
) -> Result<SharedAccessor, Error> {
    if let (Some(AccessorSpec::Method(getter)), Some(AccessorSpec::Method(setter))) = (getter, setter) {
        return Ok(Arc::new(MethodAccessor::new(
            class,
            property,
            Some(getter.as_str()),
            Some(setter.as_str()),
        )));
    }

    let reader: SharedAccessor = match getter {
        Some(AccessorSpec::Custom(accessor)) => accessor.clone(),
        Some(AccessorSpec::Method(method)) => {
            Arc::new(MethodAccessor::new(class, property, Some(method.as_str()), None))
        }
        None => property_accessor(class, property, config)?,
    };
    if read_only {
        return Ok(reader);
    }

    let writer: SharedAccessor = match setter {
        Some(AccessorSpec::Custom(accessor)) => accessor.clone(),
        Some(AccessorSpec::Method(method)) => {
            Arc::new(MethodAccessor::new(class, property, None, Some(method.as_str())))
        }
        None => property_accessor(class, property, config)?,
    };
    Ok(Arc::new(DelegateAccessor::new(reader, writer)))
}

/// Selects the accessor of a field, looked up in the class and its parents.
///
/// Public writable fields use a [`PublicAccessor`], other fields a
/// [`ClosureAccessor`] or a [`ReflectionAccessor`] depending on `config`.
/// Typed fields are wrapped in a [`TypedPropertyAccessor`].
pub fn property_accessor(
    class: &ClassInfo,
    property: &str,
    config: AccessorConfig,
) -> Result<SharedAccessor, Error> {
    let owner = class
        .field_owner(property)
        .ok_or_else(|| Error::UnknownProperty {
            class: class.name().into(),
            property: property.into(),
        })?;
    let field = owner
        .fields()
        .iter()
        .find(|field| field.name == property)
        .ok_or_else(|| Error::UnknownProperty {
            class: class.name().into(),
            property: property.into(),
        })?;

    let accessor: SharedAccessor = if field.is_public() && !field.readonly {
        Arc::new(PublicAccessor::new(property))
    } else if config.use_closure {
        Arc::new(ClosureAccessor::new(owner.name(), property))
    } else {
        Arc::new(ReflectionAccessor::new(owner.name(), property))
    };

    if field.is_typed() {
        return Ok(Arc::new(TypedPropertyAccessor::new(accessor, owner.name(), property)));
    }
    Ok(accessor)
}
