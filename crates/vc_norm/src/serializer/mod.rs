//! The [`Serializer`] facade.
//!
//! The serializer walks values: scalars are kept, lists and maps are
//! converted item by item and objects are handed to the normalizer of
//! their class. Normalized values can then be encoded as JSON or binary.
//!
//! ## Menu
//!
//! - [`Serializer`]: normalization, denormalization and codecs.
//! - [`SerializerBuilder`]: registry, metadata sources, normalizers and
//!   default options.
//! - [`Format`], [`Payload`]: the encoded forms of a value.

// -----------------------------------------------------------------------------
// Modules

mod builder;

// -----------------------------------------------------------------------------
// Exports

pub use builder::SerializerBuilder;

// -----------------------------------------------------------------------------
// Serializer

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::Error;
use crate::class::ClassRegistryArc;
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::metadata::MetadataFactory;
use crate::normalizer::NormalizerLoader;
use crate::object::ObjectRef;
use crate::types::Type;
use crate::value::{self, Map, Options, Value};

/// The encoded forms of a normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Binary,
    /// The structural value itself.
    Array,
}

/// A serialized value, in one of the [`Format`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(String),
    Binary(Vec<u8>),
    Array(Value),
}

impl Payload {
    #[inline]
    pub fn format(&self) -> Format {
        match self {
            Self::Json(_) => Format::Json,
            Self::Binary(_) => Format::Binary,
            Self::Array(_) => Format::Array,
        }
    }
}

/// Converts object graphs to structural values and back.
///
/// Every call builds its context from the default options of the
/// serializer, overridden by the options of the call.
///
/// # Examples
///
/// ```
/// use vc_norm::prelude::*;
///
/// let serializer = Serializer::builder()
///     .register(
///         ClassInfo::new("App\\Point")
///             .with_field(FieldInfo::new("x").public().typed("int"))
///             .with_field(FieldInfo::new("y").public().typed("int")),
///     )
///     .build();
///
/// let point = serializer
///     .denormalize(Value::from_iter([("x", "1"), ("y", "2")]), "App\\Point", &Options::new())
///     .unwrap();
/// let json = serializer.to_json(&point, &Options::new()).unwrap();
///
/// assert_eq!(json, r#"{"x":1,"y":2}"#);
/// ```
pub struct Serializer {
    registry: ClassRegistryArc,
    loader: NormalizerLoader,
    factory: Arc<MetadataFactory>,
    normalization_options: Options,
    denormalization_options: Options,
}

impl Serializer {
    /// Pretty prints JSON output when set.
    pub const JSON_PRETTY: &'static str = "json_pretty";

    #[inline]
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &ClassRegistryArc {
        &self.registry
    }

    #[inline]
    pub fn loader(&self) -> &NormalizerLoader {
        &self.loader
    }

    #[inline]
    pub fn metadata_factory(&self) -> &Arc<MetadataFactory> {
        &self.factory
    }

    /// Every value can be serialized, objects without normalizer fail
    /// when they are reached.
    #[inline]
    pub fn supports(&self, _value: &Value) -> bool {
        true
    }

    /// A normalization context for a top-level call.
    pub fn normalization_context(&self, options: &Options) -> NormalizationContext<'_> {
        NormalizationContext::new(self, &self.normalization_options)
            .duplicate(Some(options))
            .into_owned()
    }

    /// A denormalization context for a top-level call.
    pub fn denormalization_context(&self, options: &Options) -> DenormalizationContext<'_> {
        DenormalizationContext::new(self, &self.denormalization_options)
            .duplicate(Some(options))
            .into_owned()
    }

    // -------------------------------------------------------------------------
    // Normalization

    pub fn normalize(&self, value: &Value, options: &Options) -> Result<Value, Error> {
        let context = self.normalization_context(options);
        self.normalize_with(value, &context)
    }

    /// Normalizes `value` within an ongoing call.
    ///
    /// With `include_type`, normalized objects are wrapped as
    /// `{"@type": class, "data": value}`.
    pub fn normalize_with(&self, value: &Value, context: &NormalizationContext<'_>) -> Result<Value, Error> {
        match value {
            Value::List(list) => list
                .iter()
                .map(|item| self.normalize_with(item, context))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Value::Map(map) => {
                let mut normalized = Map::new();
                for (key, item) in map {
                    normalized.insert(key.clone(), self.normalize_with(item, context)?);
                }
                Ok(Value::Map(normalized))
            }
            Value::Object(object) => {
                let class = object.class_name();
                let normalized = self.loader.get_normalizer(&class)?.normalize(object, context)?;
                if !context.include_meta_type() {
                    return Ok(normalized);
                }
                Ok(Value::from_iter([
                    ("@type", Value::String(class)),
                    ("data", normalized),
                ]))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    // -------------------------------------------------------------------------
    // Denormalization

    /// Denormalizes `data` as the type expression `ty`.
    ///
    /// Data tagged with `@type` is denormalized as the tagged type, an
    /// empty expression lets the data decide.
    pub fn denormalize(&self, data: Value, ty: &str, options: &Options) -> Result<Value, Error> {
        let context = self.denormalization_context(options);
        self.denormalize_with(data, &Type::create(ty), None, &context)
    }

    /// Denormalizes `data` into an existing object.
    pub fn denormalize_into(&self, data: Value, target: ObjectRef, options: &Options) -> Result<Value, Error> {
        let context = self.denormalization_context(options);
        let ty = Type::create(&target.class_name());
        self.denormalize_with(data, &ty, Some(target), &context)
    }

    /// Denormalizes `data` within an ongoing call, hydrating `target`
    /// when given.
    pub fn denormalize_with(
        &self,
        mut data: Value,
        ty: &Type,
        target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error> {
        if data.is_null() || data.is_object() {
            return Ok(data);
        }

        let ty = ty.hint(&mut data);
        if ty.is_collection() {
            let item_type = ty.sub_type().cloned().unwrap_or_default();
            return match data.cast_collection() {
                Value::Map(map) => {
                    let mut denormalized = Map::new();
                    for (key, item) in map {
                        denormalized.insert(key, self.denormalize_with(item, &item_type, None, context)?);
                    }
                    Ok(Value::Map(denormalized))
                }
                collection => collection
                    .into_entries()
                    .into_iter()
                    .map(|(_, item)| self.denormalize_with(item, &item_type, None, context))
                    .collect::<Result<_, _>>()
                    .map(Value::List),
            };
        }
        if ty.is_builtin() {
            return Ok(ty.convert(data));
        }

        self.loader
            .get_normalizer(ty.name())?
            .denormalize(data, &ty, target, context)
    }

    // -------------------------------------------------------------------------
    // Formats

    #[inline]
    pub fn to_array(&self, value: &Value, options: &Options) -> Result<Value, Error> {
        self.normalize(value, options)
    }

    #[inline]
    pub fn from_array(&self, data: Value, ty: &str, options: &Options) -> Result<Value, Error> {
        self.denormalize(data, ty, options)
    }

    /// Normalizes and encodes `value` as JSON, indented with the
    /// `json_pretty` option.
    pub fn to_json(&self, value: &Value, options: &Options) -> Result<String, Error> {
        let normalized = self.normalize(value, options)?;
        if options.get(Self::JSON_PRETTY).is_some_and(Value::cast_bool) {
            return value::to_json_pretty(&normalized);
        }
        value::to_json(&normalized)
    }

    pub fn from_json(&self, json: &str, ty: &str, options: &Options) -> Result<Value, Error> {
        self.denormalize(value::from_json(json)?, ty, options)
    }

    pub fn to_binary(&self, value: &Value, options: &Options) -> Result<Vec<u8>, Error> {
        value::to_binary(&self.normalize(value, options)?)
    }

    pub fn from_binary(&self, bytes: &[u8], ty: &str, options: &Options) -> Result<Value, Error> {
        self.denormalize(value::from_binary(bytes)?, ty, options)
    }

    pub fn serialize(&self, value: &Value, format: Format, options: &Options) -> Result<Payload, Error> {
        Ok(match format {
            Format::Json => Payload::Json(self.to_json(value, options)?),
            Format::Binary => Payload::Binary(self.to_binary(value, options)?),
            Format::Array => Payload::Array(self.to_array(value, options)?),
        })
    }

    pub fn deserialize(&self, payload: Payload, ty: &str, options: &Options) -> Result<Value, Error> {
        match payload {
            Payload::Json(json) => self.from_json(&json, ty, options),
            Payload::Binary(bytes) => self.from_binary(&bytes, ty, options),
            Payload::Array(data) => self.from_array(data, ty, options),
        }
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("loader", &self.loader)
            .field("normalization_options", &self.normalization_options)
            .field("denormalization_options", &self.denormalization_options)
            .finish_non_exhaustive()
    }
}
