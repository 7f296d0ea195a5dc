use alloc::string::String;

use thiserror::Error;

use crate::accessor::AccessorError;
use crate::object::FieldError;

// -----------------------------------------------------------------------------
// Error

/// Errors raised while normalizing or denormalizing.
///
/// Apart from [`Error::Accessor`], which is only surfaced when the
/// `throws_on_accessor_error` option is set, every variant is fatal
/// for the current call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Cannot find normalizer for the class \"{class}\"")]
    NoNormalizer { class: String },

    #[error("Unknown class \"{class}\"")]
    UnknownClass { class: String },

    #[error("No field \"{property}\" found in the class \"{class}\" or its parents")]
    UnknownProperty { class: String, property: String },

    #[error("Method {class}::{method}() does not exist or is not a hook")]
    UnknownMethod { class: String, method: String },

    #[error(
        "A circular reference has been detected when serializing the object of class \"{class}\" (configured limit: {limit})"
    )]
    CircularReference { class: String, limit: usize },

    #[error(transparent)]
    Accessor(#[from] AccessorError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Could not instantiate object '{class}'")]
    Instantiation { class: String },

    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    #[error("Objects cannot be encoded, normalize the value first")]
    Unencodable,

    #[error("JSON codec failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding failed: {0}")]
    BinaryEncode(#[from] bincode::error::EncodeError),

    #[error("Binary decoding failed: {0}")]
    BinaryDecode(#[from] bincode::error::DecodeError),
}

impl Error {
    #[inline]
    pub(crate) fn no_normalizer(class: &str) -> Self {
        Self::NoNormalizer {
            class: class.into(),
        }
    }

    #[inline]
    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedValue(message.into())
    }
}
