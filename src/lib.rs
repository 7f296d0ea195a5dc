#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_norm as norm;
pub use vc_utils as utils;

pub use vc_norm::{Serializer, SerializerBuilder};
