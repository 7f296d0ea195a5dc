mod class;
mod property;

pub use class::ClassMetadataBuilder;
pub use property::PropertyMetadataBuilder;
