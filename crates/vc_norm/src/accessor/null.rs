use super::{AccessorError, PropertyAccessor};
use crate::object::Object;
use crate::value::Value;

/// Reads `null` and ignores writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAccessor;

impl PropertyAccessor for NullAccessor {
    #[inline]
    fn read(&self, _object: &dyn Object) -> Result<Value, AccessorError> {
        Ok(Value::Null)
    }

    #[inline]
    fn write(&self, _object: &mut dyn Object, _value: Value) -> Result<(), AccessorError> {
        Ok(())
    }
}
