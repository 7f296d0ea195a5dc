use super::{AccessorError, PropertyAccessor, SharedAccessor};
use crate::object::Object;
use crate::value::Value;

/// Reads with one accessor and writes with another.
#[derive(Debug, Clone)]
pub struct DelegateAccessor {
    reader: SharedAccessor,
    writer: SharedAccessor,
}

impl DelegateAccessor {
    #[inline]
    pub fn new(reader: SharedAccessor, writer: SharedAccessor) -> Self {
        Self { reader, writer }
    }

    #[inline]
    pub fn reader(&self) -> &SharedAccessor {
        &self.reader
    }

    #[inline]
    pub fn writer(&self) -> &SharedAccessor {
        &self.writer
    }
}

impl PropertyAccessor for DelegateAccessor {
    #[inline]
    fn read(&self, object: &dyn Object) -> Result<Value, AccessorError> {
        self.reader.read(object)
    }

    #[inline]
    fn write(&self, object: &mut dyn Object, value: Value) -> Result<(), AccessorError> {
        self.writer.write(object, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;

    use crate::accessor::{NullAccessor, PublicAccessor};
    use crate::object::DynamicObject;

    #[test]
    fn reads_and_writes_separately() {
        let accessor = DelegateAccessor::new(
            Arc::new(NullAccessor),
            Arc::new(PublicAccessor::new("foo")),
        );
        let mut object = DynamicObject::std();
        accessor.write(&mut object, Value::from("bar")).unwrap();

        assert_eq!(accessor.read(&object).unwrap(), Value::Null);
        assert_eq!(object.field("foo").unwrap(), Value::from("bar"));
    }
}
