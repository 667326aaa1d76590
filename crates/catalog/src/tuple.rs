use crate::field::Field;
use crate::schema::Schema;
use crate::serde::Serde;
use bytes::Bytes;
use heapdb_error::Result;

/// A tuple's serialized image. Its layout is only meaningful together with the [`Schema`] it
/// was written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    data: Bytes,
}

impl Tuple {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// Serializes `row` under `schema` into a new tuple.
    pub fn from_fields(row: &[Field], schema: &Schema) -> Result<Self> {
        Ok(Self::new(Serde::serialize(row, schema)?.into()))
    }

    pub fn data(&self) -> Bytes {
        // Note this does not copy all the tuple data over into a new container; rather, it returns
        // a reference-counted pointer to the existing container, incrementing the reference count.
        Bytes::clone(&self.data)
    }

    pub fn tuple_size(&self) -> usize {
        self.data.len()
    }

    /// Decodes the tuple's fields under `schema`.
    pub fn fields(&self, schema: &Schema) -> Result<Vec<Field>> {
        Serde::deserialize(&self.data, schema)
    }
}
