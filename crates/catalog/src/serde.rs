use crate::field::Field;
use crate::schema::Schema;
use heapdb_error::{errdata, errinput, Result};

/// Converts between a row of [`Field`]s and its serialized, fixed-width tuple image.
///
/// The schema is the instruction set for the bytes: fields are laid out back-to-back in column
/// order, each taking exactly `column.size()` bytes, so a serialized tuple is always
/// `schema.size()` bytes long. For example, `[1, "hi"]` under `(Integer, Varchar)` becomes
///
/// ```text
///     1_i32 -> [1, 0, 0, 0]
///     "hi"  -> [2, 0, 0, 0, 104, 105, 0, 0, ... 0]   (length prefix + 128-byte body)
/// ```
pub struct Serde {}
impl Serde {
    pub fn serialize(row: &[Field], schema: &Schema) -> Result<Vec<u8>> {
        if row.len() != schema.num_columns() {
            return errinput!(
                "row has {} fields but the schema has {} columns",
                row.len(),
                schema.num_columns()
            );
        }
        let mut bytes = Vec::with_capacity(schema.size());
        for (i, (field, column)) in row.iter().zip(schema.columns()).enumerate() {
            if field.get_type() != column.field_type() {
                return errinput!(
                    "field {} is {} but column {} expects {}",
                    i,
                    field.get_type(),
                    column,
                    column.field_type()
                );
            }
            field.write_to(&mut bytes)?;
        }
        Ok(bytes)
    }

    pub fn deserialize(bytes: &[u8], schema: &Schema) -> Result<Vec<Field>> {
        if bytes.len() != schema.size() {
            return errdata!(
                "tuple of {} bytes does not match schema size {}",
                bytes.len(),
                schema.size()
            );
        }
        let mut fields = Vec::with_capacity(schema.num_columns());
        let mut offset = 0;
        for column in schema.columns() {
            let size = column.size();
            fields.push(Field::from_bytes(
                &bytes[offset..offset + size],
                column.field_type(),
            )?);
            offset += size;
        }
        Ok(fields)
    }
}
