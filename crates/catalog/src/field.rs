use crate::types::{Type, STRING_LEN};
use bytes::{Buf, BufMut};
use heapdb_error::{errdata, errinput, Result};

/// A materialized value of one tuple field.
///
/// Tuple data travels around as bytes; a `Field` is what a single value of that data looks like
/// once it is decoded with its column's [`Type`]. On disk every field takes exactly
/// `field.get_type().size()` bytes:
///
/// ```
/// use heapdb_catalog::field::Field;
/// use heapdb_catalog::types::Type;
///
/// let mut payload = Vec::new();
/// Field::Integer(7).write_to(&mut payload).unwrap();
/// Field::Varchar("hi".into()).write_to(&mut payload).unwrap();
/// assert_eq!(payload.len(), Type::Integer.size() + Type::Varchar.size());
/// ```
#[derive(Debug, Clone)]
pub enum Field {
    Null,
    Boolean(bool),
    Integer(i32),
    Float(f64),
    Varchar(String),
}

impl Field {
    /// Appends the fixed-width encoding of this field to `buf`.
    ///
    /// Integers and floats are written **little-endian**. A varchar is written as its byte
    /// length (u32, little-endian) followed by its bytes, zero-padded to [`STRING_LEN`].
    pub fn write_to(&self, buf: &mut impl BufMut) -> Result<()> {
        match self {
            Field::Null => {}
            Field::Boolean(value) => buf.put_u8(u8::from(*value)),
            Field::Integer(value) => buf.put_i32_le(*value),
            Field::Float(value) => buf.put_f64_le(*value),
            Field::Varchar(string) => {
                let bytes = string.as_bytes();
                if bytes.len() > STRING_LEN {
                    return errinput!(
                        "varchar of {} bytes exceeds the {} byte limit",
                        bytes.len(),
                        STRING_LEN
                    );
                }
                buf.put_u32_le(bytes.len() as u32);
                buf.put_slice(bytes);
                buf.put_bytes(0, STRING_LEN - bytes.len());
            }
        }
        Ok(())
    }

    /// Decodes a field of type `field_type` from exactly `field_type.size()` bytes.
    pub fn from_bytes(mut bytes: &[u8], field_type: Type) -> Result<Self> {
        if bytes.len() != field_type.size() {
            return errdata!(
                "{} field needs {} bytes, got {}",
                field_type,
                field_type.size(),
                bytes.len()
            );
        }
        let field = match field_type {
            Type::Null => Field::Null,
            Type::Boolean => Field::Boolean(bytes.get_u8() != 0),
            Type::Integer => Field::Integer(bytes.get_i32_le()),
            Type::Float => Field::Float(bytes.get_f64_le()),
            Type::Varchar => {
                let len = bytes.get_u32_le() as usize;
                if len > STRING_LEN {
                    return errdata!("varchar length {} exceeds {}", len, STRING_LEN);
                }
                Field::Varchar(String::from_utf8(bytes[..len].to_vec())?)
            }
        };
        Ok(field)
    }

    /// Returns the corresponding [`crate::types::Type`] for the given field.
    pub fn get_type(&self) -> Type {
        match self {
            Field::Null => Type::Null,
            Field::Boolean(_) => Type::Boolean,
            Field::Integer(_) => Type::Integer,
            Field::Float(_) => Type::Float,
            Field::Varchar(_) => Type::Varchar,
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::Null
    }
}

impl From<bool> for Field {
    fn from(b: bool) -> Self {
        Field::Boolean(b)
    }
}

impl From<i32> for Field {
    fn from(i: i32) -> Self {
        Field::Integer(i)
    }
}

impl From<f64> for Field {
    fn from(f: f64) -> Self {
        Field::Float(f)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Varchar(s.to_owned())
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Field::Null, Field::Null) => true,
            (Field::Boolean(a), Field::Boolean(b)) => a.eq(b),
            (Field::Integer(a), Field::Integer(b)) => a.eq(b),
            (Field::Varchar(a), Field::Varchar(b)) => a.eq(b),
            (Field::Float(a), Field::Float(b)) => {
                // Match on NaN, in addition to equality, for floats.
                a.eq(b) || (a.is_nan() && b.is_nan())
            }
            _ => false,
        }
    }
}
impl Eq for Field {}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Field::Null, Field::Null) => Ordering::Equal,
            // Nothing is less than something.
            (Field::Null, _) => Ordering::Less,
            (_, Field::Null) => Ordering::Greater,
            (Field::Boolean(a), Field::Boolean(b)) => a.cmp(b),
            (Field::Integer(a), Field::Integer(b)) => a.cmp(b),
            (Field::Varchar(a), Field::Varchar(b)) => a.cmp(b),
            // Per IEEE standard, NaN should not be comparable to anything (including itself).
            // But we still might need to query for it, so we're going to pretend it's comparable.
            (Field::Float(a), Field::Float(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            },
            _ => unimplemented!(
                "Different value types should not be compared, with the exception of NULL."
            ),
        }
    }
}
impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Integer(i) => i.fmt(f),
            Self::Float(float) => float.fmt(f),
            Self::Varchar(varchar) => write!(f, "{}", varchar.escape_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::field::Field;
    use crate::types::{Type, STRING_LEN};
    use heapdb_error::{assert_errors, Error};

    #[test]
    fn test_creation() {
        assert_eq!(Field::Null, Field::default());
        assert_eq!(Field::Boolean(true), true.into());
        assert_eq!(Field::Integer(i32::MIN), i32::MIN.into());
        assert_eq!(Field::Float(f64::NAN), f64::NAN.into());
        for text in ["Hello, world", "", "All love 🛸💕🕺"] {
            assert_eq!(Field::Varchar(text.into()), text.into());
        }
    }

    #[test]
    fn test_equality() {
        assert_eq!(Field::Null, Field::Null);
        assert_ne!(Field::Null, Field::Integer(0));
        assert_ne!(Field::Integer(0), Field::Float(0.0));
        assert_ne!(Field::Integer(0), Field::Varchar("0".into()));
        assert_eq!(Field::Float(f64::NAN), Field::Float(f64::NAN));
        assert_ne!(Field::Float(0.0), Field::Float(f64::NAN));
    }

    #[test]
    fn test_comparison() {
        // NULL is less than any non-null field.
        assert!(Field::Integer(0) > Field::Null);
        assert!(Field::Null < Field::Varchar("".into()));

        assert!(Field::Integer(-1) < Field::Integer(2));
        assert!(Field::Float(0.0) > Field::Float(-1.2));
        assert!(Field::Float(f64::NAN) < Field::Float(f64::NEG_INFINITY));
        assert!(Field::Varchar("a".into()) < Field::Varchar("b".into()));

        // Comparing non-null fields of different data types panics.
        assert_errors!(Field::Boolean(false) < Field::Integer(0));
        assert_errors!(Field::Float(0.0) < Field::Varchar("0".into()));
    }

    #[test]
    fn test_fixed_width_encoding() {
        let cases = [
            Field::Null,
            Field::Boolean(true),
            Field::Integer(-123456789),
            Field::Float(339.339),
            Field::Varchar("All love 🛸💕🕺".into()),
        ];
        for field in cases {
            let mut bytes = Vec::new();
            field.write_to(&mut bytes).unwrap();
            assert_eq!(bytes.len(), field.get_type().size());
            assert_eq!(Field::from_bytes(&bytes, field.get_type()), Ok(field));
        }
    }

    #[test]
    fn test_varchar_layout() {
        let mut bytes = Vec::new();
        Field::Varchar("hey".into()).write_to(&mut bytes).unwrap();
        assert_eq!(&bytes[..4], &[3, 0, 0, 0]);
        assert_eq!(&bytes[4..7], b"hey");
        assert!(bytes[7..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encoding_errors() {
        let too_long = Field::Varchar("x".repeat(STRING_LEN + 1));
        assert!(matches!(
            too_long.write_to(&mut Vec::new()),
            Err(Error::InvalidInput(_))
        ));

        // Wrong byte counts are rejected instead of panicking.
        assert!(matches!(
            Field::from_bytes(&[1, 2], Type::Integer),
            Err(Error::InvalidData(_))
        ));

        // So are corrupt varchar length prefixes.
        let mut corrupt = vec![0xff; 4];
        corrupt.extend(vec![0; STRING_LEN]);
        assert!(matches!(
            Field::from_bytes(&corrupt, Type::Varchar),
            Err(Error::InvalidData(_))
        ));
    }
}
