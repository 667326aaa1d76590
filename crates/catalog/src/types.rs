/// The number of bytes reserved for the body of a [`Type::Varchar`] value. Longer strings are
/// rejected by the codec rather than truncated.
pub const STRING_LEN: usize = 128;

/// An exhaustive enumeration of all the data types of a [`crate::field::Field`] object.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Type {
    Null,
    Boolean,
    Integer,
    Float,
    Varchar,
}

impl Type {
    /// Returns the fixed byte width of a value of this type inside a tuple.
    ///
    /// Every type has one, including strings: a varchar occupies a 4-byte length prefix and a
    /// zero-padded body of [`STRING_LEN`] bytes, so that all tuples of a schema share one size.
    pub fn size(&self) -> usize {
        match self {
            Type::Null => 0,
            Type::Boolean => 1,
            // We work with i32's, which are 4 bytes.
            Type::Integer => 4,
            // We work with f64's, which are 8 bytes.
            Type::Float => 8,
            Type::Varchar => size_of::<u32>() + STRING_LEN,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Type, STRING_LEN};

    #[test]
    fn test_type_widths() {
        assert_eq!(Type::Null.size(), 0);
        assert_eq!(Type::Boolean.size(), 1);
        assert_eq!(Type::Integer.size(), size_of::<i32>());
        assert_eq!(Type::Float.size(), size_of::<f64>());
        assert_eq!(Type::Varchar.size(), 4 + STRING_LEN);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Integer.to_string(), "Integer");
        assert_eq!(Type::Varchar.to_string(), "Varchar");
    }
}
