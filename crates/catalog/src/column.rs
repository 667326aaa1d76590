use crate::types::Type;

/// A field descriptor: the type of one tuple field plus its optional name.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Column {
    /// The name of this column, or `None` for an anonymous field.
    name: Option<String>,
    /// This column value's type.
    field_type: Type,
}

impl Column {
    pub fn new(name: impl Into<String>, field_type: Type) -> Self {
        Column {
            name: Some(name.into()),
            field_type,
        }
    }

    /// Creates an unnamed column of the given type.
    pub fn anonymous(field_type: Type) -> Self {
        Column {
            name: None,
            field_type,
        }
    }

    /// Returns the name of this column, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the `field_type` of the column.
    pub fn field_type(&self) -> Type {
        self.field_type
    }

    /// Returns the fixed byte size of this column's field data.
    pub fn size(&self) -> usize {
        self.field_type.size()
    }
}

/// Renders as `name(type)`, with `null` standing in for a missing name.
impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({})",
            self.name().unwrap_or("null"),
            self.field_type
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::column::Column;
    use crate::types::Type;

    #[test]
    fn test_column_size() {
        assert_eq!(with_type(Type::Null).size(), 0);
        assert_eq!(with_type(Type::Boolean).size(), 1);
        assert_eq!(with_type(Type::Integer).size(), size_of::<i32>());
        assert_eq!(with_type(Type::Float).size(), size_of::<f64>());
        assert_eq!(with_type(Type::Varchar).size(), Type::Varchar.size());
    }

    #[test]
    fn test_anonymous() {
        let column = Column::anonymous(Type::Integer);
        assert!(column.name().is_none());
        assert_eq!(column.to_string(), "null(Integer)");
        assert_eq!(with_type(Type::Float).to_string(), "TestColumn(Float)");
    }

    #[test]
    fn test_equality() {
        let column = Column::new("TestColumn", Type::Integer);

        // Two columns are equal if, and only if, all their fields are the same.
        assert_eq!(column.clone(), column);
        assert_ne!(Column::new("OtherColumn", Type::Integer), column);
        assert_ne!(Column::new("TestColumn", Type::Float), column);

        // A named column never equals an anonymous one of the same type.
        assert_ne!(Column::anonymous(Type::Integer), column);
    }

    fn with_type(field_type: Type) -> Column {
        Column::new("TestColumn", field_type)
    }
}
