use crate::column::Column;
use crate::types::Type;
use heapdb_error::{errinput, Error, Result};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type SchemaRef = Arc<Schema>;

/// Characters that delimit the canonical rendering and so may not appear in column names.
const RESERVED_NAME_CHARS: [char; 4] = ['[', ']', '(', ')'];

/// The schema of a tuple, a.k.a. its tuple descriptor: the ordered field descriptors that define
/// the layout of every tuple stored under it.
///
/// A schema is immutable once built. Its byte size is fixed at construction, so every tuple
/// sharing the schema has the same size.
#[derive(Debug, Clone)]
pub struct Schema {
    /// The column definitions of the tuple's values, in order. Never empty.
    columns: Vec<Column>,
    /// The byte size of a tuple, i.e. the sum of the fixed widths of its columns' types.
    size: usize,
}

impl Schema {
    /// Builds a schema from column definitions. A schema must have at least one column, and no
    /// column name may contain `[`, `]`, `(` or `)`.
    pub fn new(columns: &[Column]) -> Result<Self> {
        if columns.is_empty() {
            return errinput!("a schema must contain at least one column");
        }
        if let Some(name) = columns
            .iter()
            .filter_map(Column::name)
            .find(|name| name.contains(RESERVED_NAME_CHARS))
        {
            return errinput!("column name {name:?} contains one of [ ] ( )");
        }
        let columns = columns.to_vec();
        let size = columns.iter().map(Column::size).sum();
        Ok(Schema { columns, size })
    }

    /// Builds a schema from parallel slices of types and (possibly absent) names.
    pub fn from_types(types: &[Type], names: &[Option<&str>]) -> Result<Self> {
        if types.len() != names.len() {
            return errinput!(
                "got {} column types but {} column names",
                types.len(),
                names.len()
            );
        }
        let columns = types
            .iter()
            .zip(names)
            .map(|(ty, name)| match name {
                Some(name) => Column::new(*name, *ty),
                None => Column::anonymous(*ty),
            })
            .collect::<Vec<_>>();
        Self::new(&columns)
    }

    /// Builds a schema of unnamed columns with the given types.
    pub fn anonymous(types: &[Type]) -> Result<Self> {
        let columns = types
            .iter()
            .map(|ty| Column::anonymous(*ty))
            .collect::<Vec<_>>();
        Self::new(&columns)
    }

    /// Returns a new schema holding the columns of `first` followed by those of `second`.
    /// Neither operand is modified.
    pub fn merge(first: &Schema, second: &Schema) -> Schema {
        let mut columns = Vec::with_capacity(first.num_columns() + second.num_columns());
        columns.extend_from_slice(&first.columns);
        columns.extend_from_slice(&second.columns);
        Schema {
            columns,
            size: first.size + second.size,
        }
    }

    /// Returns an immutable view of the columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Given an index `i`, retrieves a reference to the schema's `i`-th column (if it exists).
    pub fn column_at(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or(Error::ColumnIndexOutOfRange {
                index,
                count: self.columns.len(),
            })
    }

    /// Returns the (possibly absent) name of the `i`-th column.
    pub fn column_name(&self, index: usize) -> Result<Option<&str>> {
        Ok(self.column_at(index)?.name())
    }

    /// Returns the type of the `i`-th column.
    pub fn column_type(&self, index: usize) -> Result<Type> {
        Ok(self.column_at(index)?.field_type())
    }

    /// Looks up the index of the column with the given name. If more than one column has the
    /// name, returns the index of the first such column. Anonymous columns never match.
    pub fn column_index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|col| col.name() == Some(name))
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Returns the number of columns in the schema.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the byte size of every tuple with this schema.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sums `17 * h(c)` over the canonical strings `c` of the columns.
    ///
    /// Each column string is hashed on its own, without its position. Names cannot contain the
    /// rendering's delimiters, so equal renderings mean equal columns in equal order and this
    /// agrees with [`PartialEq`].
    pub fn hash_code(&self) -> u64 {
        self.columns.iter().fold(0u64, |acc, column| {
            acc.wrapping_add(fnv1a(column.to_string().as_bytes()).wrapping_mul(17))
        })
    }
}

/// Deterministic 64-bit FNV-1a, so schema hashes are stable across runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3_u64);
    }
    hash
}

/// Two schemas are equal iff their canonical renderings match, so names and positions count
/// as well as types.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

/// The canonical rendering `type[0](name[0])type[1](name[1])...`.
impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            write!(
                f,
                "{}[{}]({}[{}])",
                column.field_type(),
                i,
                column.name().unwrap_or("null"),
                i
            )?;
        }
        Ok(())
    }
}
