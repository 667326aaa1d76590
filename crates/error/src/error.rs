pub type Result<T> = std::result::Result<T, Error>;
impl<T> From<Error> for Result<T> {
    fn from(e: Error) -> Self {
        Err(e)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Invalid data, which typically includes decoding errors or unexpected internal values.
    InvalidData(String),
    /// Invalid user input, e.g. a malformed schema or a page handed to the wrong file.
    InvalidInput(String),
    /// An IO error has occurred.
    IO(String),
    /// A page read came back with fewer bytes than a full page.
    ShortRead {
        file_id: u32,
        page_number: u32,
        expected: usize,
        actual: usize,
    },
    /// The requested page lies outside `[0, page_count)` of its heap file.
    PageNotFound { file_id: u32, page_number: u32 },
    /// A cursor was asked for a tuple after it ran out of them.
    Exhausted,
    /// A schema was indexed past its last column.
    ColumnIndexOutOfRange { index: usize, count: usize },
    /// No column in the schema carries the given name.
    ColumnNotFound(String),
    /// No heap file with the given id is registered with the page cache.
    UnknownFile(u32),
    /// The page is locked by another transaction in a conflicting mode.
    LockConflict { file_id: u32, page_number: u32 },
    /// An out-of-bounds access has occurred.
    OutOfBounds,
    /// A buffer pool error has occured.
    BufferPoolError(String),
}

impl std::error::Error for Error {}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::IO(msg) => write!(f, "IO error: {}", msg),
            Error::ShortRead {
                file_id,
                page_number,
                expected,
                actual,
            } => write!(
                f,
                "Short read of page {} in heap file {}: expected {} bytes, got {}",
                page_number, file_id, expected, actual
            ),
            Error::PageNotFound {
                file_id,
                page_number,
            } => write!(
                f,
                "Heap file {} does not contain page {}",
                file_id, page_number
            ),
            Error::Exhausted => write!(f, "No more tuples to iterate over"),
            Error::ColumnIndexOutOfRange { index, count } => write!(
                f,
                "Column index {} out of range for a schema with {} columns",
                index, count
            ),
            Error::ColumnNotFound(name) => write!(f, "No column named {:?}", name),
            Error::UnknownFile(file_id) => write!(f, "Unknown heap file {}", file_id),
            Error::LockConflict {
                file_id,
                page_number,
            } => write!(
                f,
                "Page {} of heap file {} is locked by another transaction",
                page_number, file_id
            ),
            Error::OutOfBounds => write!(f, "Out of bounds"),
            Error::BufferPoolError(msg) => write!(f, "Buffer error: {}", msg),
        }
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(e: std::array::TryFromSliceError) -> Self {
        Error::InvalidData(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IO(e.to_string())
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(e: std::num::TryFromIntError) -> Self {
        Error::InvalidData(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::InvalidData(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        // This occurs when a different thread panics when holding a mutex. Since this is
        // fatal, we should panic here too.
        panic!("{e}")
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display_carries_context() {
        let short = Error::ShortRead {
            file_id: 7,
            page_number: 3,
            expected: 4096,
            actual: 100,
        };
        let rendered = short.to_string();
        assert!(rendered.contains("page 3"));
        assert!(rendered.contains("heap file 7"));
        assert!(rendered.contains("100"));

        let missing = Error::PageNotFound {
            file_id: 9,
            page_number: 0,
        };
        assert_eq!(missing.to_string(), "Heap file 9 does not contain page 0");

        let out_of_range = Error::ColumnIndexOutOfRange { index: 4, count: 2 };
        assert!(out_of_range.to_string().contains("4"));
        assert_eq!(
            Error::ColumnNotFound("id".to_string()).to_string(),
            "No column named \"id\""
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        match Error::from(io) {
            Error::IO(msg) => assert!(msg.contains("gone")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_macros_build_errors() {
        let data: crate::Result<()> = crate::errdata!("bad byte {}", 3);
        assert_eq!(data, Err(Error::InvalidData("bad byte 3".to_string())));
        let input: crate::Result<()> = crate::errinput!("bad column {}", "x");
        assert_eq!(input, Err(Error::InvalidInput("bad column x".to_string())));
    }
}
