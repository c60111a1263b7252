//! The single error sum type returned by every fallible operation in this crate.

pub type Result<T> = std::result::Result<T, Error>;
pub type UnitResult = Result<()>;

pub use std::io::Error as IoError;

/// Every way a load, a projection or a validation can fail.
///
/// No exceptions escape a component boundary: everything comes back through this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("interop file not found: {0}")]
    MissingFile(String),

    #[error("run folder at {0} contains no metric family files")]
    EmptyInterop(String),

    #[error("bad format in {file}: {reason}")]
    BadFormat { file: String, reason: String },

    #[error("{file} ends mid-record at byte offset {offset}")]
    IncompleteRecord { file: String, offset: usize },

    #[error("{xml_path} is missing required element `{element}`")]
    MissingRequiredElement { xml_path: String, element: String },

    #[error("malformed xml in {file} at line {line}, column {column}: {message}")]
    MalformedXml { file: String, line: usize, column: usize, message: String },

    #[error("invalid run info: {0}")]
    InvalidRunInfo(String),

    #[error("could not determine tile naming method: {0}")]
    InvalidTilingMethod(String),

    #[error("invalid metric type for this projection: {0}")]
    InvalidMetricType(String),

    #[error("invalid channel index {index} (channel count is {count})")]
    InvalidChannel { index: usize, count: usize },

    #[error("invalid filter option for dimension `{dimension}`: {reason}")]
    InvalidFilterOption { dimension: &'static str, reason: String },

    #[error("index {index} out of bounds for {container} (size {size})")]
    IndexOutOfBounds { container: &'static str, index: usize, size: usize },

    #[error("invalid column type: {0}")]
    InvalidColumnType(String),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidRunInfo(message.into())
    }

    pub fn bad_format(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BadFormat { file: file.into(), reason: reason.into() }
    }
}

/// The stable process-exit-code mapping from §6.3. A CLI collaborator maps `Result<T, Error>`
/// to a process exit status through this function instead of re-deriving the table itself.
///
/// `IndexOutOfBounds` sits in the 1 (invalid arguments) bucket alongside `InvalidFilterOption`
/// and `InvalidMetricType` rather than getting a code of its own: §7 groups all three as
/// validation-time errors raised at projection time with the offending inputs, and 5 is reserved
/// for `EmptyInterop`.
pub fn exit_code(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(error) => match error {
            Error::InvalidFilterOption { .. }
            | Error::InvalidMetricType(_)
            | Error::IndexOutOfBounds { .. } => 1,
            Error::BadFormat { .. } | Error::InvalidColumnType(_) => 2,
            Error::MissingFile(_) => 3,
            Error::IncompleteRecord { .. } => 4,
            Error::EmptyInterop(_) => 5,
            Error::MalformedXml { .. } | Error::MissingRequiredElement { .. } => 6,
            Error::InvalidRunInfo(_) | Error::InvalidTilingMethod(_)
            | Error::InvalidChannel { .. } | Error::Io(_) => 7,
        },
    }
}
