use sqlflow_core::types::DataType;
use sqlflow_error::CompilerError;

#[derive(Debug, thiserror::Error)]
pub enum TableParseError {
    #[error("Row has {found} columns, but expected {expected}: '{line}'")]
    ColumnCount {
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("Null value in non-nullable column of type {0}")]
    NullInNonNullable(DataType),

    #[error("Expected NULL or a space: '{0}'")]
    ExpectedNullOrSpace(String),

    #[error("Could not parse '{value}' as {datatype}")]
    InvalidValue { datatype: DataType, value: String },

    #[error("Could not parse interval '{0}'")]
    InvalidInterval(String),

    #[error("Expected array constant to be bracketed: '{0}'")]
    UnbracketedArray(String),

    #[error("Columns of type {0} are not supported")]
    UnsupportedType(DataType),

    #[error("Row type must be a tuple, got {0}")]
    NotATuple(DataType),

    #[error("Could not find end of header for table")]
    MissingHeaderEnd,

    #[error(transparent)]
    Compiler(#[from] CompilerError),
}

pub type Result<T, E = TableParseError> = std::result::Result<T, E>;

impl From<TableParseError> for CompilerError {
    fn from(value: TableParseError) -> Self {
        match value {
            TableParseError::Compiler(e) => e,
            other => CompilerError::with_source("Failed to parse expected results", Box::new(other)),
        }
    }
}
