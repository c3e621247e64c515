use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// The line opened with `{` but was not a valid structured record.
    #[error("invalid sensor record: {0}")]
    InvalidRecord(String),
    /// No recognizable key/value pair anywhere in the line.
    #[error("no recognizable sensor fields in line: {0:?}")]
    UnrecognizedLine(String),
}
