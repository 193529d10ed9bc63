use thiserror::Error;

use crate::db::StoreError;

/// Everything the record store can refuse to do. The messages are shown to the
/// user verbatim.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Please fill in all fields correctly.")]
    MissingFields,

    #[error("Please enter values that produce at least one segment.")]
    NoSegments,

    #[error("There is no data to export.")]
    NothingToExport,

    #[error("Could not read the file: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error("Invalid file format: expected a list of records.")]
    NotAnArray,

    #[error("Could not encode records: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
