//! Not-found error types

/// A named resource the caller referred to does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    /// A folder path segment has no match under its parent.
    ///
    /// `prefix` is the already-traversed part of the path, or `(root)`.
    #[error("Segment \"{segment}\" not found under {prefix}")]
    PathSegment { segment: String, prefix: String },

    #[error("Directory with ID '{id}' not found")]
    Directory { id: String },

    /// File metadata lookup returned nothing for a key or path.
    #[error("Failed to fetch file metadata for: {reference}")]
    File { reference: String },

    /// Attachment metadata lookup returned nothing for a record.
    #[error("No attachment found for record {record_id}")]
    Attachment { record_id: String },
}
