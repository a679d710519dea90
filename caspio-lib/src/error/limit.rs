//! Safety-bound error types

/// A pagination or traversal bound was reached before the work was complete.
///
/// These are always fatal: partial results are discarded rather than returned
/// as if they were complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitExceededError {
    /// The backend kept signalling more data after `max_pages` fetches.
    #[error("Pagination did not terminate after {max_pages} pages")]
    Pages { max_pages: usize },

    #[error("Maximum folder depth of {max_depth} levels exceeded")]
    Depth { max_depth: usize },

    #[error("Maximum item count of {max_count} exceeded")]
    Count { max_count: usize },
}
