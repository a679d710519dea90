//! Per-item batch processing
//!
//! Operations that take a list of inputs (records to create, selectors to
//! delete, ...) run one item at a time through [`run_items`].
//!
//! # Example
//!
//! ```ignore
//! let outcomes = run_items(records, true, |_, record| {
//!     create_record(&client, &source, record, &CreateOptions::default())
//! })
//! .await?;
//!
//! for outcome in &outcomes {
//!     if let ItemOutcome::Failed { message, .. } = outcome {
//!         eprintln!("{message}");
//!     }
//! }
//! ```

use std::future::Future;

use crate::error::Error;

/// Result of one batch item.
#[derive(Debug)]
pub enum ItemOutcome<O> {
    Ok(O),
    /// The item failed and the batch continued.
    Failed {
        /// Display text of `error`.
        message: String,
        error: Error,
    },
}

impl<O> ItemOutcome<O> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn ok(self) -> Option<O> {
        match self {
            Self::Ok(output) => Some(output),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Ok(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// Runs `f(index, item)` for each item, strictly in order.
///
/// `index` is 0-based. With `continue_on_fail`, a failing item becomes an
/// [`ItemOutcome::Failed`] at its own position and the remaining items still
/// run; otherwise the first failure is returned as [`Error::Item`] with its
/// 1-based position and nothing after it runs.
pub async fn run_items<I, O, F, Fut>(
    items: impl IntoIterator<Item = I>,
    continue_on_fail: bool,
    mut f: F,
) -> Result<Vec<ItemOutcome<O>>, Error>
where
    F: FnMut(usize, I) -> Fut,
    Fut: Future<Output = Result<O, Error>>,
{
    let mut outcomes = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match f(index, item).await {
            Ok(output) => outcomes.push(ItemOutcome::Ok(output)),
            Err(error) if continue_on_fail => {
                log::warn!("item {} failed: {}", index + 1, error);
                outcomes.push(ItemOutcome::Failed {
                    message: error.to_string(),
                    error,
                });
            }
            Err(error) => return Err(error.at_item(index + 1)),
        }
    }

    Ok(outcomes)
}
