//! Collection accumulator
//!
//! Drains a paginated listing into a single id-keyed map. Page fetching
//! and merging overlap: the listing loop hands each page to a background
//! consumer through a bounded channel, and only requests page N+1 once
//! page N is in the buffer. The consumer owns the map; the producer never
//! touches it.
//!
//! ```text
//! advance() ──► mpsc (PAGE_BUFFER) ──► consumer task ──► HashMap<i64, T>
//!     ▲                                                        │
//!     └── next page                 producer drops tx, awaits ◄┘
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use canvas_sync_core::domain::Keyed;

use crate::pagination::Page;
use crate::ApiError;

/// Pages buffered between the listing loop and the merge task
pub const PAGE_BUFFER: usize = 5;

/// A listing failed part-way; carries what was merged before the failure
pub struct CollectError<T> {
    /// Items merged from the pages fetched before the error
    pub partial: HashMap<i64, T>,
    /// The page fetch that stopped the listing
    pub source: ApiError,
}

impl<T> CollectError<T> {
    /// Failure before any page was fetched
    pub fn empty(source: ApiError) -> Self {
        Self {
            partial: HashMap::new(),
            source,
        }
    }
}

impl<T> fmt::Debug for CollectError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectError")
            .field("partial_items", &self.partial.len())
            .field("source", &self.source)
            .finish()
    }
}

impl<T> fmt::Display for CollectError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listing stopped after {} items: {}",
            self.partial.len(),
            self.source
        )
    }
}

impl<T> std::error::Error for CollectError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Drain `first` and every following page into a map keyed by item id
///
/// Later duplicates overwrite earlier ones. On a page-fetch error the
/// listing stops at once and the items merged so far are returned inside
/// the [`CollectError`].
pub async fn collect<T>(first: Page<T>) -> Result<HashMap<i64, T>, CollectError<T>>
where
    T: Keyed + DeserializeOwned + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Vec<T>>(PAGE_BUFFER);

    let consumer = tokio::spawn(async move {
        let mut merged = HashMap::new();
        while let Some(page) = rx.recv().await {
            for item in page {
                merged.insert(item.key(), item);
            }
        }
        merged
    });

    // The sender is dropped when `produce` returns, on every path, which
    // closes the channel and lets the consumer finish.
    let outcome = produce(first, tx).await;

    let merged = match consumer.await {
        Ok(merged) => merged,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            warn!(error = %e, "Merge task cancelled");
            HashMap::new()
        }
    };

    match outcome {
        Ok(pages) => {
            debug!(pages, items = merged.len(), "Listing complete");
            Ok(merged)
        }
        Err(source) => Err(CollectError {
            partial: merged,
            source,
        }),
    }
}

/// Feed pages into `tx` until the cursor is exhausted; returns the page count
async fn produce<T>(first: Page<T>, tx: mpsc::Sender<Vec<T>>) -> Result<usize, ApiError>
where
    T: DeserializeOwned,
{
    let Page { items, cursor } = first;
    if tx.send(items).await.is_err() {
        return Ok(1);
    }

    let Some(mut cursor) = cursor else {
        return Ok(1);
    };

    let mut pages = 1;
    while cursor.has_next() {
        let items = cursor.advance().await?;
        pages += 1;
        debug!(page = pages, items = items.len(), "Received page");
        if tx.send(items).await.is_err() {
            break;
        }
    }
    Ok(pages)
}
