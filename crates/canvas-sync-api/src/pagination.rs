//! `Link` header pagination
//!
//! Canvas paginates REST collections with RFC 8288 style headers:
//!
//! ```text
//! Link: <https://h/api/v1/courses/1/files?page=2>; rel="next",
//!       <https://h/api/v1/courses/1/files?page=1>; rel="first", ...
//! ```
//!
//! [`LinkRelations`] holds the recognized relations of one response and
//! [`PageCursor`] is the explicit state machine that walks them: each
//! [`advance`](PageCursor::advance) fetches the `next` page and replaces
//! the cursor's relations with that page's, in one step.

use std::marker::PhantomData;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::client::CanvasClient;
use crate::{ApiError, CursorDirection};

static LINK_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<(.+?)>\s*;\s*rel="(.+?)""#).expect("valid Link regex"));

/// Named pagination relations from a `Link` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    pub current: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl LinkRelations {
    /// Parse a `Link` header value
    ///
    /// Each comma-separated entry is matched against `<url>; rel="name"`.
    /// Entries that do not match and relation names other than
    /// `current`/`first`/`last`/`next`/`prev` are ignored.
    pub fn parse(header: &str) -> Self {
        let mut relations = Self::default();
        for entry in header.split(',') {
            let Some(caps) = LINK_ITEM.captures(entry) else {
                trace!(entry, "Skipping unparseable Link entry");
                continue;
            };
            let url = caps[1].to_string();
            match &caps[2] {
                "current" => relations.current = Some(url),
                "first" => relations.first = Some(url),
                "last" => relations.last = Some(url),
                "next" => relations.next = Some(url),
                "prev" => relations.prev = Some(url),
                other => trace!(rel = other, "Ignoring unknown Link relation"),
            }
        }
        relations
    }

    /// A `next` page exists and the current page is not marked `last`
    ///
    /// When either `current` or `last` is missing only `next` decides.
    pub fn has_next(&self) -> bool {
        self.next.is_some() && !Self::same_page(&self.current, &self.last)
    }

    /// A `prev` page exists and the current page is not marked `first`
    pub fn has_prev(&self) -> bool {
        self.prev.is_some() && !Self::same_page(&self.current, &self.first)
    }

    fn same_page(a: &Option<String>, b: &Option<String>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a == b)
    }
}

/// One page of a listing plus the cursor for the rest, if any
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` when the response carried no `Link` header
    pub cursor: Option<PageCursor<T>>,
}

/// Walks the pages of one REST listing
///
/// Lives for exactly one listing operation. The cursor only moves through
/// [`advance`](Self::advance) and [`retreat`](Self::retreat); a failed
/// fetch leaves its relations untouched.
#[derive(Debug)]
pub struct PageCursor<T> {
    client: CanvasClient,
    relations: LinkRelations,
    _items: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PageCursor<T> {
    pub fn new(client: CanvasClient, relations: LinkRelations) -> Self {
        Self {
            client,
            relations,
            _items: PhantomData,
        }
    }

    pub fn relations(&self) -> &LinkRelations {
        &self.relations
    }

    pub fn has_next(&self) -> bool {
        self.relations.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.relations.has_prev()
    }

    /// Fetch the `next` page, moving the cursor onto it
    ///
    /// Fails with [`ApiError::ExhaustedCursor`] when [`has_next`](Self::has_next)
    /// is false, and with [`ApiError::StalledCursor`] when `next` names the
    /// current page.
    pub async fn advance(&mut self) -> Result<Vec<T>, ApiError> {
        let url = match (&self.relations.next, self.has_next()) {
            (Some(url), true) => url.clone(),
            _ => {
                return Err(ApiError::ExhaustedCursor {
                    direction: CursorDirection::Next,
                })
            }
        };
        self.ensure_moves(&url, CursorDirection::Next)?;
        self.move_to(&url).await
    }

    /// Fetch the `prev` page, moving the cursor onto it
    pub async fn retreat(&mut self) -> Result<Vec<T>, ApiError> {
        let url = match (&self.relations.prev, self.has_prev()) {
            (Some(url), true) => url.clone(),
            _ => {
                return Err(ApiError::ExhaustedCursor {
                    direction: CursorDirection::Prev,
                })
            }
        };
        self.ensure_moves(&url, CursorDirection::Prev)?;
        self.move_to(&url).await
    }

    fn ensure_moves(&self, url: &str, direction: CursorDirection) -> Result<(), ApiError> {
        if self.relations.current.as_deref() == Some(url) {
            return Err(ApiError::StalledCursor {
                direction,
                url: url.to_string(),
            });
        }
        Ok(())
    }

    async fn move_to(&mut self, url: &str) -> Result<Vec<T>, ApiError> {
        let (items, relations) = self.client.get_json::<Vec<T>>(url).await?;
        self.relations = relations.unwrap_or_default();
        Ok(items)
    }
}

/// Fetch the first page of a REST listing at an absolute `url`
///
/// `url` should already carry `per_page` if a page size is configured
/// (see [`CanvasClient::build_url`]).
pub async fn fetch_first_page<T: DeserializeOwned>(
    client: &CanvasClient,
    url: &str,
) -> Result<Page<T>, ApiError> {
    let (items, relations) = client.get_json::<Vec<T>>(url).await?;
    debug!(
        url,
        items = items.len(),
        paginated = relations.is_some(),
        "Received first page"
    );
    Ok(Page {
        items,
        cursor: relations.map(|r| PageCursor::new(client.clone(), r)),
    })
}
