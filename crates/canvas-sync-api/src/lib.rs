//! canvas-sync API - Canvas LMS client
//!
//! Provides async access to the two listing shapes the sync engine needs:
//! - REST collections paginated through the `Link` response header
//! - GraphQL connections paginated through `pageInfo { hasNextPage endCursor }`
//!
//! ## Modules
//!
//! - [`client`] - authenticated HTTP client and single-request execution
//! - [`pagination`] - `Link` header relations and the page cursor
//! - [`collect`] - drains a paginated listing into an id-keyed collection
//! - [`files`] - course file/folder listings and single-file lookup
//! - [`modules`] - module item listing over GraphQL

pub mod client;
pub mod collect;
pub mod files;
pub mod modules;
pub mod pagination;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::CanvasClient;
pub use collect::{collect, CollectError};
pub use pagination::{LinkRelations, Page, PageCursor};

/// Direction a page cursor was moved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Next,
    Prev,
}

impl std::fmt::Display for CursorDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorDirection::Next => write!(f, "next"),
            CursorDirection::Prev => write!(f, "prev"),
        }
    }
}

/// Errors that can occur when talking to the Canvas API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status other than 200; never retried here
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// Network-level failure (DNS, connect, reset...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The GraphQL endpoint reported errors or an unusable payload
    #[error("GraphQL error from {url}: {}", messages.join("; "))]
    GraphQl { url: String, messages: Vec<String> },

    /// `advance`/`retreat` was called with no page in that direction
    #[error("Cursor exhausted: no {direction} page")]
    ExhaustedCursor { direction: CursorDirection },

    /// The `next`/`prev` relation points back at the current page
    #[error("Cursor stalled: {direction} page is the current page ({url})")]
    StalledCursor {
        direction: CursorDirection,
        url: String,
    },

    /// A request URL could not be built
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
