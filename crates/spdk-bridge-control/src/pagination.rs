//! Opaque pagination cursors.
//!
//! A truncated list response carries a freshly minted token that maps to the
//! offset the next page starts at. Tokens live for the whole process and are
//! never reclaimed.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{ControlError, Result};

/// Where a page starts and how many items it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Index of the first item.
    pub offset: usize,
    /// Maximum number of items.
    pub size: usize,
}

/// Token to offset map shared by every list operation.
#[derive(Debug, Default)]
pub struct PageCursors {
    tokens: RwLock<HashMap<String, usize>>,
}

impl PageCursors {
    /// Create an empty cursor map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the offset a token was minted for.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::PageTokenNotFound` for unknown tokens.
    pub fn resolve(&self, token: &str) -> Result<usize> {
        self.tokens
            .read()
            .get(token)
            .copied()
            .ok_or_else(|| ControlError::PageTokenNotFound(token.to_string()))
    }

    /// Mint a new token that resumes at `offset`.
    pub fn mint(&self, offset: usize) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().insert(token.clone(), offset);
        tracing::debug!(token = %token, offset, "Minted pagination token");
        token
    }

    /// Number of tokens minted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Returns true if no token has been minted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }

    /// Validate list parameters and turn them into a [`Page`].
    ///
    /// A zero `page_size` selects `default_size`, itself at least one; an
    /// empty `page_token` starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NegativePageSize` or
    /// `ControlError::PageTokenNotFound`.
    pub fn extract(&self, page_size: i32, page_token: &str, default_size: usize) -> Result<Page> {
        let size = usize::try_from(page_size).map_err(|_| ControlError::NegativePageSize)?;
        let size = if size == 0 { default_size.max(1) } else { size };
        let offset = if page_token.is_empty() {
            0
        } else {
            self.resolve(page_token)?
        };
        Ok(Page { offset, size })
    }

    /// Cut `page` out of `items`.
    ///
    /// Returns the page and the token for the next one, or an empty token
    /// when nothing remains.
    pub fn paginate<T>(&self, items: Vec<T>, page: Page) -> (Vec<T>, String) {
        let total = items.len();
        let end = page.offset.saturating_add(page.size);
        let slice: Vec<T> = items
            .into_iter()
            .skip(page.offset)
            .take(page.size)
            .collect();
        tracing::debug!(total, offset = page.offset, size = page.size, "Paginated list");
        let token = if end < total {
            self.mint(end)
        } else {
            String::new()
        };
        (slice, token)
    }
}
