//! Offset-based pagination (`pn` / `ps` query parameters).

use serde::Deserialize;

use crate::fields::FieldError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: i64,
    size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(number: Option<i64>, size: Option<i64>) -> Result<Self, FieldError> {
        let number = number.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if number < 1 {
            return Err(FieldError::Invalid {
                field: "pn".into(),
                reason: "page numbers start at 1".into(),
            });
        }
        if size < 1 {
            return Err(FieldError::Invalid {
                field: "ps".into(),
                reason: "page size must be positive".into(),
            });
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    /// Rows to skip: `size * (number - 1)`, saturating at `i64::MAX` so a
    /// page far past the end is simply empty.
    pub fn skip(&self) -> i64 {
        self.size.saturating_mul(self.number - 1)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Apply this page to an already ordered in-memory sequence.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(usize::try_from(self.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Raw `pn` / `ps` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub pn: Option<i64>,
    pub ps: Option<i64>,
}

impl TryFrom<&PageQuery> for Page {
    type Error = FieldError;

    fn try_from(q: &PageQuery) -> Result<Self, Self::Error> {
        Page::new(q.pn, q.ps)
    }
}
