use crate::error::{BoardError, BoardResult};
use serde::Serialize;

/// Validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32, max_limit: u32) -> BoardResult<Self> {
        if page < 1 {
            return Err(BoardError::Validation(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if limit < 1 {
            return Err(BoardError::Validation(
                "limit must be greater than or equal to 1".to_string(),
            ));
        }
        if limit > max_limit {
            return Err(BoardError::Validation(format!(
                "limit must not exceed {max_limit}"
            )));
        }
        Ok(PageRequest { page, limit })
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Inclusive (first, last) positions covered by this page.
    pub fn range(&self) -> (usize, usize) {
        let offset = self.offset();
        (offset, offset + self.limit as usize - 1)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = (start + self.limit as usize).min(items.len());
        &items[start..end]
    }
}

impl PageMeta {
    pub fn new(request: &PageRequest, total: usize) -> Self {
        PageMeta {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit as usize),
        }
    }
}

impl<T: Clone> Paginated<T> {
    pub fn from_items(items: &[T], request: &PageRequest) -> Self {
        Paginated {
            data: request.slice(items).to_vec(),
            pagination: PageMeta::new(request, items.len()),
        }
    }
}
