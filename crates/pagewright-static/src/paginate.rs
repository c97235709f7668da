//! Fixed-size pagination over ordered records.

/// One page of a paginated sequence.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number
    pub number: usize,
    /// Contiguous slice of the input
    pub items: &'a [T],
}

/// Split `items` into pages of `page_size`.
///
/// `None` or `Some(0)` disables pagination and yields a single page holding
/// everything. Empty input yields exactly one empty page so every scope has
/// a first page to render.
pub fn paginate<T>(items: &[T], page_size: Option<usize>) -> Vec<Page<'_, T>> {
    if items.is_empty() {
        return vec![Page { number: 1, items }];
    }

    let size = match page_size {
        Some(size) if size > 0 => size,
        _ => items.len(),
    };

    items
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            items: chunk,
        })
        .collect()
}
