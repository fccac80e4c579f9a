//! One-indexed page arithmetic shared by all repositories.
//!
//! Page `n` of size `s` covers positions `[s * (n - 1), s * n)`. A non-positive
//! size or number is "no page" (`None`); a page past the end is an empty page.

use std::ops::Range;

/// Returns the index range of a page within a collection of `len` items.
pub fn page_range(page_size: i64, page_number: i64, len: usize) -> Option<Range<usize>> {
    let (offset, limit) = offset_limit(page_size, page_number)?;
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
    let end = usize::try_from(offset.saturating_add(limit))
        .unwrap_or(usize::MAX)
        .min(len);
    Some(start..end)
}

/// Converts page parameters to an SQL `(OFFSET, LIMIT)` pair.
pub fn offset_limit(page_size: i64, page_number: i64) -> Option<(i64, i64)> {
    if page_size <= 0 || page_number <= 0 {
        return None;
    }
    Some((page_size.saturating_mul(page_number - 1), page_size))
}

/// Copies one page out of `items`.
pub fn paginate<T: Clone>(items: &[T], page_size: i64, page_number: i64) -> Option<Vec<T>> {
    page_range(page_size, page_number, items.len()).map(|r| items[r].to_vec())
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: usize, page_size: i64) -> usize {
    match usize::try_from(page_size) {
        Ok(size) if size > 0 => total.div_ceil(size),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twelve() -> Vec<usize> {
        (0..12).collect()
    }

    #[test]
    fn test_first_page() {
        assert_eq!(paginate(&twelve(), 5, 1).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_partial_last_page() {
        assert_eq!(paginate(&twelve(), 5, 3).unwrap(), vec![10, 11]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        assert_eq!(paginate(&twelve(), 5, 5).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_invalid_parameters_are_no_page() {
        assert!(paginate(&twelve(), 0, 1).is_none());
        assert!(paginate(&twelve(), -5, 1).is_none());
        assert!(paginate(&twelve(), 5, 0).is_none());
        assert!(paginate(&twelve(), 5, -1).is_none());
    }

    #[test]
    fn test_offset_limit() {
        assert_eq!(offset_limit(25, 1), Some((0, 25)));
        assert_eq!(offset_limit(25, 3), Some((50, 25)));
        assert_eq!(offset_limit(0, 3), None);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        assert_eq!(paginate(&twelve(), i64::MAX, i64::MAX).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(3, 0), 0);
    }
}
