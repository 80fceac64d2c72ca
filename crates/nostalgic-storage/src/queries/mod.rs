// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions, one module per storage shape.

pub mod counters;
pub mod daily;
pub mod entities;
pub mod hashes;
pub mod lists;
pub mod markers;
pub mod sorted_sets;
pub mod url_mappings;

/// Resolve a Redis-style inclusive index range against a collection length.
///
/// Negative indices count from the end. Returns `(offset, limit)` or `None`
/// when the range selects nothing.
pub(crate) fn resolve_range(len: i64, start: i64, stop: i64) -> Option<(i64, i64)> {
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start, stop - start + 1))
}


#[cfg(test)]
mod tests {
    use super::resolve_range;

    #[test]
    fn resolve_range_handles_negative_indices() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 5)));
        assert_eq!(resolve_range(5, -2, -1), Some((3, 2)));
        assert_eq!(resolve_range(5, 1, 2), Some((1, 2)));
    }

    #[test]
    fn resolve_range_clamps_and_rejects_empty() {
        assert_eq!(resolve_range(3, 0, 100), Some((0, 3)));
        assert_eq!(resolve_range(3, -100, 0), Some((0, 1)));
        assert_eq!(resolve_range(3, 3, 5), None);
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(3, 2, 1), None);
    }
}
