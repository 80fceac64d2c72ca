// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content filter applied to BBS posts.

/// Decides whether user-submitted text may be stored.
pub trait ContentFilter: Send + Sync {
    fn is_allowed(&self, text: &str) -> bool;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ContentFilter for AllowAll {
    fn is_allowed(&self, _text: &str) -> bool {
        true
    }
}
