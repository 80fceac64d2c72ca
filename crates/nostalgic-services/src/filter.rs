// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default BBS content filter.

use nostalgic_core::{ContentFilter, NostalgicError, Result};
use regex::Regex;

/// A character repeated this many times in a row is treated as spam.
const MAX_REPEAT_RUN: usize = 10;

/// Rejects links, long runs of one character, and configured banned words.
pub struct PatternFilter {
    links: Regex,
    banned: Option<Regex>,
}

impl PatternFilter {
    pub fn new(banned_words: &[String]) -> Result<Self> {
        let links = Regex::new(r"(?i)https?://|www\.")
            .map_err(|e| NostalgicError::Internal(format!("link pattern: {e}")))?;

        let words: Vec<String> = banned_words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        let banned = if words.is_empty() {
            None
        } else {
            let pattern = format!("(?i)(?:{})", words.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                NostalgicError::Config(format!("invalid banned word list: {e}"))
            })?)
        };

        Ok(Self { links, banned })
    }
}

fn has_long_run(text: &str) -> bool {
    let mut previous = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run >= MAX_REPEAT_RUN {
            return true;
        }
    }
    false
}

impl ContentFilter for PatternFilter {
    fn is_allowed(&self, text: &str) -> bool {
        if self.links.is_match(text) || has_long_run(text) {
            return false;
        }
        !self.banned.as_ref().is_some_and(|re| re.is_match(text))
    }
}
