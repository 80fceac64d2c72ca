// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text and SVG renderings of a single widget number.

use std::fmt::Write;

use axum::http::header;
use axum::response::{IntoResponse, Response};

const DIGIT_WIDTH: usize = 12;
const BADGE_HEIGHT: usize = 20;
const MIN_DIGITS: usize = 6;

pub fn text(value: u64) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        value.to_string(),
    )
        .into_response()
}

pub fn image(value: u64) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg_badge(value),
    )
        .into_response()
}

/// Odometer-style badge, zero-padded to six digits.
pub fn svg_badge(value: u64) -> String {
    let digits = format!("{value:0>MIN_DIGITS$}");
    let width = digits.len() * DIGIT_WIDTH;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{BADGE_HEIGHT}\" \
         viewBox=\"0 0 {width} {BADGE_HEIGHT}\">\
         <rect width=\"{width}\" height=\"{BADGE_HEIGHT}\" fill=\"#000\"/>"
    );
    for (i, digit) in digits.chars().enumerate() {
        let x = i * DIGIT_WIDTH;
        let center = x + DIGIT_WIDTH / 2;
        // Writing into a String cannot fail.
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"1\" width=\"{}\" height=\"{}\" fill=\"#222\"/>\
             <text x=\"{center}\" y=\"15\" fill=\"#0f0\" font-family=\"monospace\" \
             font-size=\"14\" text-anchor=\"middle\">{digit}</text>",
            x + 1,
            DIGIT_WIDTH - 2,
            BADGE_HEIGHT - 2,
        );
    }
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_pads_to_six_digits() {
        let svg = svg_badge(42);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<text").count(), 6);
        assert!(svg.contains(">4</text>"));
        assert!(svg.contains("width=\"72\""));
    }

    #[test]
    fn badge_grows_past_six_digits() {
        let svg = svg_badge(12_345_678);
        assert_eq!(svg.matches("<text").count(), 8);
    }
}
