// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner URL canonicalization and public id generation.

use nostalgic_core::{NostalgicError, PublicId, Result};
use rand::Rng;

const SLUG_MAX_LEN: usize = 32;

/// Normalize an owner URL so that trivially different spellings map to one widget.
///
/// Only http(s) is accepted. The host is lowercased, a default port and the
/// fragment are dropped, trailing slashes are stripped from the path, and the
/// query is kept as-is. Credentials in the authority are discarded.
pub fn canonicalize_url(raw: &str) -> Result<String> {
    let invalid = || NostalgicError::validation("invalid url");
    let parsed = url::Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;

    let mut canonical = format!("{}://{}", parsed.scheme(), host.to_ascii_lowercase());
    if let Some(port) = parsed.port() {
        canonical.push_str(&format!(":{port}"));
    }
    canonical.push_str(parsed.path().trim_end_matches('/'));
    if let Some(query) = parsed.query() {
        canonical.push('?');
        canonical.push_str(query);
    }
    Ok(canonical)
}

/// Host portion of a canonical URL reduced to `[a-z0-9-]`.
fn host_slug(canonical_url: &str) -> String {
    let host = url::Url::parse(canonical_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default();

    let mut slug = String::with_capacity(host.len());
    for c in host.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "widget".to_string()
    } else {
        slug.to_string()
    }
}

/// `{host-slug}-{8 hex}` with a fresh random suffix.
pub fn generate_public_id(canonical_url: &str) -> Result<PublicId> {
    let suffix: u32 = rand::thread_rng().r#gen();
    PublicId::parse(&format!("{}-{suffix:08x}", host_slug(canonical_url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_spelling_variants() {
        let expected = "https://a.example";
        for raw in [
            "https://a.example",
            "https://A.Example/",
            "https://a.example:443/",
            "https://a.example/#top",
            "  https://a.example  ",
        ] {
            assert_eq!(canonicalize_url(raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn keeps_path_query_and_custom_port() {
        assert_eq!(
            canonicalize_url("http://a.example:8080/blog/?p=1#c").unwrap(),
            "http://a.example:8080/blog?p=1"
        );
    }

    #[test]
    fn rejects_non_http() {
        assert!(canonicalize_url("ftp://a.example").is_err());
        assert!(canonicalize_url("javascript:alert(1)").is_err());
        assert!(canonicalize_url("a.example").is_err());
    }

    #[test]
    fn id_has_slug_and_hex_suffix() {
        let id = generate_public_id("https://my.blog.example/posts").unwrap();
        let (slug, suffix) = id.as_str().rsplit_once('-').unwrap();
        assert_eq!(slug, "my-blog-example");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn long_hosts_are_truncated() {
        let url = format!("https://{}.example", "a".repeat(60));
        let id = generate_public_id(&url).unwrap();
        assert!(id.as_str().len() <= SLUG_MAX_LEN + 9);
    }

    #[test]
    fn ipv6_host_slug() {
        assert_eq!(host_slug("http://[::1]:8080"), "1");
    }
}
