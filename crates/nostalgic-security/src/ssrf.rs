// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps webhook deliveries away from private networks.
//!
//! [`validate_webhook_url`] runs when an owner configures a webhook and
//! rejects literal private addresses. [`SsrfSafeResolver`] runs on every
//! delivery and drops private addresses a public hostname resolves to.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use nostalgic_core::{NostalgicError, Result};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::{debug, warn};

/// DNS resolver that filters out private and reserved addresses.
pub struct SsrfSafeResolver {
    allowed_private_ips: Vec<IpAddr>,
}

impl SsrfSafeResolver {
    /// Build a resolver; unparseable allowlist entries are skipped.
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed_private_ips: parse_allowlist(allowed),
        }
    }

    /// Loopback, RFC 1918, link-local (including the cloud metadata address),
    /// broadcast, unspecified, and IPv6 unique-local ranges.
    pub fn is_private(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => {
                v4.is_private()
                    || v4.is_loopback()
                    || v4.is_link_local()
                    || v4.is_broadcast()
                    || v4.is_unspecified()
                    || *v4 == Ipv4Addr::new(169, 254, 169, 254)
            }
            IpAddr::V6(v6) => {
                if let Some(mapped) = v6.to_ipv4_mapped() {
                    return Self::is_private(&IpAddr::V4(mapped));
                }
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00
                    || (v6.segments()[0] & 0xffc0) == 0xfe80
            }
        }
    }
}

fn parse_allowlist(allowed: &[String]) -> Vec<IpAddr> {
    allowed.iter().filter_map(|s| s.parse().ok()).collect()
}

impl Resolve for SsrfSafeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let allowed = self.allowed_private_ips.clone();
        let hostname = name.as_str().to_string();

        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(format!("{hostname}:0"))
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let usable: Vec<SocketAddr> = addrs
                .into_iter()
                .filter(|addr| {
                    let ip = addr.ip();
                    if !SsrfSafeResolver::is_private(&ip) {
                        return true;
                    }
                    if allowed.contains(&ip) {
                        debug!(ip = %ip, host = %hostname, "webhook target on allowlisted private ip");
                        true
                    } else {
                        warn!(ip = %ip, host = %hostname, "dropping private address for webhook target");
                        false
                    }
                })
                .collect();

            if usable.is_empty() {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    format!("{hostname} resolves only to private addresses").into();
                return Err(err);
            }

            let addrs: Addrs = Box::new(usable.into_iter());
            Ok(addrs)
        })
    }
}

/// Static check of a webhook URL supplied by an owner.
///
/// Hostnames pass here and are filtered again at resolution time.
pub fn validate_webhook_url(raw: &str, allowed_private_ips: &[String]) -> Result<()> {
    let parsed =
        url::Url::parse(raw).map_err(|_| NostalgicError::validation("invalid webhook url"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NostalgicError::validation("webhook url must use http or https"));
    }
    let allowed = parse_allowlist(allowed_private_ips);
    match parsed.host() {
        Some(url::Host::Ipv4(v4)) => check_literal(IpAddr::V4(v4), &allowed),
        Some(url::Host::Ipv6(v6)) => check_literal(IpAddr::V6(v6), &allowed),
        Some(url::Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
            Err(NostalgicError::validation("webhook url must not target a private address"))
        }
        Some(url::Host::Domain(_)) => Ok(()),
        None => Err(NostalgicError::validation("invalid webhook url")),
    }
}

fn check_literal(ip: IpAddr, allowed: &[IpAddr]) -> Result<()> {
    if SsrfSafeResolver::is_private(&ip) && !allowed.contains(&ip) {
        warn!(ip = %ip, "rejected webhook url targeting private address");
        return Err(NostalgicError::validation(
            "webhook url must not target a private address",
        ));
    }
    Ok(())
}
