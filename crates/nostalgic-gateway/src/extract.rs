// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request extractors: query parameters and the visitor fingerprint.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::extract::{ConnectInfo, FromRequestParts, Query};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use nostalgic_core::{PublicId, VisitorHash};
use nostalgic_security::visitor_hash;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query-string parameters with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Params(pub HashMap<String, String>);

impl Params {
    /// Trimmed value, absent when missing or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Raw value, present even when blank.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.get(name)
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.get(name)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| ApiError::validation(format!("invalid {name}")))
            })
            .transpose()
    }

    pub fn parse_required<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.parse(name)?
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }

    /// A JSON-encoded parameter.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.get(name)
            .map(|v| {
                serde_json::from_str(v).map_err(|_| ApiError::validation(format!("invalid {name}")))
            })
            .transpose()
    }

    pub fn action(&self) -> Result<&str, ApiError> {
        self.required("action")
    }

    pub fn id(&self) -> Result<PublicId, ApiError> {
        Ok(PublicId::parse(self.required("id")?)?)
    }

    /// `(url, token)` of an owner-authenticated action.
    pub fn owner(&self) -> Result<(&str, &str), ApiError> {
        Ok((self.required("url")?, self.required("token")?))
    }

    pub fn has_owner(&self) -> bool {
        self.get("url").is_some() && self.get("token").is_some()
    }

    /// Positional select values `select1`..`selectN`, `None` when none was sent.
    pub fn selects(&self, max: usize) -> Option<Vec<Option<String>>> {
        let values: Vec<Option<String>> = (1..=max)
            .map(|i| self.get(&format!("select{i}")).map(str::to_string))
            .collect();
        values.iter().any(Option::is_some).then_some(values)
    }
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(map) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::validation("invalid query string"))?;
        Ok(Self(map))
    }
}

/// Salted fingerprint of the caller.
#[derive(Clone)]
pub struct Visitor(pub VisitorHash);

impl FromRequestParts<GatewayState> for Visitor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let ip = client_ip(&parts.headers, peer);
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Ok(Self(visitor_hash(&state.visitor_salt, &ip, user_agent)))
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<String>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    if let Some(first) = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    if let Some(real) = header("x-real-ip") {
        return real.to_string();
    }
    peer.unwrap_or_else(|| "unknown".to_string())
}
