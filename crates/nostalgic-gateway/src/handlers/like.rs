// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/like`

use axum::extract::State;
use axum::response::Response;
use nostalgic_core::{DisplayFormat, WidgetEntity};
use nostalgic_services::like::LikeCreateParams;
use nostalgic_services::{NumericWidgetService, WidgetService};

use super::{created, deleted, owned, settings_update, unknown_action};
use crate::error::{ApiError, ok};
use crate::extract::{Params, Visitor};
use crate::render;
use crate::server::GatewayState;

pub async fn handle(
    State(state): State<GatewayState>,
    Visitor(visitor): Visitor,
    params: Params,
) -> Result<Response, ApiError> {
    let like = &state.services.like;
    match params.action()? {
        "create" => {
            let (url, token) = params.owner()?;
            let create = LikeCreateParams {
                title: owned(&params, "title"),
                webhook_url: owned(&params, "webhookUrl"),
            };
            let entity = like.create(url, token, create).await?;
            Ok(created(&entity))
        }
        "toggle" => Ok(ok(like.toggle(&params.id()?, &visitor).await?)),
        "set" => {
            let (url, token) = params.owner()?;
            let value = params.parse_required::<i64>("value")?;
            let entity = like.set_value(url, token, value).await?;
            Ok(ok(like.get(entity.id(), Some(&visitor)).await?))
        }
        "get" | "display" => {
            let data = like.get(&params.id()?, Some(&visitor)).await?;
            Ok(match params.parse::<DisplayFormat>("format")?.unwrap_or_default() {
                DisplayFormat::Json => ok(data),
                DisplayFormat::Text => render::text(data.total),
                DisplayFormat::Image => render::image(data.total),
            })
        }
        "delete" => {
            let (url, token) = params.owner()?;
            like.delete(url, token).await?;
            Ok(deleted())
        }
        "updateSettings" => {
            let (url, token) = params.owner()?;
            let entity = like
                .update_settings(url, token, settings_update(&params))
                .await?;
            Ok(ok(entity))
        }
        _ => Err(unknown_action()),
    }
}
