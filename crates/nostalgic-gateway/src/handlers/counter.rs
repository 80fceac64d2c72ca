// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/counter`

use axum::extract::State;
use axum::response::Response;
use nostalgic_core::{CounterWindow, DisplayFormat, WidgetEntity};
use nostalgic_services::counter::CounterCreateParams;
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
    let counter = &state.services.counter;
    match params.action()? {
        "create" => {
            let (url, token) = params.owner()?;
            let create = CounterCreateParams {
                title: owned(&params, "title"),
                webhook_url: owned(&params, "webhookUrl"),
            };
            let entity = counter.create(url, token, create).await?;
            Ok(created(&entity))
        }
        "increment" => Ok(ok(counter.increment(&params.id()?, &visitor).await?)),
        "set" => {
            let (url, token) = params.owner()?;
            let value = params.parse_required::<i64>("value")?;
            let entity = counter.set_value(url, token, value).await?;
            Ok(ok(counter.get_view(entity.id()).await?))
        }
        "get" | "display" => {
            let data = counter.get_view(&params.id()?).await?;
            let window = params.parse::<CounterWindow>("type")?.unwrap_or_default();
            Ok(match params.parse::<DisplayFormat>("format")?.unwrap_or_default() {
                DisplayFormat::Json => ok(data),
                DisplayFormat::Text => render::text(data.value(window)),
                DisplayFormat::Image => render::image(data.value(window)),
            })
        }
        "delete" => {
            let (url, token) = params.owner()?;
            counter.delete(url, token).await?;
            Ok(deleted())
        }
        "updateSettings" => {
            let (url, token) = params.owner()?;
            let entity = counter
                .update_settings(url, token, settings_update(&params))
                .await?;
            Ok(ok(entity))
        }
        _ => Err(unknown_action()),
    }
}
