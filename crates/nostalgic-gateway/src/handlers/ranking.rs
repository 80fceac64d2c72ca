// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/ranking`

use axum::extract::State;
use axum::response::Response;
use nostalgic_core::SortOrder;
use nostalgic_services::WidgetService;
use nostalgic_services::ranking::{RankingCreateParams, RankingSettingsUpdate, ScoreSubmission};

use super::{created, deleted, owned, settings_update, unknown_action};
use crate::error::{ApiError, ok};
use crate::extract::{Params, Visitor};
use crate::server::GatewayState;

fn submission(params: &Params) -> Result<ScoreSubmission, ApiError> {
    Ok(ScoreSubmission {
        name: params.required("name")?.to_string(),
        score: params.parse_required::<i64>("score")?,
        display_score: owned(params, "displayScore"),
    })
}

pub async fn handle(
    State(state): State<GatewayState>,
    Visitor(visitor): Visitor,
    params: Params,
) -> Result<Response, ApiError> {
    let ranking = &state.services.ranking;
    match params.action()? {
        "create" => {
            let (url, token) = params.owner()?;
            let create = RankingCreateParams {
                title: owned(&params, "title"),
                webhook_url: owned(&params, "webhookUrl"),
                max_entries: params.parse::<u32>("maxEntries")?,
                sort_order: params.parse::<SortOrder>("sortOrder")?,
            };
            let entity = ranking.create(url, token, create).await?;
            Ok(created(&entity))
        }
        "submit" => {
            let score = submission(&params)?;
            let outcome = if params.has_owner() {
                let (url, token) = params.owner()?;
                ranking.owner_submit(url, token, &visitor, score).await?
            } else {
                ranking.submit(&params.id()?, &visitor, score).await?
            };
            Ok(ok(outcome))
        }
        "get" | "display" => {
            let limit = params.parse::<u32>("limit")?;
            Ok(ok(ranking.get(&params.id()?, limit).await?))
        }
        "updateScore" => {
            let (url, token) = params.owner()?;
            Ok(ok(ranking.update_score(url, token, submission(&params)?).await?))
        }
        "removeEntry" => {
            let (url, token) = params.owner()?;
            let name = params.required("name")?;
            Ok(ok(ranking.remove_entry(url, token, name).await?))
        }
        "clear" => {
            let (url, token) = params.owner()?;
            Ok(ok(ranking.clear(url, token).await?))
        }
        "delete" => {
            let (url, token) = params.owner()?;
            ranking.delete(url, token).await?;
            Ok(deleted())
        }
        "updateSettings" => {
            let (url, token) = params.owner()?;
            let update = RankingSettingsUpdate {
                common: settings_update(&params),
                max_entries: params.parse::<u32>("maxEntries")?,
                sort_order: params.parse::<SortOrder>("sortOrder")?,
            };
            Ok(ok(ranking.update_settings(url, token, update).await?))
        }
        _ => Err(unknown_action()),
    }
}
