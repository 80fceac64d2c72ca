// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/bbs`
//!
//! Select values travel as `select1`..`select3`; select definitions on
//! create and updateSettings as a JSON array in `selects`.

use axum::extract::State;
use axum::response::Response;
use nostalgic_core::SelectDefinition;
use nostalgic_services::WidgetService;
use nostalgic_services::bbs::{BbsCreateParams, BbsSettingsUpdate, MessageEdit, PostRequest};
use nostalgic_services::policy::MAX_BBS_SELECTS;

use super::{created, deleted, owned, settings_update, unknown_action};
use crate::error::{ApiError, ok};
use crate::extract::{Params, Visitor};
use crate::server::GatewayState;

fn message_edit(params: &Params) -> MessageEdit {
    MessageEdit {
        author: params.raw("author").map(str::to_string),
        message: params.get("message").unwrap_or_default().to_string(),
        selects: params.selects(MAX_BBS_SELECTS),
    }
}

pub async fn handle(
    State(state): State<GatewayState>,
    Visitor(visitor): Visitor,
    params: Params,
) -> Result<Response, ApiError> {
    let bbs = &state.services.bbs;
    match params.action()? {
        "create" => {
            let (url, token) = params.owner()?;
            let create = BbsCreateParams {
                title: owned(&params, "title"),
                webhook_url: owned(&params, "webhookUrl"),
                messages_per_page: params.parse::<u32>("messagesPerPage")?,
                max_messages: params.parse::<u32>("maxMessages")?,
                selects: params
                    .json::<Vec<SelectDefinition>>("selects")?
                    .unwrap_or_default(),
            };
            let entity = bbs.create(url, token, create).await?;
            Ok(created(&entity))
        }
        "post" => {
            let request = PostRequest {
                author: owned(&params, "author"),
                message: params.get("message").unwrap_or_default().to_string(),
                selects: params.selects(MAX_BBS_SELECTS).unwrap_or_default(),
            };
            Ok(ok(bbs.post(&params.id()?, &visitor, request).await?))
        }
        "get" | "display" => {
            let page = params.parse::<u32>("page")?;
            Ok(ok(bbs.get(&params.id()?, page).await?))
        }
        "editMessageById" => {
            let message_id = params.required("messageId")?;
            let edit_token = params.required("editToken")?;
            let view = bbs
                .edit_message_by_id(&params.id()?, message_id, edit_token, message_edit(&params))
                .await?;
            Ok(ok(view))
        }
        "deleteMessageById" => {
            let message_id = params.required("messageId")?;
            let edit_token = params.required("editToken")?;
            Ok(ok(bbs
                .delete_message_by_id(&params.id()?, message_id, edit_token)
                .await?))
        }
        "editMessage" => {
            let (url, token) = params.owner()?;
            let message_id = params.required("messageId")?;
            Ok(ok(bbs
                .edit_message(url, token, message_id, message_edit(&params))
                .await?))
        }
        "deleteMessage" => {
            let (url, token) = params.owner()?;
            let message_id = params.required("messageId")?;
            Ok(ok(bbs.delete_message(url, token, message_id).await?))
        }
        "clear" => {
            let (url, token) = params.owner()?;
            Ok(ok(bbs.clear(url, token).await?))
        }
        "delete" => {
            let (url, token) = params.owner()?;
            bbs.delete(url, token).await?;
            Ok(deleted())
        }
        "updateSettings" => {
            let (url, token) = params.owner()?;
            let update = BbsSettingsUpdate {
                common: settings_update(&params),
                messages_per_page: params.parse::<u32>("messagesPerPage")?,
                max_messages: params.parse::<u32>("maxMessages")?,
                selects: params.json::<Vec<SelectDefinition>>("selects")?,
            };
            Ok(ok(bbs.update_settings(url, token, update).await?))
        }
        _ => Err(unknown_action()),
    }
}
