use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use super::error::{Result as WebResult, WebError};
use crate::game::{GameError, GameSettings};
use crate::room::{RoomDetails, RoomSummary};
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub host_name: String,
    pub settings: GameSettings,
}

pub async fn create_game_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateGameRequest>,
) -> WebResult<Json<RoomDetails>> {
    tracing::info!(host.name = %payload.host_name, "HTTP: Received create_game request");

    let details = app_state
        .room_manager
        .create_room(payload.host_name, payload.settings)
        .await
        .map_err(|e| match e {
            GameError::InvalidSettings(_) => WebError::BadRequest(e.to_string()),
            other => {
                tracing::error!(error = %other, "Failed to create room");
                WebError::InternalServerError(other.to_string())
            }
        })?;

    Ok(Json(details))
}

#[derive(Deserialize, Debug)]
pub struct RoomCodeQuery {
    pub code: String,
}

/// Room-code lookup for the join flow: resolves a shareable code to the
/// game id and its current phase.
pub async fn find_room_handler(
    State(app_state): State<AppState>,
    Query(query): Query<RoomCodeQuery>,
) -> WebResult<Json<RoomSummary>> {
    tracing::debug!(room.code = %query.code, "HTTP: Received find_room request");

    let handle = app_state
        .room_manager
        .find_room_by_code(query.code.clone())
        .await
        .ok_or_else(|| WebError::RoomNotFound(query.code.clone()))?;

    let summary = handle.summary().await.ok_or_else(|| {
        tracing::error!(room.id = %handle.game_id, "Room actor did not answer summary request");
        WebError::InternalServerError("room unavailable".to_string())
    })?;

    Ok(Json(summary))
}
