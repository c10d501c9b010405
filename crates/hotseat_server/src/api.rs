//! HTTP routes over the shared table.

use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use hotseat_engine::{GameError, Player, Table, TableSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Move submission payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    /// Column, 0 to 2 left to right.
    pub x_axis: usize,
    /// Row, 0 to 2 top to bottom.
    pub y_axis: usize,
    /// Id of the player moving.
    pub player_id: String,
}

/// Player payload for subscribe, unsubscribe, and update.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRequest {
    /// Player id. Subscribe mints a fresh one when this is empty.
    #[serde(default)]
    pub id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body returned by subscribe, echoing the id the player registered
/// under. Anonymous subscribers need it to act on the table later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    /// Effective player id.
    pub id: String,
}

/// Mirror attachment payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorRequest {
    /// Destination file for JSON snapshots.
    pub path: PathBuf,
}

/// Builds the HTTP surface over one table handle.
pub fn router(table: Table) -> Router {
    Router::new()
        .route("/", get(current_state))
        .route("/restart", get(restart))
        .route("/player/subscribe", post(subscribe))
        .route("/player/unsubscribe", post(unsubscribe))
        .route("/player/update", put(update))
        .route("/player/move", post(place_move))
        .route("/mirror", post(set_mirror))
        .with_state(table)
}

#[instrument(skip(table))]
async fn current_state(State(table): State<Table>) -> Json<TableSnapshot> {
    Json(table.snapshot())
}

#[instrument(skip(table))]
async fn restart(State(table): State<Table>) -> Json<TableSnapshot> {
    table.reset();
    Json(table.snapshot())
}

#[instrument(skip(table, body), fields(player_id = %body.id))]
async fn subscribe(
    State(table): State<Table>,
    Json(body): Json<PlayerRequest>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let id = if body.id.is_empty() {
        let minted = Uuid::new_v4().to_string();
        info!(minted = %minted, "Minting id for anonymous subscriber");
        minted
    } else {
        body.id
    };

    table.add_player(Player {
        id: id.clone(),
        name: body.name,
    })?;
    Ok(Json(SubscribeResponse { id }))
}

#[instrument(skip(table, body), fields(player_id = %body.id))]
async fn unsubscribe(
    State(table): State<Table>,
    Json(body): Json<PlayerRequest>,
) -> Result<StatusCode, ApiError> {
    table.remove_player(&body.id)?;
    Ok(StatusCode::OK)
}

#[instrument(skip(table, body), fields(player_id = %body.id))]
async fn update(
    State(table): State<Table>,
    Json(body): Json<PlayerRequest>,
) -> Result<StatusCode, ApiError> {
    table.update_player(Player {
        id: body.id,
        name: body.name,
    })?;
    Ok(StatusCode::OK)
}

#[instrument(
    skip(table, body),
    fields(player_id = %body.player_id, x = body.x_axis, y = body.y_axis)
)]
async fn place_move(
    State(table): State<Table>,
    Json(body): Json<MoveRequest>,
) -> Result<StatusCode, ApiError> {
    table.place_move(&body.player_id, body.x_axis, body.y_axis)?;
    Ok(StatusCode::OK)
}

#[instrument(skip(table, body), fields(path = %body.path.display()))]
async fn set_mirror(
    State(table): State<Table>,
    Json(body): Json<MirrorRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    crate::mirror::attach_mirror(&table, &body.path)
        .await
        .map_err(|err| {
            warn!(error = %err, "Mirror attachment failed");
            (StatusCode::BAD_REQUEST, err.to_string())
        })?;
    Ok(StatusCode::OK)
}

/// Table error plus the HTTP status it maps to.
#[derive(Debug)]
struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::PlayerNotFound { .. } => StatusCode::NOT_FOUND,
            GameError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
            GameError::InvalidMove { .. } => StatusCode::BAD_REQUEST,
            GameError::InvalidStateTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = %status, error = %self.0, "Request rejected");
        (status, self.0.to_string()).into_response()
    }
}
