use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::controllers::poll_controllers::models::CreatePollRequest;
use crate::engine::PollView;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::JsonBody;

pub async fn create_poll(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<CreatePollRequest>,
) -> AppResult<(StatusCode, Json<PollView>)> {
    let poll = state
        .engine
        .create_poll(
            &identity,
            &payload.title,
            payload.description.as_deref(),
            &payload.options,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(poll)))
}
