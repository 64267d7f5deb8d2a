use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::controllers::poll_controllers::models::CastVoteRequest;
use crate::engine::PollView;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::JsonBody;

pub async fn cast_vote(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<CastVoteRequest>,
) -> AppResult<Json<PollView>> {
    let poll = state
        .engine
        .submit_vote(&poll_id, &payload.option_id, &identity)
        .await?;

    Ok(Json(poll))
}
