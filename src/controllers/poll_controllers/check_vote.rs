use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::controllers::poll_controllers::models::VoteStatusResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn check_user_vote(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<VoteStatusResponse>> {
    identity.require_member()?;

    let vote_record = state.engine.own_vote(&poll_id, &identity).await?;

    Ok(Json(VoteStatusResponse {
        has_voted: vote_record.is_some(),
        option_id: vote_record.map(|record| record.option_id),
    }))
}
