use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::engine::PollView;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn get_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<PollView>> {
    let poll = state.engine.poll_view(&poll_id, &identity).await?;
    Ok(Json(poll))
}
