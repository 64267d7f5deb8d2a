use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::engine::PollView;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn reveal_results(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<PollView>> {
    let updated_poll = state.engine.reveal_results(&poll_id, &identity).await?;
    Ok(Json(updated_poll))
}
