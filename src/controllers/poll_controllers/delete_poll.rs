use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
};

use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn delete_poll(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<StatusCode> {
    state.engine.delete_poll(&poll_id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
