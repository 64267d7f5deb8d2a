use axum::{
    extract::{Extension, State},
    Json,
};

use crate::engine::{PollFilter, PollView};
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::QueryParams;

/// `GET /api/polls?view=all|mine|voted&search=...`
pub async fn get_team_polls(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    QueryParams(filter): QueryParams<PollFilter>,
) -> AppResult<Json<Vec<PollView>>> {
    let polls = state.engine.list_polls(&identity, &filter).await?;
    Ok(Json(polls))
}
