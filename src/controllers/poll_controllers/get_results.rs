use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Extension, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::controllers::poll_controllers::models::ResultsResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::utils::error::AppResult;

pub async fn get_results(
    Path(poll_id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ResultsResponse>> {
    let counts = state.engine.results(&poll_id, &identity).await?;

    Ok(Json(ResultsResponse {
        poll_id,
        total_votes: counts.values().sum(),
        counts,
    }))
}

/// Server-sent change events for the caller's team. Clients re-fetch the
/// poll named in each `poll` event; a `resync` event means events were
/// dropped and everything should be re-fetched.
pub async fn poll_updates_stream(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let team = identity.require_team()?.to_string();
    let receiver = state.engine.subscribe();

    let stream = stream::unfold((receiver, team), |(mut receiver, team)| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if event.team_name == team => match serde_json::to_string(&event) {
                    Ok(json_data) => {
                        let sse = Event::default().event("poll").data(json_data);
                        return Some((Ok::<_, Infallible>(sse), (receiver, team)));
                    }
                    Err(e) => warn!(error = %e, "failed to encode poll event"),
                },
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, team = %team, "event subscriber lagged");
                    let sse = Event::default().event("resync").data(skipped.to_string());
                    return Some((Ok::<_, Infallible>(sse), (receiver, team)));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
