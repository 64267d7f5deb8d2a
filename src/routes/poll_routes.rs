use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::controllers::poll_controllers::{
    cast_vote, check_vote, close_poll, create_poll, delete_poll, get_poll, get_results, polls,
    reveal_results,
};
use crate::middleware::identity::identity_context;
use crate::state::AppState;

pub fn poll_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(polls::get_team_polls))
        .route("/create", post(create_poll::create_poll))
        .route("/events", get(get_results::poll_updates_stream))
        .route(
            "/:poll_id",
            get(get_poll::get_poll).delete(delete_poll::delete_poll),
        )
        .route(
            "/:poll_id/vote",
            post(cast_vote::cast_vote).get(check_vote::check_user_vote),
        )
        .route("/:poll_id/close", post(close_poll::close_poll))
        .route("/:poll_id/reveal", post(reveal_results::reveal_results))
        .route("/:poll_id/results", get(get_results::get_results))
        .layer(middleware::from_fn(identity_context))
        .with_state(state)
}
