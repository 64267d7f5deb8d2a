use std::time::Instant;

use axum::{response::Json, routing::get, Router};
use once_cell::sync::Lazy;
use serde_json::json;

use crate::state::AppState;

pub mod poll_routes;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Every route without transport layers; `main` adds CORS and tracing.
pub fn app(state: AppState) -> Router {
    Lazy::force(&START_TIME);

    Router::new()
        .route("/", get(root))
        .nest("/api/polls", poll_routes::poll_routes(state))
}

/// Liveness probe with process uptime.
async fn root() -> Json<serde_json::Value> {
    let uptime_secs = START_TIME.elapsed().as_secs();

    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime_secs,
        "uptime": format_uptime(uptime_secs),
    }))
}

/// Largest unit first, zero-valued leading units omitted: `3h 0m 12s`.
fn format_uptime(total_secs: u64) -> String {
    let units = [(86_400, "d"), (3_600, "h"), (60, "m")];
    let mut remaining = total_secs;
    let mut parts = Vec::new();

    for (size, suffix) in units {
        let value = remaining / size;
        remaining %= size;
        if value > 0 || !parts.is_empty() {
            parts.push(format!("{}{}", value, suffix));
        }
    }
    parts.push(format!("{}s", remaining));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::format_uptime;

    #[test]
    fn uptime_skips_leading_zero_units() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(3 * 3_600 + 12), "3h 0m 12s");
        assert_eq!(format_uptime(86_400 + 61), "1d 0h 1m 1s");
    }
}
