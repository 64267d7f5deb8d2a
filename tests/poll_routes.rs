use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use team_polls::middleware::identity::{MEMBER_HEADER, TEAM_HEADER};
use team_polls::routes;
use team_polls::state::AppState;
use team_polls::store::MemoryStore;

fn app() -> Router {
    routes::app(AppState::new(Arc::new(MemoryStore::new())))
}

fn request(method: Method, uri: &str, who: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((team, member)) = who {
        builder = builder.header(TEAM_HEADER, team).header(MEMBER_HEADER, member);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(app: &Router, who: (&str, &str), options: &[&str]) -> Value {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/polls/create",
            Some(who),
            Some(json!({ "title": "Colour", "description": "pick one", "options": options })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_root_reports_ok() {
    let (status, body) = send(&app(), request(Method::GET, "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn vote_flow_over_http() {
    let app = app();
    let poll = create(&app, ("T1", "m1"), &["Red", "Blue"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let red = poll["options"][0]["id"].as_str().unwrap();
    let blue = poll["options"][1]["id"].as_str().unwrap();
    assert_eq!(poll["results_visible"], false);
    assert_eq!(poll["options"][0]["votes"], Value::Null);

    let vote_uri = format!("/api/polls/{poll_id}/vote");
    let (status, view) = send(
        &app,
        request(Method::POST, &vote_uri, Some(("T1", "m1")), Some(json!({ "option_id": red }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["eligibility"], "already_voted");
    assert_eq!(view["options"][0]["votes"], 1);

    let (status, error) = send(
        &app,
        request(Method::POST, &vote_uri, Some(("T1", "m1")), Some(json!({ "option_id": blue }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "ALREADY_VOTED");
    assert_eq!(error["retryable"], false);

    let (status, own) = send(&app, request(Method::GET, &vote_uri, Some(("T1", "m1")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["has_voted"], true);
    assert_eq!(own["option_id"], red);

    let (status, results) = send(
        &app,
        request(Method::GET, &format!("/api/polls/{poll_id}/results"), Some(("T1", "m2")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["total_votes"], 1);
    assert_eq!(results["counts"][red], 1);
    assert_eq!(results["counts"][blue], 0);
}

#[tokio::test]
async fn create_validates_input() {
    let app = app();
    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/api/polls/create",
            Some(("T1", "m1")),
            Some(json!({ "title": "Lonely", "options": ["only", "  "] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");

    let (status, error) = send(
        &app,
        request(
            Method::POST,
            "/api/polls/create",
            None,
            Some(json!({ "title": "Nobody", "options": ["a", "b"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"], "MISSING_IDENTITY");
}

#[tokio::test]
async fn other_teams_cannot_reach_poll() {
    let app = app();
    let poll = create(&app, ("Alpha", "a1"), &["x", "y"]).await;
    let poll_id = poll["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        request(Method::GET, &format!("/api/polls/{poll_id}"), Some(("Beta", "b1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, request(Method::GET, "/api/polls", Some(("Beta", "b1")), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/api/polls/{poll_id}"), Some(("Beta", "b1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn close_then_delete() {
    let app = app();
    let poll = create(&app, ("T1", "m1"), &["x", "y"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let option = poll["options"][0]["id"].as_str().unwrap();

    let (status, closed) = send(
        &app,
        request(Method::POST, &format!("/api/polls/{poll_id}/close"), Some(("T1", "m1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["is_active"], false);
    assert_eq!(closed["eligibility"], "poll_inactive");

    let (status, error) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/polls/{poll_id}/vote"),
            Some(("T1", "m2")),
            Some(json!({ "option_id": option })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "POLL_CLOSED");

    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/api/polls/{poll_id}"), Some(("T1", "m2")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        request(Method::GET, &format!("/api/polls/{poll_id}"), Some(("T1", "m1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_supports_view_query() {
    let app = app();
    create(&app, ("T1", "m1"), &["x", "y"]).await;
    create(&app, ("T1", "m2"), &["x", "y"]).await;

    let (status, mine) = send(
        &app,
        request(Method::GET, "/api/polls?view=mine", Some(("T1", "m2")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["created_by"], "m2");

    let (_, voted) = send(
        &app,
        request(Method::GET, "/api/polls?view=voted", Some(("T1", "m2")), None),
    )
    .await;
    assert_eq!(voted, json!([]));
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() {
    let app = app();
    let (status, error) = send(
        &app,
        request(Method::POST, "/api/polls/create", Some(("T1", "m1")), Some(json!({ "title": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "BAD_REQUEST");
    assert_eq!(error["retryable"], false);
    assert!(error["message"].as_str().unwrap().contains("options"));

    let poll = create(&app, ("T1", "m1"), &["x", "y"]).await;
    let poll_id = poll["id"].as_str().unwrap();
    let (status, error) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/polls/{poll_id}/vote"),
            Some(("T1", "m1")),
            Some(json!({ "choice": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_view_is_a_json_bad_request() {
    let app = app();
    let (status, error) = send(
        &app,
        request(Method::GET, "/api/polls?view=everything", Some(("T1", "m1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "BAD_REQUEST");
    assert!(error["message"].as_str().unwrap().contains("Unknown view mode"));

    let (status, listed) = send(
        &app,
        request(Method::GET, "/api/polls?view=MINE", Some(("T1", "m1")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}
