use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::identity::Identity;

pub const TEAM_HEADER: &str = "x-team-name";
pub const MEMBER_HEADER: &str = "x-member-name";

/// Puts the caller's [`Identity`] into request extensions. Missing or blank
/// headers yield absent names; handlers decide whether that is acceptable.
pub async fn identity_context(mut req: Request, next: Next) -> Response {
    let identity = identity_from_headers(req.headers());
    req.extensions_mut().insert(identity);
    next.run(req).await
}

pub fn identity_from_headers(headers: &HeaderMap) -> Identity {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    Identity::new(header(TEAM_HEADER), header(MEMBER_HEADER))
}
