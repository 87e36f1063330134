use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Caller identity, already verified upstream.
///
/// In production an auth proxy sits in front of this service and sets the
/// x-devspace-user header after session verification. For local
/// development without a proxy we fall back to the plain x-user header.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get("x-devspace-user")
        .or_else(|| req.headers().get("x-forwarded-user")) // oauth2-proxy format
        .or_else(|| req.headers().get("x-user")) // fallback for dev
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    // If no identity, return 401
    let id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(AuthenticatedUser { id });

    Ok(next.run(req).await)
}
