use axum::{
    body::Body,
    http::{Request, StatusCode, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::errors::HttpError;

/// Rejects browser requests whose `Origin` is not a loopback address.
/// Requests without an `Origin` header (hook scripts, curl) pass through.
pub async fn require_loopback_origin(req: Request<Body>, next: Next) -> Result<Response, HttpError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let origin = origin.to_str().map_err(|_| {
            HttpError::new(
                StatusCode::BAD_REQUEST,
                "invalid Origin header",
                Some("invalid_origin".to_string()),
            )
        })?;
        if !is_loopback_origin(origin) {
            tracing::warn!(origin, "rejected request from non-loopback origin");
            return Err(HttpError::new(
                StatusCode::FORBIDDEN,
                "invalid origin",
                Some("invalid_origin".to_string()),
            ));
        }
    }
    Ok(next.run(req).await)
}

fn is_loopback_origin(origin: &str) -> bool {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));
    let Some(host) = rest else {
        return false;
    };
    let host = match host.strip_prefix('[') {
        Some(ipv6) => ipv6.split(']').next().map(|addr| format!("[{addr}]")),
        None => host.split(':').next().map(str::to_string),
    };
    matches!(
        host.as_deref(),
        Some("127.0.0.1") | Some("localhost") | Some("[::1]")
    )
}
