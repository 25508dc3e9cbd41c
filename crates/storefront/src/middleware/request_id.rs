//! Request ID middleware for request tracing and correlation.
//!
//! Every request carries an ID, either forwarded by an upstream proxy in
//! `x-request-id` or freshly generated. The ID is recorded on the
//! `http_request` span opened by the trace layer, tagged on the Sentry scope,
//! stored as a [`RequestId`] extension, and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted before a fresh one is generated.
const MAX_FORWARDED_LEN: usize = 128;

/// The current request's ID, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        forwarded_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// An upstream ID, if present and printable.
fn forwarded_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_FORWARDED_LEN
        && value.chars().all(|c| c.is_ascii_graphic());
    usable.then(|| value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_id_kept() {
        assert_eq!(
            forwarded_id(&headers("cf-abc-123")).as_deref(),
            Some("cf-abc-123")
        );
    }

    #[test]
    fn test_unusable_forwarded_id_ignored() {
        assert_eq!(forwarded_id(&HeaderMap::new()), None);
        assert_eq!(forwarded_id(&headers("   ")), None);
        assert_eq!(forwarded_id(&headers("has space")), None);
        assert_eq!(forwarded_id(&headers(&"x".repeat(129))), None);
    }
}
