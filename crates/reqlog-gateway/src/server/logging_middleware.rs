//! HTTP Request Logging Middleware
//!
//! Scopes a request id around every request so that all records logged while
//! serving it carry the same id, wherever they are emitted from.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use reqlog_core::context::{self, RequestIdGuard};
use tracing::Instrument;

use crate::logging::{generate_request_id, RequestContext, RequestSpan};

/// Header carrying the request id in both directions
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client supplied request id that is accepted
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id sent by the client, if it is usable
pub fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let valid = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.chars().all(|c| c.is_ascii_graphic());
    valid.then(|| value.to_string())
}

/// Request id middleware
///
/// Takes the client's `x-request-id` or generates one, runs the rest of the
/// stack in its own log context with that id set, logs one entry and one
/// exit line and echoes the id on the response. The id is cleared when the
/// request finishes, on every path out of the handler.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(generate_request_id);
    let ctx = RequestContext::new(request_id, request.method().as_str(), request.uri().path());

    // Handlers can extract the context for their own use
    request.extensions_mut().insert(ctx.clone());

    context::scope(async move {
        let _request_id = RequestIdGuard::set(ctx.request_id.clone());
        let span = RequestSpan::enter(&ctx);

        async move {
            RequestSpan::log_entry(&ctx);

            let mut response = next.run(request).await;
            RequestSpan::log_exit(&ctx, response.status().as_u16());

            if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        }
        .instrument(span)
        .await
    })
    .await
}
