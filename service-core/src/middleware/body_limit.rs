//! Declared-size request guard.
//!
//! Rejects mutating requests whose `content-length` header exceeds the
//! configured cap before the body is buffered. The check is advisory: a
//! chunked request without a `content-length` header bypasses it.

use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};

pub const DEFAULT_MAX_BODY_BYTES: u64 = 1_048_576;

const BYTES_PER_MIB: f64 = 1_048_576.0;

#[derive(Debug, Clone, Copy)]
pub struct BodyLimit {
    pub max_bytes: u64,
}

impl Default for BodyLimit {
    fn default() -> Self {
        BodyLimit {
            max_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Middleware enforcing [`BodyLimit`] on POST, PUT and PATCH requests.
pub async fn body_limit_middleware(
    State(limit): State<BodyLimit>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = req.method();
    if method == Method::POST || method == Method::PUT || method == Method::PATCH {
        if let Some(declared) = declared_length(&req) {
            if declared > limit.max_bytes {
                tracing::warn!(
                    declared_bytes = declared,
                    max_bytes = limit.max_bytes,
                    path = %req.uri().path(),
                    "Rejecting oversized request body"
                );
                return Err(AppError::PayloadTooLarge(oversize_message(
                    declared,
                    limit.max_bytes,
                )));
            }
        }
    }

    Ok(next.run(req).await)
}

fn declared_length(req: &Request) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn oversize_message(declared: u64, max: u64) -> String {
    format!(
        "Request body is {:.1}MB (max {:.1}MB)",
        declared as f64 / BYTES_PER_MIB,
        max as f64 / BYTES_PER_MIB
    )
}
