//! JSON request/response helpers
//!
//! Thin wrappers around `serde_json` that produce ready-to-send responses
//! and decode request bodies.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::response::log_build_error;
use crate::error::JsonBodyError;
use crate::handler::HttpResponse;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Serialize `value` and wrap it in a response with the given status.
///
/// When serialization fails the payload is replaced by a 500 JSON error
/// carrying the serializer's message.
pub fn write_json<T: Serialize + ?Sized>(value: &T, status: StatusCode) -> HttpResponse {
    let body = match serde_json::to_vec(value) {
        Ok(body) => body,
        Err(e) => return json_error(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Write `{"error": message}` with the given status
pub fn json_error(message: &str, status: StatusCode) -> HttpResponse {
    write_json(&ErrorBody { error: message }, status)
}

/// Read the whole request body and decode it as JSON.
pub async fn read_json<T, B>(req: Request<B>) -> Result<T, JsonBodyError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: std::fmt::Display,
{
    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| JsonBodyError::Read(e.to_string()))?
        .to_bytes();

    Ok(serde_json::from_slice(&body)?)
}

/// Whether the `Accept` header starts with `application/json`.
///
/// Only the first value of the header is inspected and no quality
/// parameters are weighed.
pub fn accepts_json<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(ACCEPT)
        .is_some_and(|accept| accept.as_bytes().starts_with(JSON_CONTENT_TYPE.as_bytes()))
}
