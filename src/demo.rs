//! Demo API served by the `apiutil` binary
//!
//! Two versions of a greeting endpoint behind a [`VersionRouter`]:
//! `v1` answers `{"message": ...}`, `v2` adds the version and echoes the
//! caller's name. `POST` bodies are decoded with [`read_json`].

use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use serde::{Deserialize, Serialize};

use crate::handler::HttpResponse;
use crate::http::{json_error, read_json, write_json};
use crate::logger;
use crate::routing::VersionRouter;

#[derive(Debug, Deserialize)]
struct GreetRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct GreetingV1 {
    message: String,
}

#[derive(Debug, Serialize)]
struct GreetingV2 {
    message: String,
    version: &'static str,
    name: Option<String>,
}

/// Build the demo router; `default_version` ("", "v1" or "v2") picks the
/// handler that serves requests without a known version.
pub fn build_router<B>(default_version: &str) -> VersionRouter<B>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    let router = VersionRouter::new()
        .route("v1", greet_v1::<B>)
        .route("v2", greet_v2::<B>);

    match default_version {
        "" => router,
        "v1" => router.with_default(greet_v1::<B>),
        "v2" => router.with_default(greet_v2::<B>),
        other => {
            logger::log_warning(&format!(
                "Unknown default version '{other}', requests must set X-API-Version"
            ));
            router
        }
    }
}

/// Name from a `POST` body; `Ok(None)` for other methods
async fn requested_name<B>(req: Request<B>) -> Result<Option<String>, HttpResponse>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    if req.method() != Method::POST {
        return Ok(None);
    }
    match read_json::<GreetRequest, B>(req).await {
        Ok(body) => Ok(Some(body.name)),
        Err(e) => Err(json_error(&e.to_string(), StatusCode::BAD_REQUEST)),
    }
}

async fn greet_v1<B>(req: Request<B>) -> HttpResponse
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match requested_name(req).await {
        Ok(name) => write_json(
            &GreetingV1 {
                message: format!("hello, {}", name.as_deref().unwrap_or("world")),
            },
            StatusCode::OK,
        ),
        Err(resp) => resp,
    }
}

async fn greet_v2<B>(req: Request<B>) -> HttpResponse
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match requested_name(req).await {
        Ok(name) => write_json(
            &GreetingV2 {
                message: format!("hello, {}", name.as_deref().unwrap_or("world")),
                version: "v2",
                name,
            },
            StatusCode::OK,
        ),
        Err(resp) => resp,
    }
}
