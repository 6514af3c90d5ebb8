//! `X-API-Version` header routing
//!
//! Dispatches each request to the handler registered for the exact value
//! of its `X-API-Version` header. The empty key is the default handler,
//! used when the header is absent or names an unknown version.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};

use crate::handler::{Handler, HandlerFuture, HttpResponse};
use crate::http::{accepts_json, json_error, text_error};

/// Request header selecting a version; response header listing versions
pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("x-api-version");

/// Response header announcing that header-based versioning is in effect
pub const API_VERSION_REQUIRED_HEADER: HeaderName =
    HeaderName::from_static("x-api-version-required");

/// Key of the default handler
pub const DEFAULT_VERSION: &str = "";

const API_VERSION_REQUIRED: &str = "the X-API-Version header is required";

/// Routes requests by the value of their `X-API-Version` header.
///
/// Build the table once, then share it (usually behind an `Arc`); there is
/// no way to change routes on a router that is already serving. Use
/// [`super::SharedVersionRouter`] to publish a replacement table.
///
/// `OPTIONS` requests are answered by the router itself: the response
/// carries `X-API-Version-Required: yes` and an `X-API-Version` header
/// listing every non-default version, joined by `", "` in no particular
/// order.
pub struct VersionRouter<B> {
    routes: HashMap<String, Arc<dyn Handler<B>>>,
}

impl<B: 'static> VersionRouter<B> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register `handler` under `version`; a later registration for the
    /// same key replaces the earlier one.
    #[must_use]
    pub fn route<H: Handler<B>>(mut self, version: impl Into<String>, handler: H) -> Self {
        self.routes.insert(version.into(), Arc::new(handler));
        self
    }

    /// Register the handler used when no version matches
    #[must_use]
    pub fn with_default<H: Handler<B>>(self, handler: H) -> Self {
        self.route(DEFAULT_VERSION, handler)
    }

    /// Registered versions, excluding the default key
    pub fn versions(&self) -> Vec<&str> {
        self.routes
            .keys()
            .map(String::as_str)
            .filter(|version| !version.is_empty())
            .collect()
    }

    pub fn has_default(&self) -> bool {
        self.routes.contains_key(DEFAULT_VERSION)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch a request.
    ///
    /// Never fails: a missing route without a default handler becomes a
    /// `400 Bad Request`, rendered as JSON when the client accepts it and as
    /// plain text otherwise.
    pub fn dispatch(&self, req: Request<B>) -> HandlerFuture {
        if req.method() == Method::OPTIONS {
            let resp = self.describe();
            return Box::pin(std::future::ready(resp));
        }

        let handler = self
            .routes
            .get(requested_version(&req))
            .or_else(|| self.routes.get(DEFAULT_VERSION));

        match handler {
            Some(handler) => handler.call(req),
            None => {
                let resp = version_required(&req);
                Box::pin(std::future::ready(resp))
            }
        }
    }

    /// Answer an `OPTIONS` request without touching any handler
    fn describe(&self) -> HttpResponse {
        // Versions that cannot appear in a header value can never be
        // requested either, so they are left out of the listing.
        let versions: Vec<&str> = self
            .versions()
            .into_iter()
            .filter(|version| HeaderValue::from_bytes(version.as_bytes()).is_ok())
            .collect();

        let mut resp = Response::new(Full::new(Bytes::new()));
        let headers = resp.headers_mut();
        headers.insert(API_VERSION_REQUIRED_HEADER, HeaderValue::from_static("yes"));
        if let Ok(value) = HeaderValue::from_bytes(versions.join(", ").as_bytes()) {
            headers.insert(API_VERSION_HEADER, value);
        }
        resp
    }
}

impl<B: 'static> Default for VersionRouter<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: 'static, K, H> FromIterator<(K, H)> for VersionRouter<B>
where
    K: Into<String>,
    H: Handler<B>,
{
    fn from_iter<I: IntoIterator<Item = (K, H)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |router, (version, handler)| {
                router.route(version, handler)
            })
    }
}

impl<B: 'static> std::fmt::Debug for VersionRouter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionRouter")
            .field("versions", &self.versions())
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// A router can itself be registered as a handler, e.g. under another
/// router's default key.
impl<B: 'static> Handler<B> for VersionRouter<B> {
    fn call(&self, req: Request<B>) -> HandlerFuture {
        self.dispatch(req)
    }
}

impl<B: 'static> hyper::service::Service<Request<B>> for VersionRouter<B> {
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Infallible>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let fut = self.dispatch(req);
        Box::pin(async move { Ok(fut.await) })
    }
}

/// The requested version, or the default key when the header is absent.
/// Non-UTF-8 values are treated as absent.
fn requested_version<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(API_VERSION_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .unwrap_or(DEFAULT_VERSION)
}

fn version_required<B>(req: &Request<B>) -> HttpResponse {
    if accepts_json(req) {
        json_error(API_VERSION_REQUIRED, StatusCode::BAD_REQUEST)
    } else {
        text_error(API_VERSION_REQUIRED, StatusCode::BAD_REQUEST)
    }
}
