//! Replaceable route table
//!
//! A [`VersionRouter`] is immutable once built. When routes have to change
//! while serving, build a complete new router and publish it here; readers
//! always see either the old table or the new one, never a mix.

use std::sync::Arc;

use arc_swap::ArcSwap;
use hyper::Request;

use super::version::VersionRouter;
use crate::handler::{Handler, HandlerFuture};

pub struct SharedVersionRouter<B> {
    current: ArcSwap<VersionRouter<B>>,
}

impl<B: 'static> SharedVersionRouter<B> {
    pub fn new(router: VersionRouter<B>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<VersionRouter<B>> {
        self.current.load_full()
    }

    /// Publish a fully built replacement; requests already dispatched keep
    /// the table they started with.
    pub fn store(&self, router: VersionRouter<B>) {
        self.current.store(Arc::new(router));
    }

    pub fn dispatch(&self, req: Request<B>) -> HandlerFuture {
        self.current.load().dispatch(req)
    }
}

impl<B: 'static> Handler<B> for SharedVersionRouter<B> {
    fn call(&self, req: Request<B>) -> HandlerFuture {
        self.dispatch(req)
    }
}

impl<B: 'static> std::fmt::Debug for SharedVersionRouter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedVersionRouter")
            .field(&*self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::API_VERSION_HEADER;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Response, StatusCode};

    type Body = Full<Bytes>;

    fn reply(text: &'static str) -> impl Handler<Body> {
        move |_req: Request<Body>| async move { Response::new(Full::new(Bytes::from(text))) }
    }

    fn v2_request() -> Request<Body> {
        Request::builder()
            .header(API_VERSION_HEADER, "v2")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_replaces_table() {
        let shared = SharedVersionRouter::new(VersionRouter::new().route("v1", reply("v1")));

        let resp = shared.dispatch(v2_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        shared.store(
            VersionRouter::new()
                .route("v1", reply("v1"))
                .route("v2", reply("v2")),
        );

        let resp = shared.dispatch(v2_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"v2");
    }

    #[tokio::test]
    async fn test_loaded_snapshot_survives_store() {
        let shared = SharedVersionRouter::new(VersionRouter::new().route("v2", reply("old")));
        let snapshot = shared.load();

        shared.store(VersionRouter::new().route("v2", reply("new")));

        let resp = snapshot.dispatch(v2_request()).await;
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"old");
        assert_eq!(shared.load().versions(), vec!["v2"]);
    }
}
