//! Request handler abstraction
//!
//! A [`Handler`] is anything that turns a request into a response
//! asynchronously. Async closures get an implementation for free, so a
//! plain `|req| async move { ... }` can be registered with a router or
//! served directly.

use std::future::Future;
use std::pin::Pin;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};

/// Fully buffered response produced by every handler in this crate
pub type HttpResponse = Response<Full<Bytes>>;

/// Boxed future returned by [`Handler::call`]
pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send + 'static>>;

/// Something that can process a request and produce a response.
///
/// The returned future must not borrow the handler, which lets callers
/// resolve a handler and drop their reference to the route table before
/// the response is produced.
pub trait Handler<B>: Send + Sync + 'static {
    fn call(&self, req: Request<B>) -> HandlerFuture;
}

impl<B, F, Fut> Handler<B> for F
where
    F: Fn(Request<B>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    fn call(&self, req: Request<B>) -> HandlerFuture {
        Box::pin(self(req))
    }
}
