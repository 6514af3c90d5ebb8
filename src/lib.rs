//! HTTP utility primitives on top of hyper
//!
//! - [`VersionRouter`]: dispatch by the `X-API-Version` request header, with
//!   a default handler and `OPTIONS` version discovery
//! - JSON helpers: [`write_json`], [`json_error`], [`read_json`],
//!   [`accepts_json`]
//! - [`HttpsRedirectServer`]: sends plain-HTTP clients to `https://`

pub mod config;
pub mod demo;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use error::{JsonBodyError, ServeError};
pub use handler::{Handler, HandlerFuture, HttpResponse};
pub use http::{accepts_json, json_error, read_json, text_error, write_json};
pub use routing::{SharedVersionRouter, VersionRouter};
pub use server::HttpsRedirectServer;
