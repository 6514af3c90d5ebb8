//! HTTP helpers
//!
//! JSON encoding/decoding, content negotiation and plain-text responses,
//! shared by the version router and the redirect server.

pub mod json;
pub mod response;

pub use json::{accepts_json, json_error, read_json, write_json, JSON_CONTENT_TYPE};
pub use response::{build_redirect_response, text_error};
