//! Routing module
//!
//! Header-based request routing:
//! - `X-API-Version` dispatch with a default handler and OPTIONS discovery
//! - Atomic replacement of a published route table

mod shared;
mod version;

pub use shared::SharedVersionRouter;
pub use version::{
    VersionRouter, API_VERSION_HEADER, API_VERSION_REQUIRED_HEADER, DEFAULT_VERSION,
};
