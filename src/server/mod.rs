// Server module entry
// Listeners, connection serving, graceful shutdown and the HTTPS redirect server

pub mod connection;
pub mod listener;
pub mod redirect;
pub mod signal;

// `loop` is a keyword, so the module gets a different name
#[path = "loop.rs"]
pub mod server_loop;

pub use connection::{ConnectionSettings, SharedHandler};
pub use listener::{bind_listener, create_reusable_listener};
pub use redirect::{https_url, redirect_to_https, HttpsRedirectServer};
pub use server_loop::run_accept_loop;
pub use signal::{start_signal_handler, SignalHandler};
