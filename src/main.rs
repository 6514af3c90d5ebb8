use std::sync::Arc;

use apiutil::config::{Config, DEFAULT_CONFIG_PATH};
use apiutil::server::{
    bind_listener, run_accept_loop, start_signal_handler, HttpsRedirectServer, SharedHandler,
    SignalHandler,
};
use apiutil::{demo, logger};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;

    logger::init(&cfg.logging)?;
    logger::log_config(&cfg);

    // Worker count comes from config; the runtime default is one per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals));

    let settings = cfg.connection_settings();

    let redirect_task = if cfg.redirect.enabled {
        let server = HttpsRedirectServer::new(cfg.get_redirect_socket_addr()?)
            .with_settings(settings.clone());
        Some(tokio::spawn(server.serve(signals.wait_for_shutdown())))
    } else {
        None
    };

    let app_addr = cfg.get_socket_addr()?;
    let app_listener = bind_listener(app_addr)?;
    // Route table is complete before the first connection is accepted
    let router: SharedHandler = Arc::new(demo::build_router(&cfg.versions.default));

    logger::log_server_start("api", &app_addr);
    run_accept_loop(
        app_listener,
        router,
        settings,
        signals.wait_for_shutdown(),
        "api",
    )
    .await;

    if let Some(task) = redirect_task {
        task.await??;
    }
    Ok(())
}
