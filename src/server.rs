//! Preview server composition.
//!
//! Wires the live-reload layer, the stylesheet asset route, and the
//! catch-all preview handler into one router, binds it, and advertises the
//! reachable URLs.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use notify::{Event, RecursiveMode, Watcher};
use tower_http::services::ServeFile;
use tower_livereload::LiveReloadLayer;

use crate::config::ServerConfig;
use crate::engine::{HtmlTransform, LiveReloadTransform};
use crate::net;
use crate::render::PreviewRenderer;

/// Build the preview router. The stylesheet artifact is mounted as a static
/// file when the href names one on disk; every other path falls through to
/// the catch-all preview handler.
pub fn app(config: &ServerConfig, transform: Arc<dyn HtmlTransform>) -> Router {
    let renderer = Arc::new(PreviewRenderer::new(config.clone(), transform));
    let mut router = Router::new();
    if let Some(file) = config.stylesheet_file() {
        router = router.route_service(&config.stylesheet_route(), ServeFile::new(file));
    }
    router.fallback(preview_page).with_state(renderer)
}

/// Catch-all handler: any path renders the preview document.
async fn preview_page(State(renderer): State<Arc<PreviewRenderer>>, uri: Uri) -> Response {
    let doc = renderer.render(uri.path()).await;
    (
        doc.status,
        [(header::CONTENT_TYPE, doc.content_type)],
        doc.body,
    )
        .into_response()
}

/// Bind the preview server and run until the process exits. On successful
/// bind the reachable URLs are printed, and optionally opened in the OS
/// browser.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser whenever a watched file is rebuilt.
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    if let Some(file) = config.stylesheet_file() {
        watcher.watch(&file, RecursiveMode::NonRecursive)?;
    }
    if let Some(dir) = config.template_path.parent() {
        if dir.is_dir() {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }
    }

    let transform: Arc<dyn HtmlTransform> = Arc::new(LiveReloadTransform::new());
    let app = app(&config, transform).layer(livereload);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!("Server started at following URLs:\n");
    let urls = net::resolve_server_urls(&net::interface_addresses(), config.port);
    net::print_server_urls(&urls, config.port, &mut std::io::stdout())?;

    if config.auto_open {
        if let Some(first) = urls.first() {
            if let Err(err) = open::that(&first.url) {
                tracing::warn!("failed to open browser: {err}");
            }
        }
    }

    // Keep the watcher alive for the life of the server.
    let _watcher = watcher;

    axum::serve(listener, app).await?;

    Ok(())
}
