use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::{
    api::{
        self,
        handler::{not_found, root, AppState},
        models::{ApiIndex, EndpointDoc},
    },
    config::{Settings, SERVICE_DESCRIPTION, SERVICE_NAME, SERVICE_VERSION},
    error::{AppError, AppResult},
    lifecycle::{HookReport, Lifecycle},
    middleware::create_cors_layer,
    orders,
    reload::{ExecutableWatcher, ServerExit, RELOAD_POLL_INTERVAL},
    signals,
};

/// Paths owned by the shell itself
const RESERVED_PREFIXES: [&str; 2] = ["/", "/docs"];

/// A named set of routes mounted under one path prefix
pub struct RouteGroup {
    prefix: &'static str,
    tag: &'static str,
    router: Router<AppState>,
    endpoints: Vec<(&'static str, &'static str, &'static str)>,
}

impl RouteGroup {
    pub fn new(prefix: &'static str, tag: &'static str, router: Router<AppState>) -> Self {
        Self {
            prefix,
            tag,
            router,
            endpoints: Vec::new(),
        }
    }

    /// Record an endpoint for `/docs`; `path` is relative to the prefix.
    pub fn describe(mut self, method: &'static str, path: &'static str, summary: &'static str) -> Self {
        self.endpoints.push((method, path, summary));
        self
    }

    fn docs(&self) -> impl Iterator<Item = EndpointDoc> + '_ {
        self.endpoints.iter().map(move |&(method, path, summary)| EndpointDoc {
            method,
            path: match path {
                "/" => self.prefix.to_string(),
                p => format!("{}{}", self.prefix, p),
            },
            tag: self.tag,
            summary,
        })
    }
}

/// The service's route groups: health, TradingView webhook, orders
pub fn route_groups(state: &AppState) -> Vec<RouteGroup> {
    vec![api::routes(), signals::routes(state), orders::routes()]
}

fn validate_prefix(prefix: &str, seen: &HashSet<&str>) -> AppResult<()> {
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        return Err(AppError::Startup(format!(
            "route prefix '{}' must start with '/' and name a path segment",
            prefix
        )));
    }
    if prefix.contains(':') || prefix.contains('*') {
        return Err(AppError::Startup(format!(
            "route prefix '{}' must not contain parameters",
            prefix
        )));
    }
    if RESERVED_PREFIXES.contains(&prefix) {
        return Err(AppError::Startup(format!("route prefix '{}' is reserved", prefix)));
    }
    if seen.contains(prefix) {
        return Err(AppError::Startup(format!("route prefix '{}' is mounted twice", prefix)));
    }
    Ok(())
}

/// Compose the route groups into the application router.
///
/// Fails before anything is bound if a group cannot be mounted.
pub fn create_app(state: AppState, groups: Vec<RouteGroup>) -> AppResult<Router> {
    info!("⚙️ Setting up HTTP routes...");

    let mut seen = HashSet::new();
    let mut endpoints = vec![
        EndpointDoc {
            method: "GET",
            path: "/".to_string(),
            tag: "root",
            summary: "Service status",
        },
        EndpointDoc {
            method: "GET",
            path: "/docs".to_string(),
            tag: "root",
            summary: "This index",
        },
    ];

    let mut app = Router::new().route("/", get(root));

    for group in groups {
        validate_prefix(group.prefix, &seen)?;
        seen.insert(group.prefix);
        endpoints.extend(group.docs());

        info!("   ✓ {} routes mounted at {}", group.tag, group.prefix);
        app = app.nest(group.prefix, group.router);
    }

    let index = Arc::new(ApiIndex {
        title: SERVICE_NAME,
        description: SERVICE_DESCRIPTION,
        version: SERVICE_VERSION,
        endpoints,
    });

    let app = app
        .route(
            "/docs",
            get(move || {
                let index = index.clone();
                async move { Json(index.as_ref().clone()) }
            }),
        )
        .fallback(not_found)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("✓ HTTP routes configured");
    Ok(app)
}

/// Run startup hooks, bind, serve until Ctrl+C / SIGTERM (or a rebuild in
/// development mode), then run shutdown hooks.
pub async fn run_server(
    app: Router,
    settings: &Settings,
    lifecycle: &Lifecycle,
) -> AppResult<ServerExit> {
    let (startup, shutdown) = lifecycle.hook_names();
    debug!("Lifecycle hooks: startup {:?}, shutdown {:?}", startup, shutdown);
    log_hook_report("startup", &lifecycle.run_startup());

    let watcher = if settings.reload_enabled() {
        match ExecutableWatcher::current() {
            Ok(watcher) => {
                info!("♻️  Auto-reload enabled, watching {}", watcher.path().display());
                Some(watcher)
            }
            Err(e) => {
                warn!("⚠️  Auto-reload unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let address = settings.bind_address();
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            log_hook_report("shutdown", &lifecycle.run_shutdown());
            return Err(e.into());
        }
    };
    info!("🌐 Server listening on: {}", address);

    let (reload_tx, mut reload_rx) = tokio::sync::oneshot::channel();
    let shutdown = async move {
        match watcher {
            Some(watcher) => {
                let path = watcher.path().to_path_buf();
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = watcher.changed(RELOAD_POLL_INTERVAL) => {
                        let _ = reload_tx.send(path);
                    }
                }
            }
            None => shutdown_signal().await,
        }
    };

    serve(listener, app, lifecycle, shutdown).await?;

    Ok(match reload_rx.try_recv() {
        Ok(path) => ServerExit::Reload(path),
        Err(_) => ServerExit::Shutdown,
    })
}

/// Serve on an already-bound listener until `shutdown` resolves, then run
/// the shutdown hooks. In-flight requests finish before this returns.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    lifecycle: &Lifecycle,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    info!("Listener closed");
    log_hook_report("shutdown", &lifecycle.run_shutdown());

    result.map_err(AppError::from)
}

fn log_hook_report(phase: &str, report: &HookReport) {
    if !report.is_clean() {
        let failed: Vec<&str> = report.failed.iter().map(|(name, _)| *name).collect();
        warn!(
            "⚠️  {} finished with {} failed hook(s): {}",
            phase,
            failed.len(),
            failed.join(", ")
        );
    }
}

/// Listens for Ctrl+C and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
