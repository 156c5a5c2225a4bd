//! Web server: catalog API and the objective proxy

pub mod http;

use anyhow::{Result, Context};
use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::completion::{CompletionClient, ObjectiveSource};
use crate::config::Config;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    /// Provider behind the proxy; `None` when no API key is configured
    pub objective: Option<Arc<dyn ObjectiveSource>>,
}

impl ServerState {
    /// Build state from config, loading the catalog and provider client
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = Catalog::load(&config)?;
        let objective: Option<Arc<dyn ObjectiveSource>> = match CompletionClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("Objective proxy has no provider key ({}); requests will fail", e);
                None
            }
        };
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            objective,
        })
    }
}

/// All routes with their layers
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_page))
        .route("/api/status", get(http::status_handler))
        .route("/api/dashboard", get(http::dashboard_handler))
        .route("/api/projects", get(http::list_projects_handler))
        .route("/api/projects/{id}", get(http::project_handler))
        .route("/api/core-objective", post(http::core_objective_handler))
        .route("/api/assistant", post(http::assistant_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start(
    host: &str,
    port: u16,
    https: bool,
    cert: Option<String>,
    key: Option<String>,
) -> Result<()> {
    let tls_files = match (https, cert, key) {
        (false, _, _) => None,
        (true, Some(cert), Some(key)) => Some((cert, key)),
        (true, _, _) => anyhow::bail!("--https requires --cert and --key"),
    };

    let config = Config::load()?;
    let state = ServerState::from_config(config)?;
    let objective_ready = state.objective.is_some();
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("     NextMind Server Starting");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("✓ Server binding to: {}", addr);
    if objective_ready {
        println!("✓ Objective proxy ready");
    } else {
        println!("⚠ Objective proxy has no API key; clients will get local summaries");
        println!("  Tip: nextmind config --set-api-key YOUR_KEY");
    }
    println!();
    println!("🚀 Listening on http{}://{}", if https { "s" } else { "" }, addr);
    println!();

    info!(%addr, https, "Server starting");

    if let Some((cert_path, key_path)) = tls_files {
        let cert_data = tokio::fs::read(&cert_path).await
            .context("Failed to read certificate file")?;
        let key_data = tokio::fs::read(&key_path).await
            .context("Failed to read key file")?;

        let tls = axum_server::tls_rustls::RustlsConfig::from_pem(cert_data, key_data).await?;
        axum_server::bind_rustls(addr, tls).serve(app.into_make_service()).await?;
        return Ok(());
    }

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

/// Handler for the index page
async fn index_page() -> Html<&'static str> {
    Html(r#"<!DOCTYPE html>
<html>
<head>
    <title>NextMind Incubator</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }
        h1 { color: #d62d2d; }
        .endpoint {
            background: #f3f3f3;
            padding: 10px;
            margin: 10px 0;
            border-radius: 4px;
            font-family: monospace;
        }
    </style>
</head>
<body>
    <h1>NextMind Incubator API</h1>
    <h2>Endpoints:</h2>
    <div class="endpoint">GET /api/status - Server status</div>
    <div class="endpoint">GET /api/dashboard - Dashboard modules and stats</div>
    <div class="endpoint">GET /api/projects?status=&amp;q= - Project list</div>
    <div class="endpoint">GET /api/projects/{id} - Project detail with lessons</div>
    <div class="endpoint">POST /api/core-objective - Objective-only summary of a lesson context</div>
    <div class="endpoint">POST /api/assistant - Lesson assistant reply</div>
</body>
</html>"#)
}
