mod config;
mod error;
mod routes_analytics;
mod routes_products;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;
    let app_state = Arc::new(AppState::new(cfg.clone()));

    // --- Startup checks (fail fast) ---
    startup_checks(&app_state).await?;

    let app = app(app_state);

    let addr = &cfg.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("dashboard listening on http://{addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Showcase and tutorial pages, by route, relative to the static directory.
const PAGES: [(&str, &str); 10] = [
    ("/", "overview.html"),
    ("/dashboard-showcase", "home.html"),
    ("/crud-showcase", "crud_showcase.html"),
    ("/tutorial/layout-grid", "tutorial_layout_grid.html"),
    ("/tutorial/typography", "tutorial_typography.html"),
    ("/tutorial/components", "tutorial_components.html"),
    ("/tutorial/building-pages", "tutorial_building_pages.html"),
    ("/tutorial/connecting-data", "tutorial_connecting_data.html"),
    ("/products", "products.html"),
    ("/analytics", "analytics.html"),
];

pub fn app(state: SharedState) -> Router {
    let static_dir = PathBuf::from(&state.config.static_dir);

    let mut router = Router::new();
    for (route, file) in PAGES {
        router = router.route_service(route, ServeFile::new(static_dir.join(file)));
    }

    router
        .route("/health", get(health))
        .route("/api/analytics", get(crate::routes_analytics::get_dashboard))
        .route("/api/stats", get(crate::routes_analytics::get_stats))
        .route("/api/categories", get(crate::routes_analytics::get_categories))
        .route("/api/price-distribution", get(crate::routes_analytics::get_price_distribution))
        .route("/api/stock-distribution", get(crate::routes_analytics::get_stock_distribution))
        .route("/api/top-products", get(crate::routes_analytics::get_top_products))
        .route("/api/products", get(crate::routes_products::get_products))
        // scripts, styles and anything else under the static directory
        .fallback_service(ServeDir::new(&static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn startup_checks(state: &AppState) -> Result<()> {
    let path = state.analytics.store().path().display().to_string();
    let stats = state
        .analytics
        .product_stats()
        .await
        .with_context(|| format!("Dataset check failed for {path}"))?;
    info!(products = stats.total_products, categories = stats.total_categories, "dataset: ok ({path})");

    if !Path::new(&state.config.static_dir).is_dir() {
        warn!(dir = %state.config.static_dir, "static page directory missing, only the API will be served");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    use crate::state::test_state;

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let resp = crate::app(test_state(dir.path(), dir.path()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_pages_fall_through() {
        let data = tempfile::tempdir().unwrap();
        let pages = tempfile::tempdir().unwrap();
        std::fs::write(pages.path().join("overview.html"), "<h1>Overview</h1>").unwrap();

        let app = crate::app(test_state(data.path(), pages.path()));
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/overview.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>Overview</h1>");

        let resp = app
            .oneshot(Request::builder().uri("/missing.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_routes_serve_without_extension() {
        let data = tempfile::tempdir().unwrap();
        let pages = tempfile::tempdir().unwrap();
        std::fs::write(pages.path().join("overview.html"), "overview").unwrap();
        std::fs::write(pages.path().join("tutorial_layout_grid.html"), "layout grid").unwrap();

        let app = crate::app(test_state(data.path(), pages.path()));
        for (uri, expected) in [("/", "overview"), ("/tutorial/layout-grid", "layout grid")] {
            let resp = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], expected.as_bytes());
        }

        // page not generated yet
        let resp = app
            .oneshot(Request::builder().uri("/crud-showcase").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
