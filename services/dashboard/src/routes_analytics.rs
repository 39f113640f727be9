use axum::extract::{Query, State};
use axum::Json;
use catalog::{CategoryStats, Dashboard, PriceRangeCount, ProductStats, ProductValue, StockLevelCount};
use serde::Deserialize;

use crate::config::MAX_TOP_LIMIT;
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self, default: usize) -> Result<usize, ApiError> {
        match self.limit {
            None => Ok(default),
            Some(n) if (1..=MAX_TOP_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(ApiError::bad_request(format!(
                "limit must be between 1 and {MAX_TOP_LIMIT}, got {n}"
            ))),
        }
    }
}

/// Everything the analytics page shows, in one response.
pub async fn get_dashboard(
    State(st): State<SharedState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let limit = q.resolve(st.config.top_products_limit)?;
    let dashboard = st.analytics.dashboard(limit).await?;
    tracing::debug!(
        products = dashboard.stats.total_products,
        categories = dashboard.categories.len(),
        "dashboard computed"
    );
    Ok(Json(dashboard))
}

pub async fn get_stats(State(st): State<SharedState>) -> Result<Json<ProductStats>, ApiError> {
    Ok(Json(st.analytics.product_stats().await?))
}

pub async fn get_categories(State(st): State<SharedState>) -> Result<Json<Vec<CategoryStats>>, ApiError> {
    Ok(Json(st.analytics.category_stats().await?))
}

pub async fn get_price_distribution(
    State(st): State<SharedState>,
) -> Result<Json<Vec<PriceRangeCount>>, ApiError> {
    Ok(Json(st.analytics.price_distribution().await?))
}

pub async fn get_stock_distribution(
    State(st): State<SharedState>,
) -> Result<Json<Vec<StockLevelCount>>, ApiError> {
    Ok(Json(st.analytics.stock_distribution().await?))
}

pub async fn get_top_products(
    State(st): State<SharedState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<ProductValue>>, ApiError> {
    let limit = q.resolve(st.config.top_products_limit)?;
    Ok(Json(st.analytics.top_products_by_value(limit).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use catalog::{write_products, ProductRecord};
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;
    use tower::ServiceExt as _;

    use crate::state::test_state;

    fn seeded(rows: &[ProductRecord]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_products(&dir.path().join("products.parquet"), rows).unwrap();
        dir
    }

    fn sample() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new(1, "Laptop Pro", "Electronics", 999.99, 15),
            ProductRecord::new(2, "Wireless Mouse", "Accessories", 29.99, 150),
            ProductRecord::new(3, "Mechanical Keyboard", "Electronics", 79.99, 80),
            ProductRecord::new(4, "4K Monitor", "Electronics", 299.99, 20),
            ProductRecord::new(5, "USB-C Cable", "Accessories", 19.99, 500),
        ]
    }

    async fn get(dir: &TempDir, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = crate::app(test_state(dir.path(), dir.path()));
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_dashboard_bundle() {
        let dir = seeded(&sample());
        let (status, json) = get(&dir, "/api/analytics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_empty"], false);
        assert_eq!(json["stats"]["total_products"], 5);
        assert_eq!(json["stats"]["total_categories"], 2);
        assert_eq!(json["categories"][0]["category"], "Electronics");
        assert_eq!(json["categories"][0]["product_count"], 3);
        // default limit comes from config
        assert_eq!(json["top_products"].as_array().unwrap().len(), 3);
        assert_eq!(json["top_products"][0]["product_name"], "Laptop Pro");
        assert_eq!(json["price_distribution"][0]["price_range"], "Under $50");
    }

    #[tokio::test]
    async fn test_empty_dataset_renders_empty_state() {
        let dir = seeded(&[]);
        let (status, json) = get(&dir, "/api/analytics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_empty"], true);
        assert_eq!(json["stats"]["total_products"], 0);
        assert!(json["stats"]["avg_price"].is_null());
        assert!(json["categories"].as_array().unwrap().is_empty());
        assert!(json["top_products"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_dataset_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = get(&dir, "/api/stats").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "DATASET_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Arc::new(Schema::new(vec![
            Field::new("product_id", DataType::Int64, false),
            Field::new("category", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![1])), Arc::new(StringArray::from(vec!["X"]))],
        )
        .unwrap();
        let file = std::fs::File::create(dir.path().join("products.parquet")).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let (status, json) = get(&dir, "/api/categories").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "SCHEMA_MISMATCH");
    }

    #[tokio::test]
    async fn test_top_products_limit() {
        let dir = seeded(&sample());

        let (status, json) = get(&dir, "/api/top-products?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let top = json.as_array().unwrap();
        assert_eq!(top.len(), 2);
        // 999.99 * 15 beats 19.99 * 500
        assert_eq!(top[0]["product_id"], 1);
        assert_eq!(top[1]["product_id"], 5);

        let (status, json) = get(&dir, "/api/top-products?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BAD_REQUEST");

        let (status, _) = get(&dir, "/api/analytics?limit=1000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_distribution_routes() {
        let dir = seeded(&sample());

        let (status, json) = get(&dir, "/api/price-distribution").await;
        assert_eq!(status, StatusCode::OK);
        let total: i64 = json.as_array().unwrap().iter().map(|b| b["count"].as_i64().unwrap()).sum();
        assert_eq!(total, 5);

        let (status, json) = get(&dir, "/api/stock-distribution").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["stock_level"], "High Stock");
        assert_eq!(json[0]["count"], 2);
    }
}
