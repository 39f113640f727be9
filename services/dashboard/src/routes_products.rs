use axum::extract::State;
use axum::Json;
use catalog::ProductRecord;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductRecord>,
}

pub async fn get_products(State(st): State<SharedState>) -> Result<Json<ProductsResponse>, ApiError> {
    let products = st.analytics.list_products().await?;
    Ok(Json(ProductsResponse { products }))
}
