use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};

/// Name the dataset is registered under inside a query session.
pub const PRODUCTS_TABLE: &str = "products";

pub const COL_PRODUCT_ID: &str = "product_id";
pub const COL_PRODUCT_NAME: &str = "product_name";
pub const COL_CATEGORY: &str = "category";
pub const COL_PRICE: &str = "price";
pub const COL_STOCK: &str = "stock";

/// Informational columns. Carried through listings, never aggregated.
pub const METADATA_COLUMNS: [&str; 5] = ["description", "sku", "supplier", "last_updated", "status"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub supplier: Option<String>,
    pub last_updated: Option<String>,
    pub status: Option<String>,
}

impl ProductRecord {
    pub fn new(product_id: i64, product_name: &str, category: &str, price: f64, stock: i64) -> Self {
        Self {
            product_id,
            product_name: product_name.to_string(),
            category: category.to_string(),
            price,
            stock,
            description: None,
            sku: None,
            supplier: None,
            last_updated: None,
            status: None,
        }
    }

    pub fn inventory_value(&self) -> f64 {
        self.price * self.stock as f64
    }

    fn metadata(&self, column: &str) -> Option<&str> {
        match column {
            "description" => self.description.as_deref(),
            "sku" => self.sku.as_deref(),
            "supplier" => self.supplier.as_deref(),
            "last_updated" => self.last_updated.as_deref(),
            "status" => self.status.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn metadata_values<'a>(rows: &'a [ProductRecord], column: &str) -> Vec<Option<&'a str>> {
        rows.iter().map(|r| r.metadata(column)).collect()
    }
}

/// Canonical in-memory schema. Whatever physical types the file uses are
/// cast to these before a query sees them.
pub fn product_schema() -> SchemaRef {
    let mut fields = vec![
        Field::new(COL_PRODUCT_ID, DataType::Int64, false),
        Field::new(COL_PRODUCT_NAME, DataType::Utf8, false),
        Field::new(COL_CATEGORY, DataType::Utf8, false),
        Field::new(COL_PRICE, DataType::Float64, false),
        Field::new(COL_STOCK, DataType::Int64, false),
    ];
    for name in METADATA_COLUMNS {
        fields.push(Field::new(name, DataType::Utf8, true));
    }
    Arc::new(Schema::new(fields))
}

/// Whole-catalog summary. Price aggregates are `None` for an empty dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total_products: i64,
    pub total_categories: i64,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub total_stock: i64,
}

impl ProductStats {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            total_categories: 0,
            avg_price: None,
            min_price: None,
            max_price: None,
            total_stock: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub product_count: i64,
    pub avg_price: Option<f64>,
    pub total_stock: i64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeCount {
    pub price_range: String,
    pub count: i64,
    pub avg_price: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockLevelCount {
    pub stock_level: String,
    pub count: i64,
    pub avg_price: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductValue {
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub inventory_value: f64,
}

/// Everything the analytics page renders, fetched in one go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: ProductStats,
    pub categories: Vec<CategoryStats>,
    pub price_distribution: Vec<PriceRangeCount>,
    pub stock_distribution: Vec<StockLevelCount>,
    pub top_products: Vec<ProductValue>,
    pub is_empty: bool,
}
