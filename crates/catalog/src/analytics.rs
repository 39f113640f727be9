//! Aggregation queries behind the analytics dashboard.
//!
//! Each call opens a fresh query session, registers the dataset as it is on
//! disk right now and runs a single statement. Nothing is cached between
//! calls, so concurrent callers share no state.

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use tracing::debug;

use crate::bands::{case_expression, PRICE_BANDS, STOCK_BANDS};
use crate::error::{CatalogError, Result};
use crate::schema::*;
use crate::store::DatasetStore;

pub const DEFAULT_TOP_LIMIT: usize = 10;

const STATS_SQL: &str = "SELECT \
        COUNT(*) AS total_products, \
        COUNT(DISTINCT category) AS total_categories, \
        AVG(price) AS avg_price, \
        MIN(price) AS min_price, \
        MAX(price) AS max_price, \
        COALESCE(SUM(stock), 0) AS total_stock \
    FROM products";

const CATEGORY_SQL: &str = "SELECT \
        category, \
        COUNT(*) AS product_count, \
        AVG(price) AS avg_price, \
        COALESCE(SUM(stock), 0) AS total_stock, \
        MIN(price) AS min_price, \
        MAX(price) AS max_price \
    FROM products \
    GROUP BY category \
    ORDER BY product_count DESC, category ASC";

const TOP_SQL: &str = "SELECT \
        product_id, product_name, category, price, stock, \
        price * stock AS inventory_value \
    FROM products \
    ORDER BY inventory_value DESC, product_id ASC";

const LIST_SQL: &str = "SELECT * FROM products ORDER BY product_name ASC, product_id ASC";

fn price_distribution_sql() -> String {
    format!(
        "SELECT price_range, COUNT(*) AS band_count, AVG(price) AS avg_price \
         FROM (SELECT {} AS price_range, price FROM {PRODUCTS_TABLE}) banded \
         GROUP BY price_range \
         ORDER BY avg_price ASC, price_range ASC",
        case_expression(COL_PRICE, &PRICE_BANDS),
    )
}

fn stock_distribution_sql() -> String {
    format!(
        "SELECT stock_level, COUNT(*) AS band_count, AVG(price) AS avg_price \
         FROM (SELECT {} AS stock_level, price FROM {PRODUCTS_TABLE}) banded \
         GROUP BY stock_level \
         ORDER BY band_count DESC, stock_level ASC",
        case_expression(COL_STOCK, &STOCK_BANDS),
    )
}

/// Read-only analytics over one product dataset.
///
/// Built explicitly from a [`DatasetStore`] and handed to whoever needs it;
/// point it at another file to query another dataset.
#[derive(Clone, Debug)]
pub struct ProductAnalytics {
    store: DatasetStore,
}

impl ProductAnalytics {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// A query session with the dataset, as it is on disk now, registered.
    async fn session(&self) -> Result<SessionContext> {
        let ctx = SessionContext::new();
        let rows = self.store.register(&ctx).await?;
        debug!(rows, "analytics session ready");
        Ok(ctx)
    }

    /// Counts, price range and total stock over the whole catalog.
    pub async fn product_stats(&self) -> Result<ProductStats> {
        product_stats_in(&self.session().await?).await
    }

    /// One row per category, most populated first.
    pub async fn category_stats(&self) -> Result<Vec<CategoryStats>> {
        category_stats_in(&self.session().await?).await
    }

    /// Products per price band, cheapest band first. Empty bands are omitted.
    pub async fn price_distribution(&self) -> Result<Vec<PriceRangeCount>> {
        price_distribution_in(&self.session().await?).await
    }

    /// Products per stock band, most populated first. Empty bands are omitted.
    pub async fn stock_distribution(&self) -> Result<Vec<StockLevelCount>> {
        stock_distribution_in(&self.session().await?).await
    }

    /// The `limit` products with the highest `price * stock`. Ties go to the
    /// lower `product_id`.
    pub async fn top_products_by_value(&self, limit: usize) -> Result<Vec<ProductValue>> {
        top_products_in(&self.session().await?, limit).await
    }

    /// Every product, by name.
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let mut out = Vec::new();
        for batch in run(&self.session().await?, LIST_SQL, None).await? {
            let id = column::<Int64Array>(&batch, COL_PRODUCT_ID)?;
            let name = column::<StringArray>(&batch, COL_PRODUCT_NAME)?;
            let category = column::<StringArray>(&batch, COL_CATEGORY)?;
            let price = column::<Float64Array>(&batch, COL_PRICE)?;
            let stock = column::<Int64Array>(&batch, COL_STOCK)?;
            let [description, sku, supplier, last_updated, status] = [
                column::<StringArray>(&batch, "description")?,
                column::<StringArray>(&batch, "sku")?,
                column::<StringArray>(&batch, "supplier")?,
                column::<StringArray>(&batch, "last_updated")?,
                column::<StringArray>(&batch, "status")?,
            ];

            for row in 0..batch.num_rows() {
                out.push(ProductRecord {
                    product_id: id.value(row),
                    product_name: name.value(row).to_string(),
                    category: category.value(row).to_string(),
                    price: price.value(row),
                    stock: stock.value(row),
                    description: text(description, row),
                    sku: text(sku, row),
                    supplier: text(supplier, row),
                    last_updated: text(last_updated, row),
                    status: text(status, row),
                });
            }
        }
        Ok(out)
    }

    /// Runs the five dashboard queries concurrently against a single load
    /// of the dataset, so the parts of one bundle always agree.
    pub async fn dashboard(&self, limit: usize) -> Result<Dashboard> {
        let ctx = self.session().await?;
        let (stats, categories, price_distribution, stock_distribution, top_products) = tokio::try_join!(
            product_stats_in(&ctx),
            category_stats_in(&ctx),
            price_distribution_in(&ctx),
            stock_distribution_in(&ctx),
            top_products_in(&ctx, limit)
        )?;

        Ok(Dashboard {
            is_empty: stats.total_products == 0,
            stats,
            categories,
            price_distribution,
            stock_distribution,
            top_products,
        })
    }
}

async fn run(ctx: &SessionContext, sql: &str, limit: Option<usize>) -> Result<Vec<RecordBatch>> {
    let mut df = ctx.sql(sql).await?;
    if let Some(limit) = limit {
        df = df.limit(0, Some(limit))?;
    }
    Ok(df.collect().await?)
}

async fn product_stats_in(ctx: &SessionContext) -> Result<ProductStats> {
    let batches = run(ctx, STATS_SQL, None).await?;
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok(ProductStats::empty());
    };

    Ok(ProductStats {
        total_products: int(column::<Int64Array>(batch, "total_products")?, 0),
        total_categories: int(column::<Int64Array>(batch, "total_categories")?, 0),
        avg_price: float(column::<Float64Array>(batch, "avg_price")?, 0),
        min_price: float(column::<Float64Array>(batch, "min_price")?, 0),
        max_price: float(column::<Float64Array>(batch, "max_price")?, 0),
        total_stock: int(column::<Int64Array>(batch, "total_stock")?, 0),
    })
}

async fn category_stats_in(ctx: &SessionContext) -> Result<Vec<CategoryStats>> {
    let mut out = Vec::new();
    for batch in run(ctx, CATEGORY_SQL, None).await? {
        let category = column::<StringArray>(&batch, "category")?;
        let count = column::<Int64Array>(&batch, "product_count")?;
        let avg = column::<Float64Array>(&batch, "avg_price")?;
        let stock = column::<Int64Array>(&batch, "total_stock")?;
        let min = column::<Float64Array>(&batch, "min_price")?;
        let max = column::<Float64Array>(&batch, "max_price")?;

        for row in 0..batch.num_rows() {
            out.push(CategoryStats {
                category: category.value(row).to_string(),
                product_count: int(count, row),
                avg_price: float(avg, row),
                total_stock: int(stock, row),
                min_price: float(min, row),
                max_price: float(max, row),
            });
        }
    }
    Ok(out)
}

async fn price_distribution_in(ctx: &SessionContext) -> Result<Vec<PriceRangeCount>> {
    let rows = band_counts(ctx, &price_distribution_sql(), "price_range").await?;
    Ok(rows
        .into_iter()
        .map(|(price_range, count, avg_price)| PriceRangeCount { price_range, count, avg_price })
        .collect())
}

async fn stock_distribution_in(ctx: &SessionContext) -> Result<Vec<StockLevelCount>> {
    let rows = band_counts(ctx, &stock_distribution_sql(), "stock_level").await?;
    Ok(rows
        .into_iter()
        .map(|(stock_level, count, avg_price)| StockLevelCount { stock_level, count, avg_price })
        .collect())
}

async fn band_counts(ctx: &SessionContext, sql: &str, label_column: &str) -> Result<Vec<(String, i64, Option<f64>)>> {
    let mut out = Vec::new();
    for batch in run(ctx, sql, None).await? {
        let label = column::<StringArray>(&batch, label_column)?;
        let count = column::<Int64Array>(&batch, "band_count")?;
        let avg = column::<Float64Array>(&batch, "avg_price")?;
        for row in 0..batch.num_rows() {
            out.push((label.value(row).to_string(), int(count, row), float(avg, row)));
        }
    }
    Ok(out)
}

async fn top_products_in(ctx: &SessionContext, limit: usize) -> Result<Vec<ProductValue>> {
    let mut out = Vec::new();
    for batch in run(ctx, TOP_SQL, Some(limit)).await? {
        let id = column::<Int64Array>(&batch, COL_PRODUCT_ID)?;
        let name = column::<StringArray>(&batch, COL_PRODUCT_NAME)?;
        let category = column::<StringArray>(&batch, COL_CATEGORY)?;
        let price = column::<Float64Array>(&batch, COL_PRICE)?;
        let stock = column::<Int64Array>(&batch, COL_STOCK)?;
        let value = column::<Float64Array>(&batch, "inventory_value")?;

        for row in 0..batch.num_rows() {
            out.push(ProductValue {
                product_id: id.value(row),
                product_name: name.value(row).to_string(),
                category: category.value(row).to_string(),
                price: price.value(row),
                stock: stock.value(row),
                inventory_value: value.value(row),
            });
        }
    }
    Ok(out)
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    let idx = batch.schema().index_of(name).map_err(|e| CatalogError::Query {
        message: format!("missing result column '{name}': {e}"),
    })?;

    let array = batch.column(idx);
    array.as_any().downcast_ref::<A>().ok_or_else(|| CatalogError::Query {
        message: format!("result column '{name}' has unexpected type {}", array.data_type()),
    })
}

fn int(array: &Int64Array, row: usize) -> i64 {
    if array.is_null(row) { 0 } else { array.value(row) }
}

fn float(array: &Float64Array, row: usize) -> Option<f64> {
    (!array.is_null(row)).then(|| array.value(row))
}

fn text(array: &StringArray, row: usize) -> Option<String> {
    (!array.is_null(row)).then(|| array.value(row).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_products;

    #[test]
    fn test_distribution_sql_uses_band_labels() {
        let sql = price_distribution_sql();
        assert!(sql.contains("'Under $50'"));
        assert!(sql.contains("ELSE 'Over $500'"));

        let sql = stock_distribution_sql();
        assert!(sql.contains("WHEN stock < 1 THEN 'Out of Stock'"));
        assert!(sql.contains("ELSE 'High Stock'"));
    }

    #[tokio::test]
    async fn test_one_session_serves_every_dashboard_query() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::from_dir(dir.path(), "products");
        write_products(
            store.path(),
            &[
                ProductRecord::new(1, "A", "Tools", 10.0, 5),
                ProductRecord::new(2, "B", "Audio", 600.0, 50),
            ],
        )
        .unwrap();
        let ctx = ProductAnalytics::new(store.clone()).session().await.unwrap();

        // The session keeps what it loaded; swapping the file can't split a bundle.
        std::fs::remove_file(store.path()).unwrap();

        assert_eq!(product_stats_in(&ctx).await.unwrap().total_products, 2);
        assert_eq!(category_stats_in(&ctx).await.unwrap().len(), 2);
        assert_eq!(price_distribution_in(&ctx).await.unwrap().len(), 2);
        assert_eq!(stock_distribution_in(&ctx).await.unwrap().len(), 2);
        assert_eq!(top_products_in(&ctx, 1).await.unwrap()[0].product_id, 2);
    }
}
