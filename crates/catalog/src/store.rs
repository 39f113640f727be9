//! Read side of the product dataset.
//!
//! The dataset is one Parquet file, replaced wholesale by the generator and
//! never mutated while the service runs. Every load reads it from disk again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{new_null_array, Array as _, ArrayRef};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::schema::*;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DATASET_NAME: &str = "products";

#[derive(Clone, Debug)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<name>.parquet`
    pub fn from_dir(dir: impl AsRef<Path>, name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{name}.parquet")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, message: impl std::fmt::Display) -> CatalogError {
        CatalogError::DatasetUnavailable {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Reads and decodes the whole file, returning batches in the canonical
    /// [`product_schema`]. Blocking.
    pub fn load(&self) -> Result<Vec<RecordBatch>> {
        let raw = std::fs::read(&self.path).map_err(|e| self.unavailable(e))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(raw))
            .map_err(|e| self.unavailable(format!("not a readable parquet file: {e}")))?;

        let plan = ColumnPlan::resolve(builder.schema())?;
        let reader = builder
            .build()
            .map_err(|e| self.unavailable(format!("parquet reader build failed: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| self.unavailable(format!("parquet batch decode failed: {e}")))?;
            batches.push(plan.normalize(&batch)?);
        }
        Ok(batches)
    }

    /// [`load`](Self::load) on the blocking pool.
    pub async fn load_blocking(&self) -> Result<Vec<RecordBatch>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| self.unavailable(format!("load task failed: {e}")))?
    }

    /// Loads the dataset and registers it in `ctx` as [`PRODUCTS_TABLE`].
    /// Returns the number of rows registered.
    pub async fn register(&self, ctx: &SessionContext) -> Result<usize> {
        let batches = self.load_blocking().await?;
        let rows = batches.iter().map(|b| b.num_rows()).sum();

        let table = MemTable::try_new(product_schema(), vec![batches])?;
        ctx.register_table(PRODUCTS_TABLE, Arc::new(table))?;

        debug!(path = %self.path.display(), rows, "dataset registered");
        Ok(rows)
    }
}

/// Where each canonical column comes from in the file being read.
struct ColumnPlan {
    schema: SchemaRef,
    sources: Vec<Option<usize>>,
}

impl ColumnPlan {
    fn resolve(file_schema: &SchemaRef) -> Result<Self> {
        let schema = product_schema();
        let mut sources = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let name = field.name().as_str();
            let found = file_schema.index_of(name).ok();

            if METADATA_COLUMNS.contains(&name) {
                // Informational only: anything that can't be shown as text is dropped.
                let usable = found.filter(|&idx| {
                    can_cast_types(file_schema.field(idx).data_type(), &DataType::Utf8)
                });
                if found.is_some() && usable.is_none() {
                    debug!(column = name, "metadata column not castable to text, ignoring");
                }
                sources.push(usable);
                continue;
            }

            let idx = found.ok_or_else(|| CatalogError::SchemaMismatch {
                message: format!("missing required column '{name}'"),
            })?;
            let actual = file_schema.field(idx).data_type();
            if !accepts(name, actual) {
                return Err(CatalogError::SchemaMismatch {
                    message: format!("column '{name}' has unsupported type {actual}"),
                });
            }
            sources.push(Some(idx));
        }

        Ok(Self { schema, sources })
    }

    fn normalize(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.sources.len());

        for (field, source) in self.schema.fields().iter().zip(&self.sources) {
            let column = match source {
                Some(idx) => cast(batch.column(*idx), field.data_type()).map_err(|e| {
                    CatalogError::SchemaMismatch {
                        message: format!("column '{}' cannot be read as {}: {e}", field.name(), field.data_type()),
                    }
                })?,
                None => new_null_array(field.data_type(), batch.num_rows()),
            };

            // Also catches values that overflowed during the cast.
            if !field.is_nullable() && column.null_count() > 0 {
                return Err(CatalogError::SchemaMismatch {
                    message: format!("required column '{}' contains nulls", field.name()),
                });
            }
            columns.push(column);
        }

        RecordBatch::try_new(self.schema.clone(), columns).map_err(|e| CatalogError::SchemaMismatch {
            message: format!("normalized batch rejected: {e}"),
        })
    }
}

fn accepts(column: &str, actual: &DataType) -> bool {
    match column {
        COL_PRODUCT_ID | COL_STOCK => actual.is_integer(),
        COL_PRICE => actual.is_numeric(),
        COL_PRODUCT_NAME | COL_CATEGORY => is_text(actual),
        _ => false,
    }
}

/// Plain strings, or dictionary-encoded strings (pandas `category` columns).
fn is_text(actual: &DataType) -> bool {
    match actual {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, values) => is_text(values),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_columns_accept_dictionary_strings() {
        let dict = |values| DataType::Dictionary(Box::new(DataType::Int32), Box::new(values));

        assert!(accepts(COL_CATEGORY, &DataType::Utf8));
        assert!(accepts(COL_CATEGORY, &dict(DataType::Utf8)));
        assert!(accepts(COL_PRODUCT_NAME, &dict(DataType::LargeUtf8)));
        assert!(!accepts(COL_CATEGORY, &dict(DataType::Int64)));
        assert!(!accepts(COL_PRODUCT_NAME, &DataType::Int64));
    }
}
