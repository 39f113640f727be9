//! Write side of the product dataset, used only by the offline generator.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::schema::{product_schema, ProductRecord, METADATA_COLUMNS};

fn check_records(rows: &[ProductRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for r in rows {
        if !seen.insert(r.product_id) {
            return Err(CatalogError::InvalidRecord {
                message: format!("duplicate product_id {}", r.product_id),
            });
        }
        if !r.price.is_finite() || r.price < 0.0 {
            return Err(CatalogError::InvalidRecord {
                message: format!("product {} has invalid price {}", r.product_id, r.price),
            });
        }
        if r.stock < 0 {
            return Err(CatalogError::InvalidRecord {
                message: format!("product {} has negative stock {}", r.product_id, r.stock),
            });
        }
    }
    Ok(())
}

fn to_batch(rows: &[ProductRecord]) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(rows.iter().map(|r| r.product_id).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.product_name.as_str()).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.category.as_str()).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.stock).collect::<Vec<_>>())),
    ];
    for name in METADATA_COLUMNS {
        columns.push(Arc::new(StringArray::from(ProductRecord::metadata_values(rows, name))));
    }

    RecordBatch::try_new(product_schema(), columns).map_err(|e| CatalogError::Write {
        message: format!("record batch build failed: {e}"),
    })
}

fn writer_properties() -> WriterProperties {
    let created_by = KeyValue {
        key: "created_by".to_string(),
        value: Some("seed-catalog".to_string()),
    };
    WriterProperties::builder()
        .set_key_value_metadata(Some(vec![created_by]))
        .build()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).map_err(|e| CatalogError::Write {
        message: format!("create {} failed: {e}", path.display()),
    })?;
    let mut writer = ArrowWriter::try_new(file, product_schema(), Some(writer_properties()))
        .map_err(|e| CatalogError::Write {
            message: format!("parquet writer init failed: {e}"),
        })?;
    writer.write(batch).map_err(|e| CatalogError::Write {
        message: format!("parquet write failed: {e}"),
    })?;
    writer.close().map_err(|e| CatalogError::Write {
        message: format!("parquet close failed: {e}"),
    })?;
    Ok(())
}

/// Replaces the dataset at `path` with `rows`.
///
/// The file is written next to the target and renamed over it, so readers
/// see either the old dataset or the new one, never a partial file.
pub fn write_products(path: &Path, rows: &[ProductRecord]) -> Result<()> {
    check_records(rows)?;
    let batch = to_batch(rows)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CatalogError::Write {
            message: format!("create {} failed: {e}", parent.display()),
        })?;
    }

    let tmp = tmp_path(path);
    if let Err(e) = write_file(&tmp, &batch) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| CatalogError::Write {
        message: format!("rename into {} failed: {e}", path.display()),
    })?;

    info!(path = %path.display(), rows = rows.len(), "dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DatasetStore;

    #[test]
    fn test_write_replaces_file_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("products.parquet");

        write_products(&path, &[ProductRecord::new(1, "Old", "A", 1.0, 1)]).unwrap();
        write_products(
            &path,
            &[
                ProductRecord::new(1, "Laptop Pro", "Electronics", 999.99, 15),
                ProductRecord::new(2, "Mouse Pad", "Accessories", 9.99, 200),
            ],
        )
        .unwrap();

        assert!(!tmp_path(&path).exists());
        let batches = DatasetStore::new(&path).load().unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        let rows = vec![
            ProductRecord::new(7, "A", "X", 1.0, 1),
            ProductRecord::new(7, "B", "X", 2.0, 1),
        ];

        let err = write_products(&path, &rows).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_negative_price_and_stock() {
        assert!(check_records(&[ProductRecord::new(1, "A", "X", -0.01, 1)]).is_err());
        assert!(check_records(&[ProductRecord::new(1, "A", "X", f64::NAN, 1)]).is_err());
        assert!(check_records(&[ProductRecord::new(1, "A", "X", 0.0, -1)]).is_err());
        assert!(check_records(&[ProductRecord::new(1, "A", "X", 0.0, 0)]).is_ok());
    }

    #[test]
    fn test_tmp_path_sits_next_to_target() {
        let tmp = tmp_path(Path::new("data/products.parquet"));
        assert_eq!(tmp, PathBuf::from("data/products.parquet.tmp"));
    }
}
