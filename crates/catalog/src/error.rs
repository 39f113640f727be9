use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The dataset file is missing, unreadable or not valid Parquet.
    #[error("dataset unavailable at {path}: {message}")]
    DatasetUnavailable { path: String, message: String },

    /// A required column is absent or has a type the queries can't use.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("invalid record: {message}")]
    InvalidRecord { message: String },

    #[error("write failed: {message}")]
    Write { message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<datafusion::error::DataFusionError> for CatalogError {
    fn from(e: datafusion::error::DataFusionError) -> Self {
        CatalogError::Query { message: e.to_string() }
    }
}

impl From<arrow::error::ArrowError> for CatalogError {
    fn from(e: arrow::error::ArrowError) -> Self {
        CatalogError::Query { message: e.to_string() }
    }
}
