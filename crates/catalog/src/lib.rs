//! Product catalog analytics.
//!
//! Reads the product dataset (a single Parquet file) and answers the
//! dashboard's aggregation queries through an embedded DataFusion session.

pub mod analytics;
pub mod bands;
pub mod error;
pub mod schema;
pub mod store;
pub mod writer;

pub use analytics::*;
pub use error::{CatalogError, Result};
pub use schema::*;
pub use store::*;
pub use writer::*;
