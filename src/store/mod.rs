//! Columnar feature store (C5): owns the on-disk DuckDB database that
//! backs the query engine, and the one-shot ingest pipeline that populates
//! it. Grounded in `original_source/scripts/import_to_duckdb.py`, which
//! opens a single writer connection for the whole ingest run and leaves
//! concurrent readers to open their own.

pub mod ingest;
pub mod schema;

use duckdb::{Connection, DuckdbConnectionManager};
use r2d2::Pool;

use crate::config::ValidatedIngestConfig;
use crate::error::EngineError;

pub use ingest::{IngestSummary, RawFeature};

/// A freshly (re-)built feature database, ready to be opened for queries.
/// Ingest and query are deliberately different types: ingest needs a single
/// writable [`Connection`] (§7 "single writer"), the query engine wants a
/// pool of read-only connections shared across threads (§9 "multiple reader
/// engines may open it concurrently").
pub struct FeatureStore;

impl FeatureStore {
    /// Build a new database at `config.output_path`, replacing anything
    /// already there, and bulk-load `features` into it. Returns a summary of
    /// how many features made it in versus were dropped (§7 tier 2).
    pub fn build(
        config: &ValidatedIngestConfig,
        features: impl IntoIterator<Item = RawFeature>,
    ) -> Result<IngestSummary, EngineError> {
        if std::path::Path::new(&config.output_path).exists() {
            std::fs::remove_file(&config.output_path).map_err(|e| {
                EngineError::InvalidFilter(format!(
                    "could not remove existing database at {}: {e}",
                    config.output_path
                ))
            })?;
        }
        let mut conn = Connection::open(&config.output_path)?;
        ingest::ingest(&mut conn, config, features)
    }

    /// Open a read-only connection pool against an already-built database,
    /// for handing to the query engine.
    pub fn open_pool(path: &str) -> Result<Pool<DuckdbConnectionManager>, EngineError> {
        let manager = DuckdbConnectionManager::file(path)?;
        let pool = Pool::builder().build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(schema::LOAD_EXTENSIONS_SQL)?;
        }
        Ok(pool)
    }
}
