//! The feature-table persisted layout (§6): `features(feature_id, geometry,
//! h3_cells, h3_resolution, h3_cell_count, ...attributes)`, backed by
//! DuckDB's community `h3` extension for the SQL-level cell functions the
//! query engine needs (`h3_cell_to_parent`, `h3_cell_to_children`,
//! `h3_cell_area`, `h3_string_to_h3`, ...).

/// Loads the extensions the feature store and the query engine depend on.
/// Idempotent: safe to call on every connection open.
pub const LOAD_EXTENSIONS_SQL: &str = r#"
INSTALL h3 FROM community;
LOAD h3;
"#;

/// `h3_cells` is `UBIGINT[]` (an array of 64-bit unsigned integers, the
/// columnar engine's analog to `crate::array::CellIndexArray`), one row per
/// feature, attribute columns appended by the caller via `attribute_ddl`.
pub fn create_table_sql(attribute_ddl: &[(String, String)]) -> String {
    let mut ddl = String::from(
        "CREATE TABLE features (\n\
         \u{20}\u{20}\u{20}\u{20}feature_id UINTEGER PRIMARY KEY,\n\
         \u{20}\u{20}\u{20}\u{20}geometry BLOB,\n\
         \u{20}\u{20}\u{20}\u{20}h3_cells UBIGINT[],\n\
         \u{20}\u{20}\u{20}\u{20}h3_resolution UTINYINT,\n\
         \u{20}\u{20}\u{20}\u{20}h3_cell_count UINTEGER",
    );
    for (name, sql_type) in attribute_ddl {
        ddl.push_str(&format!(",\n    {name} {sql_type}"));
    }
    ddl.push_str("\n);");
    ddl
}

/// A transient landing table for one ingest batch: the same shape as
/// `features` except `h3_cells` is staged as a semicolon-joined `VARCHAR`
/// (`h3_cells_raw`) rather than `UBIGINT[]`. The ingest pipeline bulk-loads
/// rows here through the appender, then converts the whole column at once
/// with a single vectorized `INSERT ... SELECT` using `h3_string_to_h3` —
/// `convert_and_import.py`'s `prepare_dataframe_for_duckdb` does the same
/// two-step staging rather than binding array values one row at a time.
pub fn create_staging_table_sql(attribute_ddl: &[(String, String)]) -> String {
    let mut ddl = String::from(
        "CREATE TEMP TABLE features_staging (\n\
         \u{20}\u{20}\u{20}\u{20}feature_id UINTEGER,\n\
         \u{20}\u{20}\u{20}\u{20}geometry BLOB,\n\
         \u{20}\u{20}\u{20}\u{20}h3_cells_raw VARCHAR,\n\
         \u{20}\u{20}\u{20}\u{20}h3_resolution UTINYINT,\n\
         \u{20}\u{20}\u{20}\u{20}h3_cell_count UINTEGER",
    );
    for (name, sql_type) in attribute_ddl {
        ddl.push_str(&format!(",\n    {name} {sql_type}"));
    }
    ddl.push_str("\n);");
    ddl
}
