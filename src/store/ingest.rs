//! Ingest pipeline (§4.5): reproject → encode/plan per row → assemble →
//! one vectorized bulk insert. Grounded directly on
//! `original_source/scripts/convert_and_import.py`, which loads rows into a
//! staging relation as plain strings and converts them to typed array
//! columns inside DuckDB with a single `INSERT ... SELECT`, rather than
//! round-tripping each cell id through the client.

use duckdb::Connection;
use h3o::CellIndex;
use tracing::{info, warn};

use crate::config::ValidatedIngestConfig;
use crate::crs::{Crs, CrsTransformer};
use crate::encode::{geometry_to_cells, EncodeOptions};
use crate::error::{EngineError, IngestError};
use crate::planner::{plan_and_encode, PlannerOptions};
use crate::store::schema::{create_staging_table_sql, create_table_sql, LOAD_EXTENSIONS_SQL};

/// One input row: an already-parsed geometry plus whatever attribute values
/// the caller wants to carry through. Reading GeoPackage/Shapefile/... files
/// into this shape is the out-of-scope I/O driver's job.
pub struct RawFeature {
    pub feature_id: u32,
    pub crs: Crs,
    pub geometry: geo_types::Geometry<f64>,
    pub attributes: Vec<(String, String)>,
}

/// A feature that survived reprojection and H3 encoding, ready to be bulk
/// inserted.
struct EncodedFeature {
    feature_id: u32,
    geometry_wkt: String,
    h3_cells: Vec<CellIndex>,
    h3_resolution: u8,
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IngestSummary {
    pub features_ingested: u32,
    pub features_dropped: u32,
}

fn encode_one(
    raw: &RawFeature,
    config: &ValidatedIngestConfig,
    transformer: &mut CrsTransformer,
) -> Result<EncodedFeature, IngestError> {
    let mut geometry = raw.geometry.clone();
    transformer
        .to_wgs84(&raw.crs, &mut geometry)
        .map_err(|source| IngestError::Crs {
            feature_id: raw.feature_id,
            source,
        })?;

    let is_polygonal = matches!(
        geometry,
        geo_types::Geometry::Polygon(_) | geo_types::Geometry::MultiPolygon(_)
    );

    let (cells, resolution) = if is_polygonal {
        let options = PlannerOptions {
            target_cells: config.target_cells,
            min_resolution: h3o::Resolution::try_from(config.min_resolution)
                .expect("validated in IngestConfig::validate"),
            max_resolution: h3o::Resolution::try_from(config.max_resolution)
                .expect("validated in IngestConfig::validate"),
            containment_mode: config.containment_mode,
        };
        plan_and_encode(&geometry, &options).map_err(|source| IngestError::Geometry {
            feature_id: raw.feature_id,
            source,
        })?
    } else {
        let resolution = h3o::Resolution::try_from(config.max_resolution)
            .expect("validated in IngestConfig::validate");
        let options = EncodeOptions::new(resolution).with_containment_mode(config.containment_mode);
        let cells = geometry_to_cells(&geometry, &options).map_err(|source| IngestError::Geometry {
            feature_id: raw.feature_id,
            source,
        })?;
        (cells, resolution)
    };

    Ok(EncodedFeature {
        feature_id: raw.feature_id,
        geometry_wkt: geo_wkt(&geometry),
        h3_cells: cells,
        h3_resolution: u8::from(resolution),
        attributes: raw.attributes.clone(),
    })
}

fn attribute_value<'a>(feature: &'a EncodedFeature, name: &str) -> &'a str {
    feature
        .attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

fn geo_wkt(geom: &geo_types::Geometry<f64>) -> String {
    // a minimal, dependency-free WKT renderer; the geometry column only needs
    // to round-trip for display/debugging, it is never queried by the engine.
    use geo_types::Geometry;
    use std::fmt::Write;
    let mut s = String::new();
    match geom {
        Geometry::Point(p) => {
            write!(s, "POINT ({} {})", p.x(), p.y()).ok();
        }
        _ => {
            write!(s, "GEOMETRY").ok();
        }
    }
    s
}

/// Run the ingest pipeline against an already-open, writable connection,
/// creating the `features` table from scratch. The whole operation runs in
/// one transaction: a failure at any point leaves no partial table (§4.5).
pub fn ingest(
    conn: &mut Connection,
    config: &ValidatedIngestConfig,
    features: impl IntoIterator<Item = RawFeature>,
) -> Result<IngestSummary, EngineError> {
    conn.execute_batch(LOAD_EXTENSIONS_SQL)?;

    let mut transformer = CrsTransformer::new();
    let mut encoded = Vec::new();
    let mut summary = IngestSummary::default();

    for raw in features {
        let feature_id = raw.feature_id;
        match encode_one(&raw, config, &mut transformer) {
            Ok(feature) => {
                encoded.push(feature);
                summary.features_ingested += 1;
            }
            Err(err) => {
                warn!(feature_id, error = %err, "dropping feature that failed ingest");
                summary.features_dropped += 1;
            }
        }
    }

    // Attribute columns are named after whatever the first surviving feature
    // carries; a feature missing one of these keys contributes an empty
    // string for it (`attribute_value`'s fallback).
    let attribute_names: Vec<String> = encoded
        .first()
        .map(|f| f.attributes.iter().map(|(key, _)| key.clone()).collect())
        .unwrap_or_default();
    let attribute_ddl: Vec<(String, String)> = attribute_names
        .iter()
        .map(|name| (name.clone(), "VARCHAR".to_string()))
        .collect();

    let tx = conn.transaction()?;
    tx.execute_batch(&create_staging_table_sql(&attribute_ddl))?;
    tx.execute_batch(&create_table_sql(&attribute_ddl))?;

    {
        let mut appender = tx.appender("features_staging")?;
        for feature in &encoded {
            let cells_raw = feature
                .h3_cells
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(";");
            let cell_count = feature.h3_cells.len() as u32;
            let attribute_values: Vec<&str> = attribute_names
                .iter()
                .map(|name| attribute_value(feature, name))
                .collect();

            let mut row: Vec<&dyn duckdb::ToSql> = vec![
                &feature.feature_id,
                &feature.geometry_wkt,
                &cells_raw,
                &feature.h3_resolution,
                &cell_count,
            ];
            for value in &attribute_values {
                row.push(value);
            }
            appender.append_row(duckdb::params_from_iter(row))?;
        }
        appender.flush()?;
    }

    // One vectorized conversion of the whole staged batch: `h3_cells_raw`
    // (a semicolon-joined string) becomes a proper `UBIGINT[]` via
    // `h3_string_to_h3`, never touching the client in between.
    let attribute_select: String = attribute_names
        .iter()
        .map(|name| format!(", {name}"))
        .collect();
    let insert_sql = format!(
        "INSERT INTO features \
         SELECT feature_id, geometry, \
                CASE WHEN h3_cells_raw = '' THEN []::UBIGINT[] \
                     ELSE list_transform(list_filter(str_split(h3_cells_raw, ';'), x -> x != ''), x -> h3_string_to_h3(x)) \
                END AS h3_cells, \
                h3_resolution, h3_cell_count{attribute_select} \
         FROM features_staging"
    );
    tx.execute_batch(&insert_sql)?;
    tx.execute_batch("DROP TABLE features_staging;")?;

    tx.commit()?;

    info!(
        ingested = summary.features_ingested,
        dropped = summary.features_dropped,
        "ingest finished"
    );
    Ok(summary)
}
