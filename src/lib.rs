//! Adaptive H3 indexing and a columnar DGGS query engine over heterogeneous
//! vector geodata.
//!
//! Feature geometries (WGS84 or any CRS `proj` understands) are indexed into
//! H3 cells at either a fixed resolution or an adaptively chosen one, stored
//! alongside their attributes in a DuckDB-backed columnar table, and queried
//! through a small algebra of resolution-normalized boolean predicates and
//! set operations. Roughly, pipeline shape:
//!
//! ```text
//! geometry + CRS --[crs]--> WGS84 geometry --[planner]--> resolution
//!                                           --[encode]--> cells
//!                     (cells, attributes) --[store::ingest]--> feature table
//!                                 filter/relation --[engine]--> cells/area/bool
//! ```
//!
//! [`kernel`] is the one place that calls into `h3o` directly; every other
//! module reaches a single cell through it. [`predicates`] is the
//! resolution-normalized set algebra both [`engine`] (over stored features)
//! and [`spatial_engine`] (over in-memory features, for cross-validation
//! against planar geometry) are built from.

pub mod algorithm;
pub mod array;
pub mod config;
pub mod crs;
pub mod encode;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod planner;
pub mod predicates;
pub mod spatial_engine;
pub mod store;

pub use config::{IngestConfig, ValidatedIngestConfig};
pub use crs::{Crs, CrsTransformer};
pub use encode::{geometry_to_cells, ContainmentMode, EncodeOptions};
pub use engine::{is_plausibly_safe_filter, CellRelation, QueryEngine, Selection};
pub use error::{CrsError, EngineError, GeometryError, IngestError};
pub use kernel::AreaUnit;
pub use planner::{plan_and_encode, plan_resolution, PlannerOptions, PlannerOutcome};
pub use store::{FeatureStore, IngestSummary, RawFeature};
