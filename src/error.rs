//! Error kinds for the indexer and query engine, grouped by the severity
//! tiers the failure model distinguishes: recoverable grid quirks are not
//! represented here at all (they are logged via `tracing::warn!` and
//! handled locally — a `grid_path` segment falling back to endpoint cells,
//! an empty polyfill falling back to the centroid cell), everything that
//! reaches a caller is one of the variants below.

/// Errors raised while encoding a single geometry into a cell set, or while
/// running the adaptive resolution planner on top of it.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error(transparent)]
    InvalidCellIndex(#[from] h3o::error::InvalidCellIndex),

    #[error(transparent)]
    InvalidResolution(#[from] h3o::error::InvalidResolution),

    #[error(transparent)]
    InvalidLatLng(#[from] h3o::error::InvalidLatLng),

    #[error(transparent)]
    InvalidGeometry(#[from] h3o::error::InvalidGeometry),

    #[error(transparent)]
    CompactionError(#[from] h3o::error::CompactionError),

    #[error(transparent)]
    LocalIj(#[from] h3o::error::LocalIjError),

    #[error(transparent)]
    Arrow2(#[from] arrow2::error::Error),

    #[error("geometry variant {0} is not supported by the encoder")]
    UnsupportedVariant(&'static str),

    #[error("empty geometry has no cells")]
    EmptyGeometry,

    #[error("cell_to_parent precondition violated: requested resolution {requested} is finer than the cell's own resolution {actual}")]
    NotAnAncestorResolution { requested: u8, actual: u8 },

    #[error("cell_to_children precondition violated: requested resolution {requested} is coarser than the cell's own resolution {actual}")]
    NotADescendantResolution { requested: u8, actual: u8 },
}

/// Errors raised while reprojecting a geometry to WGS84.
#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    #[error("CRS identifier {0:?} is not one of: an EPSG code, \"EPSG:<n>\", or \"already WGS84\"")]
    UnrecognizedCrs(String),

    #[error("failed to build a transformer from {from} to {to}: {source}")]
    TransformerSetup {
        from: String,
        to: String,
        #[source]
        source: proj::ProjCreateError,
    },

    #[error("failed to reproject vertex ({x}, {y}): {source}")]
    Transform {
        x: f64,
        y: f64,
        #[source]
        source: proj::ProjError,
    },
}

/// Errors accumulated while validating an [`crate::config::IngestConfig`].
/// Every failing field is reported together rather than one at a time.
#[derive(Debug, thiserror::Error)]
#[error("invalid ingest configuration: {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);

/// Per-feature ingest failure. Counted and logged; never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("feature {feature_id}: {source}")]
    Geometry {
        feature_id: u32,
        #[source]
        source: GeometryError,
    },

    #[error("feature {feature_id}: {source}")]
    Crs {
        feature_id: u32,
        #[source]
        source: CrsError,
    },
}

/// Fatal errors from the storage/query engine boundary: extension load
/// failures, corrupt databases, unparseable selections. Partial state must
/// never be observable after one of these propagates.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Duckdb(#[from] duckdb::Error),

    #[error(transparent)]
    Pool(#[from] r2d2::Error),

    #[error("selection filter is not valid: {0}")]
    InvalidFilter(String),

    #[error(
        "selection spans multiple resolutions ({0:?}); call `union` first to obtain a single refined resolution"
    )]
    AmbiguousResolution(Vec<u8>),

    #[error(transparent)]
    Arrow2(#[from] arrow2::error::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
