//! Geometry-to-cells encoder (C3): fixed-resolution encoding of a single
//! geometry into a cell set, grounded directly in `h3o::geom::Tiler` for
//! polygons and `CellIndex::grid_path_cells` for line segments.

pub mod containment;

pub use containment::ContainmentMode;

use geo_types::{Geometry, LineString, Point, Polygon};
use h3o::{CellIndex, Resolution};

use crate::error::GeometryError as Error;
use crate::kernel;

#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub resolution: Resolution,
    pub containment_mode: ContainmentMode,
}

impl EncodeOptions {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            containment_mode: ContainmentMode::default(),
        }
    }

    pub fn with_containment_mode(mut self, mode: ContainmentMode) -> Self {
        self.containment_mode = mode;
        self
    }
}

fn variant_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn point_to_cell(point: &Point<f64>, resolution: Resolution) -> Result<CellIndex, Error> {
    kernel::latlng_to_cell(point.y(), point.x(), resolution)
}

/// LineString rule (§4.3): union the `grid_path` between each consecutive
/// pair of vertex cells; on a per-segment `grid_path` failure, fall back to
/// just the two endpoint cells for that segment (documented lossy case).
fn linestring_to_cells(line: &LineString<f64>, resolution: Resolution) -> Result<Vec<CellIndex>, Error> {
    let mut cells = Vec::new();
    let vertex_cells: Vec<CellIndex> = line
        .points()
        .map(|p| point_to_cell(&p, resolution))
        .collect::<Result<_, _>>()?;

    for pair in vertex_cells.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        match kernel::grid_path(start, end) {
            Ok(path) => cells.extend(path),
            Err(_) => {
                tracing::warn!(
                    ?start,
                    ?end,
                    "grid_path failed for line segment, falling back to endpoint cells"
                );
                cells.push(start);
                cells.push(end);
            }
        }
    }
    if vertex_cells.len() == 1 {
        cells.push(vertex_cells[0]);
    }
    Ok(cells)
}

/// Polygon rule (§4.3): polyfill with the requested containment mode; an
/// empty result (polygon too small relative to the cell size) falls back to
/// the single cell containing the centroid.
fn polygon_to_cells(polygon: &Polygon<f64>, options: &EncodeOptions) -> Result<Vec<CellIndex>, Error> {
    let cells = kernel::polyfill(polygon, options.resolution, options.containment_mode)?;

    if cells.is_empty() {
        use geo::Centroid;
        let centroid = polygon.centroid().ok_or(Error::EmptyGeometry)?;
        tracing::warn!(resolution = ?options.resolution, "polyfill returned no cells, using centroid fallback");
        return Ok(vec![point_to_cell(&centroid, options.resolution)?]);
    }
    Ok(cells)
}

/// Encode a single WGS84 geometry at a fixed resolution into a
/// duplicate-free cell set (§4.3). Multi-part variants union their parts'
/// results.
pub fn geometry_to_cells(geom: &Geometry<f64>, options: &EncodeOptions) -> Result<Vec<CellIndex>, Error> {
    let mut cells = match geom {
        Geometry::Point(p) => vec![point_to_cell(p, options.resolution)?],
        Geometry::LineString(ls) => linestring_to_cells(ls, options.resolution)?,
        Geometry::Polygon(poly) => polygon_to_cells(poly, options)?,
        Geometry::MultiPoint(mp) => {
            let mut out = Vec::with_capacity(mp.0.len());
            for p in &mp.0 {
                out.push(point_to_cell(p, options.resolution)?);
            }
            out
        }
        Geometry::MultiLineString(mls) => {
            let mut out = Vec::new();
            for ls in &mls.0 {
                out.extend(linestring_to_cells(ls, options.resolution)?);
            }
            out
        }
        Geometry::MultiPolygon(mpoly) => {
            let mut out = Vec::new();
            for poly in &mpoly.0 {
                out.extend(polygon_to_cells(poly, options)?);
            }
            out
        }
        other => return Err(Error::UnsupportedVariant(variant_name(other))),
    };
    cells.sort_unstable();
    cells.dedup();
    Ok(cells)
}
