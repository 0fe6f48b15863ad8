//! H3 kernel adapter (C1): a thin, total-function façade over `h3o`,
//! exposing exactly the operations §4.1 names and nothing else. Every other
//! component that needs to touch a single cell goes through here rather than
//! calling `h3o` directly, so the kernel surface stays the one place that
//! knows about `h3o`'s particular error types.

use geo_types::Polygon;
use h3o::geom::{ContainmentMode as H3oContainmentMode, TilerBuilder, ToGeo};
use h3o::{CellIndex, LatLng, Resolution};

use crate::encode::ContainmentMode;
use crate::error::GeometryError as Error;

/// The unit `cell_area` reports in (§4.1, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaUnit {
    SquareMeters,
    SquareKilometers,
}

/// `latlng_to_cell`: the single entry point every point-like geometry is
/// encoded through (§4.3's Point rule).
pub fn latlng_to_cell(lat: f64, lon: f64, resolution: Resolution) -> Result<CellIndex, Error> {
    Ok(LatLng::new(lat, lon)?.to_cell(resolution))
}

/// `cell_to_parent`, precondition `resolution <= resolution_of(cell)`.
pub fn cell_to_parent(cell: CellIndex, resolution: Resolution) -> Result<CellIndex, Error> {
    cell.parent(resolution)
        .ok_or(Error::NotAnAncestorResolution {
            requested: u8::from(resolution),
            actual: u8::from(cell.resolution()),
        })
}

/// `cell_to_children`, precondition `resolution >= resolution_of(cell)`.
/// Returns `7^(resolution - resolution_of(cell))` cells (small irregularities
/// at base pentagons aside, per the glossary).
pub fn cell_to_children(cell: CellIndex, resolution: Resolution) -> Result<Vec<CellIndex>, Error> {
    if resolution < cell.resolution() {
        return Err(Error::NotADescendantResolution {
            requested: u8::from(resolution),
            actual: u8::from(cell.resolution()),
        });
    }
    Ok(cell.children(resolution).collect())
}

/// `grid_path`: a straight-line sequence of cells from `a` to `b`. May fail
/// when the cells are too far apart or in unrelated grid neighborhoods; the
/// caller (the line-string encoder, §4.3) decides how to recover.
pub fn grid_path(a: CellIndex, b: CellIndex) -> Result<Vec<CellIndex>, Error> {
    let path = a.grid_path_cells(b)?;
    path.collect::<Result<Vec<_>, _>>().map_err(Error::from)
}

/// `grid_disk`: the k-ring around `cell`, including `cell` itself at `k=0`.
pub fn grid_disk(cell: CellIndex, k: u32) -> Vec<CellIndex> {
    cell.grid_disk(k)
}

/// `cell_area` in the requested unit.
pub fn cell_area(cell: CellIndex, unit: AreaUnit) -> f64 {
    match unit {
        AreaUnit::SquareMeters => cell.area_m2(),
        AreaUnit::SquareKilometers => cell.area_km2(),
    }
}

/// `cell_boundary`: the cell's footprint as a WGS84 polygon.
pub fn cell_boundary(cell: CellIndex) -> Polygon<f64> {
    cell.to_geom(true)
        .expect("boundary of a valid CellIndex is always a well-formed polygon")
}

/// `resolution_of`.
pub fn resolution_of(cell: CellIndex) -> Resolution {
    cell.resolution()
}

fn to_h3o_mode(mode: ContainmentMode) -> H3oContainmentMode {
    mode.to_h3o()
}

/// `polyfill`: cover `polygon` (exterior plus any holes) at `resolution`
/// under the given containment mode. May return an empty set for polygons
/// too small relative to the cell size (§4.3 centroid fallback is the
/// caller's responsibility, not the kernel's).
pub fn polyfill(
    polygon: &Polygon<f64>,
    resolution: Resolution,
    mode: ContainmentMode,
) -> Result<Vec<CellIndex>, Error> {
    let mut tiler = TilerBuilder::new(resolution)
        .containment_mode(to_h3o_mode(mode))
        .build();
    tiler.add(polygon.clone())?;
    Ok(tiler.into_coverage().collect())
}
