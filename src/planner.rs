//! Adaptive resolution planner (C4): picks a single resolution for a
//! polygon given a target cell count, using the frozen area→resolution
//! lookup table and a one-step validation/correction loop (§4.4).

use geo::GeodesicArea;
use geo_types::{Geometry, MultiPolygon, Polygon};
use h3o::Resolution;

use crate::encode::{geometry_to_cells, EncodeOptions};
use crate::error::GeometryError as Error;

/// Average cell area in m² per resolution, 0..=15. This is an
/// interface-level constant (§6): copied literally from the H3 published
/// reference table (as embedded in `h3o::Resolution::area_m2`), never
/// re-derived.
pub const AVG_AREA_M2: [f64; 16] = [
    4.357_449_416_078_39e12,
    6.097_884_417_941_339e11,
    8.680_178_039_899_731e10,
    1.239_343_465_508_818e10,
    1.770_347_654_491_309e9,
    2.529_038_581_819_452e8,
    3.612_906_216_441_25e7,
    5.161_293_359_717_198e6,
    7.373_275_975_944_188e5,
    1.053_325_134_272_069e5,
    1.504_750_190_766_437e4,
    2.149_643_129_451_882e3,
    3.070_918_756_316_063e2,
    4.387_026_794_728_301e1,
    6.267_181_135_324_322,
    8.953_115_907_605_802e-1,
];

/// The planner guarantees at least one cell, biased toward `>= target`; this
/// sentinel communicates the documented "too small to polyfill at all" case,
/// which callers resolve with centroid fallback at `r_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooSmall {
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerOutcome {
    Resolution(Resolution),
    TooSmall(TooSmall),
}

#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    pub target_cells: u32,
    pub min_resolution: Resolution,
    pub max_resolution: Resolution,
    pub containment_mode: crate::encode::ContainmentMode,
}

fn geodesic_area_m2(geom: &Geometry<f64>) -> Result<f64, Error> {
    match geom {
        Geometry::Polygon(p) => Ok(p.geodesic_area_unsigned()),
        Geometry::MultiPolygon(mp) => Ok(mp.geodesic_area_unsigned()),
        other => Err(Error::UnsupportedVariant(match other {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            _ => "unsupported",
        })),
    }
}

/// Run the planner: pick a resolution in `[min_resolution, max_resolution]`
/// for `geom` such that the encoder run at that resolution produces at
/// least one cell, biased toward `>= target_cells` with at most one
/// correction step.
pub fn plan_resolution(geom: &Geometry<f64>, options: &PlannerOptions) -> Result<PlannerOutcome, Error> {
    let area_m2 = geodesic_area_m2(geom)?;
    let target_cell_area = area_m2 / f64::from(options.target_cells.max(1));

    // Step 2: smallest r in [r_min, r_max] with avg_area[r] <= target_cell_area;
    // r_max if no such r exists.
    let mut chosen = options.max_resolution;
    for r in Resolution::range(options.min_resolution, options.max_resolution) {
        if AVG_AREA_M2[usize::from(r)] <= target_cell_area {
            chosen = r;
            break;
        }
    }

    // Step 3: validation.
    let encode_options = EncodeOptions {
        resolution: chosen,
        containment_mode: options.containment_mode,
    };
    let cells = geometry_to_cells(geom, &encode_options)?;
    if cells.is_empty() {
        return Ok(PlannerOutcome::TooSmall(TooSmall {
            resolution: options.max_resolution,
        }));
    }

    // Step 4: single-step correction.
    if cells.len() < options.target_cells as usize && chosen < options.max_resolution {
        let finer = chosen.succ().expect("chosen < max_resolution <= 15");
        return Ok(PlannerOutcome::Resolution(finer));
    }

    Ok(PlannerOutcome::Resolution(chosen))
}

/// Convenience: run the planner and the encoder together, returning the
/// final cell set at whatever resolution was chosen (applying centroid
/// fallback at `r_max` for the "too small" sentinel).
pub fn plan_and_encode(
    geom: &Geometry<f64>,
    options: &PlannerOptions,
) -> Result<(Vec<h3o::CellIndex>, Resolution), Error> {
    let outcome = plan_resolution(geom, options)?;
    let resolution = match outcome {
        PlannerOutcome::Resolution(r) => r,
        PlannerOutcome::TooSmall(t) => t.resolution,
    };
    let encode_options = EncodeOptions {
        resolution,
        containment_mode: options.containment_mode,
    };
    let cells = geometry_to_cells(geom, &encode_options)?;
    Ok((cells, resolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::ContainmentMode;
    use geo_types::{LineString, Polygon};

    fn switzerland_sized_square() -> Polygon<f64> {
        // approximates ~41 000 km^2 near the equator at these coordinates
        let half_deg = 1.82; // (2 * 1.82 deg)^2 * ~111km/deg^2 ~= 41_000 km^2
        Polygon::new(
            LineString::from(vec![
                (8.0 - half_deg, 47.0 - half_deg),
                (8.0 + half_deg, 47.0 - half_deg),
                (8.0 + half_deg, 47.0 + half_deg),
                (8.0 - half_deg, 47.0 + half_deg),
                (8.0 - half_deg, 47.0 - half_deg),
            ]),
            vec![],
        )
    }

    #[test]
    fn picks_a_resolution_within_bounds() {
        let poly = switzerland_sized_square();
        let options = PlannerOptions {
            target_cells: 1000,
            min_resolution: Resolution::Five,
            max_resolution: Resolution::Twelve,
            containment_mode: ContainmentMode::Overlap,
        };
        let outcome = plan_resolution(&Geometry::Polygon(poly), &options).unwrap();
        match outcome {
            PlannerOutcome::Resolution(r) => {
                assert!(r >= Resolution::Five && r <= Resolution::Twelve);
            }
            PlannerOutcome::TooSmall(_) => panic!("expected a resolution, not too-small"),
        }
    }

    #[test]
    fn monotonic_in_target_cells() {
        let poly = switzerland_sized_square();
        let base = PlannerOptions {
            target_cells: 100,
            min_resolution: Resolution::Five,
            max_resolution: Resolution::Twelve,
            containment_mode: ContainmentMode::Overlap,
        };
        let low = plan_resolution(&Geometry::Polygon(poly.clone()), &base).unwrap();
        let high_options = PlannerOptions {
            target_cells: 100_000,
            ..base
        };
        let high = plan_resolution(&Geometry::Polygon(poly), &high_options).unwrap();
        let res_of = |o: PlannerOutcome| match o {
            PlannerOutcome::Resolution(r) => u8::from(r),
            PlannerOutcome::TooSmall(t) => u8::from(t.resolution),
        };
        assert!(res_of(low) <= res_of(high));
    }
}
