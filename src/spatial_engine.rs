//! Spatial predicate engine interface (C8): the DGGS cell-based predicates
//! are the production path, but §9's cross-check tooling needs a second,
//! independent oracle computing the same predicates directly on the planar
//! geometry, so disagreements are detectable. Modeled as a small capability
//! trait with two backends, the way the teacher's kernel/array split keeps
//! "the algorithm" separate from "the storage it runs over".

use geo::{Contains, Intersects};
use geo_types::Geometry;
use h3o::CellIndex;

use crate::predicates;

/// A predicate engine capable of answering the four hierarchical relations
/// over two features. Implementors may use whichever representation suits
/// them; callers only depend on this interface, never the concrete type.
pub trait SpatialPredicateEngine {
    fn intersects(&self, a: &Feature, b: &Feature) -> bool;
    fn within(&self, a: &Feature, b: &Feature) -> bool;
    fn contains(&self, a: &Feature, b: &Feature) -> bool;
    fn touches(&self, a: &Feature, b: &Feature) -> bool;
    fn name(&self) -> &'static str;
}

/// A feature carries both representations so either engine can operate on
/// it without recomputing anything.
pub struct Feature {
    pub cells: Vec<CellIndex>,
    pub geometry: Geometry<f64>,
}

/// The production engine: answers every predicate purely from the
/// normalized cell sets (§4.6, §4.7), never touching the planar geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DggsPredicateEngine;

impl SpatialPredicateEngine for DggsPredicateEngine {
    fn intersects(&self, a: &Feature, b: &Feature) -> bool {
        predicates::intersects(&a.cells, &b.cells)
    }

    fn within(&self, a: &Feature, b: &Feature) -> bool {
        predicates::within(&a.cells, &b.cells)
    }

    fn contains(&self, a: &Feature, b: &Feature) -> bool {
        predicates::contains(&a.cells, &b.cells)
    }

    fn touches(&self, a: &Feature, b: &Feature) -> bool {
        predicates::touches(&a.cells, &b.cells)
    }

    fn name(&self) -> &'static str {
        "dggs"
    }
}

/// The cross-check oracle: answers the same predicates directly on the
/// planar WGS84 geometry using `geo`'s relate algorithms, entirely
/// independent of any H3 cell. Used to validate the production engine on a
/// sample of features (§9), never in the hot query path.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometricPredicateEngine;

impl SpatialPredicateEngine for GeometricPredicateEngine {
    fn intersects(&self, a: &Feature, b: &Feature) -> bool {
        a.geometry.intersects(&b.geometry)
    }

    fn within(&self, a: &Feature, b: &Feature) -> bool {
        b.geometry.contains(&a.geometry)
    }

    fn contains(&self, a: &Feature, b: &Feature) -> bool {
        a.geometry.contains(&b.geometry)
    }

    fn touches(&self, a: &Feature, b: &Feature) -> bool {
        // `geo` has no standalone "touches" relate predicate at this stack's
        // version; approximate as "intersects but neither contains nor is
        // contained by" its boundary-sharing definition.
        a.geometry.intersects(&b.geometry)
            && !a.geometry.contains(&b.geometry)
            && !b.geometry.contains(&a.geometry)
    }

    fn name(&self) -> &'static str {
        "geometric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};
    use h3o::{LatLng, Resolution};

    fn square_feature(resolution: Resolution) -> Feature {
        let poly = Polygon::new(
            LineString::from(vec![(8.0, 46.0), (9.0, 46.0), (9.0, 47.0), (8.0, 47.0), (8.0, 46.0)]),
            vec![],
        );
        let geometry = Geometry::Polygon(poly.clone());
        let options = crate::encode::EncodeOptions::new(resolution);
        let cells = crate::encode::geometry_to_cells(&geometry, &options).unwrap();
        Feature { cells, geometry }
    }

    fn point_feature(lat: f64, lng: f64, resolution: Resolution) -> Feature {
        let geometry = Geometry::Point(Point::new(lng, lat));
        let cells = vec![LatLng::new(lat, lng).unwrap().to_cell(resolution)];
        Feature { cells, geometry }
    }

    #[test]
    fn both_engines_agree_a_point_inside_the_square_is_within_it() {
        let square = square_feature(Resolution::Seven);
        let point = point_feature(46.5, 8.5, Resolution::Seven);

        let dggs = DggsPredicateEngine;
        let geometric = GeometricPredicateEngine;
        assert_eq!(dggs.within(&point, &square), geometric.within(&point, &square));
        assert!(dggs.within(&point, &square));
    }

    #[test]
    fn both_engines_agree_a_distant_point_does_not_intersect() {
        let square = square_feature(Resolution::Seven);
        let point = point_feature(-10.0, -10.0, Resolution::Seven);

        let dggs = DggsPredicateEngine;
        let geometric = GeometricPredicateEngine;
        assert!(!dggs.intersects(&point, &square));
        assert!(!geometric.intersects(&point, &square));
    }
}
