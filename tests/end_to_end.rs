//! Literal end-to-end scenarios, one module per scenario family. Mirrors
//! the six numbered cases worked through by hand while designing the
//! encoder, planner, predicate and engine components.

use geo_types::{coord, Coord, Geometry, LineString, Point, Polygon};
use h3o::{CellIndex, LatLng, Resolution};

use h3dggs::config::ValidatedIngestConfig;
use h3dggs::crs::Crs;
use h3dggs::encode::{geometry_to_cells, ContainmentMode, EncodeOptions};
use h3dggs::engine::{CellRelation, QueryEngine, Selection};
use h3dggs::kernel::AreaUnit;
use h3dggs::planner::{plan_resolution, PlannerOptions, PlannerOutcome};
use h3dggs::predicates;
use h3dggs::store::{FeatureStore, RawFeature};

fn scratch_db_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("h3dggs_e2e_{name}_{}.duckdb", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

mod scenario_1_point_to_cell {
    use super::*;

    #[test]
    fn a_single_point_encodes_to_the_cell_containing_it() {
        let geom = Geometry::Point(Point::new(8.2, 46.8));
        let options = EncodeOptions::new(Resolution::Nine);
        let cells = geometry_to_cells(&geom, &options).unwrap();

        let expected = LatLng::new(46.8, 8.2).unwrap().to_cell(Resolution::Nine);
        assert_eq!(cells, vec![expected]);
    }
}

mod scenario_2_tiny_polygon_centroid_fallback {
    use super::*;
    use geo::Centroid;

    #[test]
    fn a_tenth_of_a_meter_square_falls_back_to_its_centroid_cell() {
        let d = 0.1 / 111_320.0;
        let center: Coord<f64> = coord! { x: 8.5, y: 47.3 };
        let poly = Polygon::new(
            LineString::from(vec![
                (center.x - d / 2.0, center.y - d / 2.0),
                (center.x + d / 2.0, center.y - d / 2.0),
                (center.x + d / 2.0, center.y + d / 2.0),
                (center.x - d / 2.0, center.y + d / 2.0),
                (center.x - d / 2.0, center.y - d / 2.0),
            ]),
            vec![],
        );
        let options = EncodeOptions::new(Resolution::Ten);
        let cells = geometry_to_cells(&Geometry::Polygon(poly.clone()), &options).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].resolution(), Resolution::Ten);
        let centroid_cell = LatLng::new(poly.centroid().unwrap().y(), poly.centroid().unwrap().x())
            .unwrap()
            .to_cell(Resolution::Ten);
        assert_eq!(cells[0], centroid_cell);
    }
}

mod scenario_3_adaptive_planner_switzerland_sized_region {
    use super::*;

    #[test]
    fn a_41_000_km2_region_targeting_1000_cells_stays_within_bounds_and_meets_target() {
        let half_deg = 1.82;
        let poly = Polygon::new(
            LineString::from(vec![
                (8.0 - half_deg, 47.0 - half_deg),
                (8.0 + half_deg, 47.0 - half_deg),
                (8.0 + half_deg, 47.0 + half_deg),
                (8.0 - half_deg, 47.0 + half_deg),
                (8.0 - half_deg, 47.0 - half_deg),
            ]),
            vec![],
        );
        let options = PlannerOptions {
            target_cells: 1000,
            min_resolution: Resolution::Five,
            max_resolution: Resolution::Twelve,
            containment_mode: ContainmentMode::Overlap,
        };
        let outcome = plan_resolution(&Geometry::Polygon(poly.clone()), &options).unwrap();
        let resolution = match outcome {
            PlannerOutcome::Resolution(r) => r,
            PlannerOutcome::TooSmall(_) => panic!("a 41,000 km^2 region is never too small"),
        };
        assert!(resolution >= Resolution::Five && resolution <= Resolution::Twelve);

        let encode_options = EncodeOptions::new(resolution).with_containment_mode(ContainmentMode::Overlap);
        let cells = geometry_to_cells(&Geometry::Polygon(poly), &encode_options).unwrap();
        assert!(cells.len() >= 1000 || resolution == Resolution::Twelve);
    }
}

mod scenario_4_hierarchical_intersects {
    use super::*;

    #[test]
    fn a_coarse_cell_and_one_of_its_grandchildren_relate_as_expected() {
        let c5 = LatLng::new(46.8, 8.2).unwrap().to_cell(Resolution::Five);
        let c10 = c5.children(Resolution::Ten).next().unwrap();
        assert_eq!(c10.parent(Resolution::Five), Some(c5));

        let a = [c5];
        let b = [c10];

        assert!(predicates::intersects(&a, &b));
        assert!(predicates::within(&b, &a));
        assert!(predicates::contains(&a, &b));
        assert!(!predicates::within(&a, &b));
    }

    #[test]
    fn the_same_relations_hold_through_the_query_engine() {
        let manager = duckdb::DuckdbConnectionManager::memory().unwrap();
        let pool = r2d2::Pool::builder().build(manager).unwrap();
        let engine = QueryEngine::from_pool(pool);

        let c5 = LatLng::new(46.8, 8.2).unwrap().to_cell(Resolution::Five);
        let c10 = c5.children(Resolution::Ten).next().unwrap();

        let a: Selection = CellRelation::from((vec![c5], Resolution::Five)).into();
        let b: Selection = CellRelation::from((vec![c10], Resolution::Ten)).into();

        assert!(engine.intersects(a.clone(), b.clone()).unwrap());
        assert!(engine.within(b.clone(), a.clone()).unwrap());
        assert!(engine.contains(a.clone(), b.clone()).unwrap());
        assert!(!engine.within(a, b).unwrap());
    }
}

mod scenario_5_union_with_mixed_resolutions {
    use super::*;

    #[test]
    fn a_coarse_cell_and_two_of_its_children_union_to_all_49_grandchildren() {
        let manager = duckdb::DuckdbConnectionManager::memory().unwrap();
        let pool = r2d2::Pool::builder().build(manager).unwrap();
        let engine = QueryEngine::from_pool(pool);

        let c6 = LatLng::new(46.8, 8.2).unwrap().to_cell(Resolution::Six);
        let children_at_8: Vec<CellIndex> = c6.children(Resolution::Eight).collect();
        assert_eq!(children_at_8.len(), 49);

        let mut mixed = vec![c6];
        mixed.push(children_at_8[0]);
        mixed.push(children_at_8[1]);

        let selection: Selection = CellRelation::from((mixed, Resolution::Eight)).into();
        let union = engine.union(selection).unwrap();

        assert_eq!(union.resolution(), Some(Resolution::Eight));
        assert_eq!(union.len(), 49);
        for child in &children_at_8 {
            assert!(union.cells().contains(child));
        }
    }
}

mod scenario_6_intersection_composed_with_area {
    use super::*;

    fn square(min_x: f64, min_y: f64, side_deg: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (min_x + side_deg, min_y),
                (min_x + side_deg, min_y + side_deg),
                (min_x, min_y + side_deg),
                (min_x, min_y),
            ]),
            vec![],
        )
    }

    #[test]
    fn forest_lake_intersection_area_is_bounded_by_each_unions_area() {
        let db_path = scratch_db_path("scenario6");
        let config = ValidatedIngestConfig {
            input_files: vec![],
            output_path: db_path.clone(),
            target_cells: 1,
            min_resolution: 8,
            max_resolution: 8,
            containment_mode: ContainmentMode::Overlap,
        };

        let forest = RawFeature {
            feature_id: 1,
            crs: Crs::Wgs84,
            geometry: Geometry::Polygon(square(8.00, 47.00, 0.02)),
            attributes: vec![("kategorie".to_string(), "Wald".to_string())],
        };
        let lake = RawFeature {
            feature_id: 2,
            crs: Crs::Wgs84,
            geometry: Geometry::Polygon(square(8.01, 47.01, 0.02)),
            attributes: vec![("kategorie".to_string(), "See".to_string())],
        };

        FeatureStore::build(&config, vec![forest, lake]).unwrap();
        let engine = QueryEngine::open(&db_path).unwrap();

        let forest_sel = "kategorie = 'Wald'";
        let lake_sel = "kategorie = 'See'";

        let union_forest = engine.union(forest_sel).unwrap();
        let union_lake = engine.union(lake_sel).unwrap();
        let intersection = engine.intersection(forest_sel, lake_sel).unwrap();

        let area_intersection = engine.area(intersection.clone(), AreaUnit::SquareKilometers).unwrap();
        let area_union_forest = engine.area(union_forest, AreaUnit::SquareKilometers).unwrap();
        let area_union_lake = engine.area(union_lake, AreaUnit::SquareKilometers).unwrap();

        assert!(area_intersection.is_finite());
        assert!(area_intersection >= 0.0);
        assert!(area_intersection <= area_union_forest);
        assert!(area_intersection <= area_union_lake);

        let _ = std::fs::remove_file(&db_path);
    }
}

mod universal_properties {
    use super::*;

    #[test]
    fn contains_is_within_with_arguments_swapped() {
        let a = vec![LatLng::new(23.4, 12.4).unwrap().to_cell(Resolution::Seven)];
        let b = vec![LatLng::new(23.4, 12.4).unwrap().to_cell(Resolution::Five)];
        assert_eq!(predicates::contains(&b, &a), predicates::within(&a, &b));
    }

    #[test]
    fn union_is_idempotent() {
        let manager = duckdb::DuckdbConnectionManager::memory().unwrap();
        let pool = r2d2::Pool::builder().build(manager).unwrap();
        let engine = QueryEngine::from_pool(pool);

        let c6 = LatLng::new(46.8, 8.2).unwrap().to_cell(Resolution::Six);
        let children: Vec<CellIndex> = c6.children(Resolution::Eight).collect();

        let selection: Selection = CellRelation::from((children.clone(), Resolution::Eight)).into();
        let once = engine.union(selection).unwrap();
        let twice = engine.union(once.clone()).unwrap();

        let mut once_sorted = once.cells().to_vec();
        once_sorted.sort_unstable();
        let mut twice_sorted = twice.cells().to_vec();
        twice_sorted.sort_unstable();
        assert_eq!(once_sorted, twice_sorted);
    }
}
