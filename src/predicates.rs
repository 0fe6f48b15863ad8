//! Hierarchical predicate library (C7): stateless boolean tests between two
//! in-memory cell sets, normalizing resolution first exactly as the DGGS
//! query engine's own `intersects`/`within`/`contains` do at the columnar
//! level (§4.6, §4.7). Kept free of any storage or engine dependency so it
//! can also back the geometric cross-check engine's DGGS side (C8).

use ahash::AHashSet;
use h3o::{CellIndex, Resolution};

fn normalize(cells: &[CellIndex], resolution: Resolution) -> AHashSet<CellIndex> {
    cells.iter().map(|c| c.parent(resolution).unwrap_or(*c)).collect()
}

fn min_resolution(a: &[CellIndex], b: &[CellIndex]) -> Option<Resolution> {
    a.iter()
        .chain(b.iter())
        .map(|c| c.resolution())
        .min()
}

/// `true` iff `a` and `b` share at least one cell once both are normalized
/// to the coarser of the two sets' resolutions.
pub fn intersects(a: &[CellIndex], b: &[CellIndex]) -> bool {
    let Some(r) = min_resolution(a, b) else {
        return false;
    };
    let a_norm = normalize(a, r);
    let b_norm = normalize(b, r);
    a_norm.intersection(&b_norm).next().is_some()
}

/// `true` iff every cell of `a` (normalized) is also present in `b`
/// (normalized). Empty input is handled by convention, not set theory: an
/// empty `a` is vacuously a subset of anything, but §4.7 requires predicates
/// to report `false` on empty input rather than let that vacuous truth leak
/// through as a surprising "yes" for a selection that matched nothing.
pub fn within(a: &[CellIndex], b: &[CellIndex]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let r = min_resolution(a, b).expect("both non-empty, resolution exists");
    let a_norm = normalize(a, r);
    let b_norm = normalize(b, r);
    a_norm.is_subset(&b_norm)
}

/// `true` iff every cell of `b` (normalized) is also present in `a`
/// (normalized): `within` with the arguments swapped.
pub fn contains(a: &[CellIndex], b: &[CellIndex]) -> bool {
    within(b, a)
}

/// `true` iff `a` and `b` do not intersect, but some cell of `a` is within
/// grid distance 1 of some cell of `b`, both normalized to the coarser
/// resolution.
pub fn touches(a: &[CellIndex], b: &[CellIndex]) -> bool {
    let Some(r) = min_resolution(a, b) else {
        return false;
    };
    let a_norm = normalize(a, r);
    let b_norm = normalize(b, r);
    if a_norm.intersection(&b_norm).next().is_some() {
        return false;
    }
    a_norm.iter().any(|cell| {
        cell.grid_disk::<Vec<_>>(1)
            .into_iter()
            .filter(|neighbor| neighbor != cell)
            .any(|neighbor| b_norm.contains(&neighbor))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::LatLng;

    fn cell(lat: f64, lng: f64, resolution: Resolution) -> CellIndex {
        LatLng::new(lat, lng).unwrap().to_cell(resolution)
    }

    #[test]
    fn identical_sets_intersect_and_contain_each_other() {
        let a = vec![cell(23.4, 12.4, Resolution::Seven)];
        assert!(intersects(&a, &a));
        assert!(within(&a, &a));
        assert!(contains(&a, &a));
    }

    #[test]
    fn empty_input_is_never_vacuously_within() {
        let b = vec![cell(23.4, 12.4, Resolution::Seven)];
        let empty: Vec<CellIndex> = vec![];
        assert!(!within(&empty, &b));
        assert!(!within(&b, &empty));
        assert!(!within(&empty, &empty));
        assert!(!contains(&b, &empty));
        assert!(!intersects(&empty, &b));
        assert!(!touches(&empty, &b));
    }

    #[test]
    fn disjoint_sets_do_not_intersect() {
        let a = vec![cell(23.4, 12.4, Resolution::Seven)];
        let b = vec![cell(-23.4, -12.4, Resolution::Seven)];
        assert!(!intersects(&a, &b));
        assert!(!within(&a, &b));
    }

    #[test]
    fn child_is_within_its_parent() {
        let parent = cell(23.4, 12.4, Resolution::Five);
        let children: Vec<CellIndex> = parent.children(Resolution::Seven).collect();
        let a = vec![children[0]];
        let b = vec![parent];
        assert!(within(&a, &b));
        assert!(contains(&b, &a));
    }

    #[test]
    fn neighbors_touch_but_do_not_intersect() {
        let center = cell(23.4, 12.4, Resolution::Seven);
        let neighbor = center
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .find(|c| *c != center)
            .unwrap();
        let a = vec![center];
        let b = vec![neighbor];
        assert!(!intersects(&a, &b));
        assert!(touches(&a, &b));
    }
}
