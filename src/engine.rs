//! DGGS query engine (C6): boolean predicates, set operations and area over
//! feature selections stored in a [`crate::store::FeatureStore`]-backed
//! database, with resolution normalization across mixed-resolution feature
//! sets (§4.6). Grounded directly on
//! `original_source/engine/h3_engine.py`'s `H3Engine` class — the same
//! `intersects`/`within`/`contains`/`intersection`/`count_cells`/
//! `count_features`/`get_resolutions` surface, re-expressed against
//! `duckdb`-rs. Set reasoning itself is delegated to
//! [`crate::predicates`] (C7) and single-cell hierarchy ops to
//! [`crate::kernel`] (C1), exactly as the data flow in §2 describes: "C6 →
//! (C7 for set reasoning, C1 for hierarchical ops)".

use ahash::AHashSet;
use duckdb::DuckdbConnectionManager;
use h3o::{CellIndex, Resolution};
use r2d2::Pool;

use crate::algorithm::ChangeResolutionOp;
use crate::array::CellIndexArray;
use crate::error::EngineError;
use crate::kernel;
use crate::predicates;
use crate::store::FeatureStore;

pub use crate::kernel::AreaUnit;

/// A materialized cell-column relation: the output of [`QueryEngine::union`]
/// or [`QueryEngine::intersection`] (§4.6). Always normalized to a single
/// resolution, which is what makes `area` unambiguous on it. Owned by the
/// caller; there is nothing to release explicitly, it is a plain value.
#[derive(Debug, Clone, Default)]
pub struct CellRelation {
    cells: Vec<CellIndex>,
    resolution: Option<Resolution>,
}

impl CellRelation {
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            resolution: None,
        }
    }

    /// Build a relation from a cell set already known to share a single
    /// resolution (callers building one up from, say, a hand-picked set of
    /// cells rather than an engine query). Duplicates are removed but the
    /// caller's resolution claim is trusted as-is.
    pub fn new(mut cells: Vec<CellIndex>, resolution: Resolution) -> Self {
        cells.sort_unstable();
        cells.dedup();
        Self {
            cells,
            resolution: Some(resolution),
        }
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A logical handle to a subset of feature rows (glossary: Selection):
/// either an attribute-level filter (an opaque WHERE-clause the caller
/// hands the engine) or an already-materialized [`CellRelation`]. Both are
/// first-class arguments to every engine operation (§4.6 "uniform API").
#[derive(Debug, Clone)]
pub enum Selection {
    /// A boolean expression in the storage engine's SQL dialect, evaluated
    /// against the `features` table (e.g. `"kategorie = 'Wald'"`).
    Filter(String),
    /// An already-evaluated cell relation, e.g. the output of `union`.
    CellRelation(CellRelation),
}

impl Selection {
    pub fn filter(expr: impl Into<String>) -> Self {
        Selection::Filter(expr.into())
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::Filter(value.to_string())
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::Filter(value)
    }
}

impl From<CellRelation> for Selection {
    fn from(value: CellRelation) -> Self {
        Selection::CellRelation(value)
    }
}

impl From<(Vec<CellIndex>, Resolution)> for CellRelation {
    fn from((cells, resolution): (Vec<CellIndex>, Resolution)) -> Self {
        CellRelation::new(cells, resolution)
    }
}

/// A conservative deny-list scan for filter strings accepted from outside
/// the owning process (§9). The core itself trusts `Selection::Filter`
/// input; a boundary layer that forwards end-user text should call this
/// first. Not applied internally.
pub fn is_plausibly_safe_filter(filter: &str) -> bool {
    const DENYLIST: [&str; 8] = [
        ";",
        "--",
        "/*",
        "union select",
        "into outfile",
        "load_file",
        "benchmark",
        "sleep",
    ];
    let lower = filter.to_lowercase();
    !DENYLIST.iter().any(|needle| lower.contains(needle))
}

fn normalize_to(cells: Vec<CellIndex>, resolution: Resolution) -> Result<Vec<CellIndex>, EngineError> {
    let array: CellIndexArray = cells.into();
    let normalized = array.change_resolution(resolution)?;
    let mut deduped: Vec<CellIndex> = normalized.iter().flatten().collect();
    deduped.sort_unstable();
    deduped.dedup();
    Ok(deduped)
}

/// The DGGS query engine: a read-only handle over a feature database built
/// by [`FeatureStore::build`]. Multiple engines may open the same database
/// concurrently (§5 "shared-resource policy").
pub struct QueryEngine {
    pool: Pool<DuckdbConnectionManager>,
}

impl QueryEngine {
    /// Open an already-built feature database for querying.
    pub fn open(path: &str) -> Result<Self, EngineError> {
        Ok(Self {
            pool: FeatureStore::open_pool(path)?,
        })
    }

    /// Wrap an already-open connection pool (e.g. one shared with another
    /// reader engine).
    pub fn from_pool(pool: Pool<DuckdbConnectionManager>) -> Self {
        Self { pool }
    }

    /// `MIN(h3_resolution), MAX(h3_resolution)` over the rows a filter
    /// selects. `None` when no row matches (empty selection, §4.6).
    fn filter_resolution_bounds(&self, filter: &str) -> Result<Option<(u8, u8)>, EngineError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT MIN(h3_resolution), MAX(h3_resolution) FROM features WHERE {filter}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let (min, max): (Option<u8>, Option<u8>) =
            stmt.query_row([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(min.zip(max))
    }

    fn selection_bounds(&self, selection: &Selection) -> Result<Option<(Resolution, Resolution)>, EngineError> {
        match selection {
            Selection::Filter(filter) => {
                let Some((min, max)) = self.filter_resolution_bounds(filter)? else {
                    return Ok(None);
                };
                Ok(Some((
                    Resolution::try_from(min).expect("resolution stored by ingest is always valid"),
                    Resolution::try_from(max).expect("resolution stored by ingest is always valid"),
                )))
            }
            Selection::CellRelation(rel) => Ok(rel.resolution.map(|r| (r, r))),
        }
    }

    /// Flatten and de-duplicate every cell a filter selects, skipping (with
    /// a diagnostic) any value that does not decode to a valid cell index —
    /// the recoverable-grid-quirk policy of §7 tier 1.
    fn fetch_filter_cells(&self, filter: &str) -> Result<Vec<CellIndex>, EngineError> {
        let conn = self.pool.get()?;
        let sql =
            format!("SELECT DISTINCT UNNEST(h3_cells) AS cell FROM features WHERE {filter}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, u64>(0))?;
        let mut cells = Vec::new();
        for raw in rows {
            let raw = raw?;
            match CellIndex::try_from(raw) {
                Ok(cell) => cells.push(cell),
                Err(error) => {
                    tracing::warn!(raw, %error, "skipping invalid cell id encountered while normalizing a selection");
                }
            }
        }
        Ok(cells)
    }

    fn selection_cells(&self, selection: &Selection) -> Result<Vec<CellIndex>, EngineError> {
        match selection {
            Selection::Filter(filter) => self.fetch_filter_cells(filter),
            Selection::CellRelation(rel) => Ok(rel.cells.clone()),
        }
    }

    /// `intersects(A, B)` (§4.6): true iff the two selections share at least
    /// one cell after normalizing to `min(r_min(A), r_min(B))`. Delegates
    /// the actual set reasoning to [`predicates::intersects`] (C7).
    pub fn intersects(&self, a: impl Into<Selection>, b: impl Into<Selection>) -> Result<bool, EngineError> {
        let cells_a = self.selection_cells(&a.into())?;
        let cells_b = self.selection_cells(&b.into())?;
        Ok(predicates::intersects(&cells_a, &cells_b))
    }

    /// `within(A, B)` (§4.6): true iff every cell of `A` (normalized) is
    /// also present in `B` (normalized).
    pub fn within(&self, a: impl Into<Selection>, b: impl Into<Selection>) -> Result<bool, EngineError> {
        let cells_a = self.selection_cells(&a.into())?;
        let cells_b = self.selection_cells(&b.into())?;
        Ok(predicates::within(&cells_a, &cells_b))
    }

    /// `contains(A, B) ≡ within(B, A)` — enforced as an identity, not a
    /// re-implementation (§4.6).
    pub fn contains(&self, a: impl Into<Selection>, b: impl Into<Selection>) -> Result<bool, EngineError> {
        self.within(b, a)
    }

    /// `union(S)` (§4.6): every cell of `S`, normalized to `r_max(S)` —
    /// cells already at `r_max` pass through, coarser cells expand into
    /// their children at `r_max`, the result is de-duplicated. This is the
    /// *refined* union and the only representation `area` can sum
    /// unambiguously.
    pub fn union(&self, selection: impl Into<Selection>) -> Result<CellRelation, EngineError> {
        let selection = selection.into();
        let Some((_, r_max)) = self.selection_bounds(&selection)? else {
            return Ok(CellRelation::empty());
        };
        let cells = self.selection_cells(&selection)?;
        let cells = normalize_to(cells, r_max)?;
        Ok(CellRelation {
            cells,
            resolution: Some(r_max),
        })
    }

    /// `intersection(A, B)` (§4.6): partition into the finer side `F`
    /// (whichever selection has the larger `r_max`) and the coarser side
    /// `C`; coarsen `C` to `r_join = min(r_min(A), r_min(B))`; keep the
    /// cells of `F` whose parent at `r_join` is in that coarsened set; then
    /// normalize the surviving cells to `r_fine = max(r_max(A), r_max(B))`
    /// exactly as `union` does.
    pub fn intersection(
        &self,
        a: impl Into<Selection>,
        b: impl Into<Selection>,
    ) -> Result<CellRelation, EngineError> {
        let a = a.into();
        let b = b.into();
        let (Some((r_min_a, r_max_a)), Some((r_min_b, r_max_b))) =
            (self.selection_bounds(&a)?, self.selection_bounds(&b)?)
        else {
            return Ok(CellRelation::empty());
        };

        let r_fine = r_max_a.max(r_max_b);
        let r_join = r_min_a.min(r_min_b);

        let cells_a = self.selection_cells(&a)?;
        let cells_b = self.selection_cells(&b)?;

        let (fine_cells, coarse_cells) = if r_max_a >= r_max_b {
            (cells_a, cells_b)
        } else {
            (cells_b, cells_a)
        };

        let coarse_array: CellIndexArray = coarse_cells.into();
        let coarse_normalized: AHashSet<CellIndex> = coarse_array
            .change_resolution(r_join)?
            .iter()
            .flatten()
            .collect();

        let mut matched = Vec::with_capacity(fine_cells.len());
        for cell in fine_cells {
            let parent = kernel::cell_to_parent(cell, r_join)?;
            if coarse_normalized.contains(&parent) {
                matched.push(cell);
            }
        }

        let cells = normalize_to(matched, r_fine)?;
        Ok(CellRelation {
            cells,
            resolution: Some(r_fine),
        })
    }

    /// `area(X, unit)` (§4.6). `X` may be a [`CellRelation`] (assumed
    /// already refined) or a [`Selection::Filter`]; a filter spanning more
    /// than one resolution is ambiguous and the caller must `union` it
    /// first (§9 open question, resolved here as a typed error rather than
    /// silent auto-normalization, so the caller's intent is never guessed).
    pub fn area(&self, selection: impl Into<Selection>, unit: AreaUnit) -> Result<f64, EngineError> {
        match selection.into() {
            Selection::CellRelation(rel) => {
                let mut cells = rel.cells;
                cells.sort_unstable();
                cells.dedup();
                Ok(cells.iter().map(|c| kernel::cell_area(*c, unit)).sum())
            }
            Selection::Filter(filter) => {
                let resolutions = self.resolutions(&filter)?;
                match resolutions.as_slice() {
                    [] => Ok(0.0),
                    [_single] => {
                        let cells = self.fetch_filter_cells(&filter)?;
                        Ok(cells.iter().map(|c| kernel::cell_area(*c, unit)).sum())
                    }
                    many => Err(EngineError::AmbiguousResolution(many.to_vec())),
                }
            }
        }
    }

    /// `total_area(r, unit)` (§4.6): every cell in every feature row is
    /// mapped to its representative at `r` (parent if finer, children if
    /// coarser, identity otherwise), deduplicated across the whole table,
    /// then area-summed.
    pub fn total_area(&self, resolution: Resolution, unit: AreaUnit) -> Result<f64, EngineError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT UNNEST(h3_cells) AS cell FROM features")?;
        let rows = stmt.query_map([], |row| row.get::<_, u64>(0))?;
        let mut cells = Vec::new();
        for raw in rows {
            let raw = raw?;
            match CellIndex::try_from(raw) {
                Ok(cell) => cells.push(cell),
                Err(error) => {
                    tracing::warn!(raw, %error, "skipping invalid cell id encountered computing total area");
                }
            }
        }
        let cells = normalize_to(cells, resolution)?;
        Ok(cells.iter().map(|c| kernel::cell_area(*c, unit)).sum())
    }

    /// `count_cells(filter)`: total (non-distinct) number of cells across
    /// the filtered rows, i.e. `SUM(h3_cell_count)`. `h3_cell_count` is
    /// `UINTEGER`; DuckDB promotes `SUM` over it to `HUGEINT`, so the cast
    /// back to `BIGINT` is explicit rather than relying on the driver to
    /// narrow a 128-bit value.
    pub fn count_cells(&self, filter: &str) -> Result<u64, EngineError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT CAST(COALESCE(SUM(h3_cell_count), 0) AS BIGINT) FROM features WHERE {filter}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let total: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// `count_features(filter)`: number of feature rows matching `filter`.
    pub fn count_features(&self, filter: &str) -> Result<u64, EngineError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT COUNT(*) FROM features WHERE {filter}");
        let mut stmt = conn.prepare(&sql)?;
        let total: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// `resolutions(filter)`: the distinct `h3_resolution` values present
    /// among the filtered rows, ascending.
    pub fn resolutions(&self, filter: &str) -> Result<Vec<u8>, EngineError> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT DISTINCT h3_resolution FROM features WHERE {filter} ORDER BY h3_resolution"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, u8>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_list_flags_classic_injection_markers() {
        assert!(!is_plausibly_safe_filter("x = 1; DROP TABLE features"));
        assert!(!is_plausibly_safe_filter("1=1 UNION SELECT * FROM secrets"));
        assert!(!is_plausibly_safe_filter("pg_sleep(SLEEP(5))"));
        assert!(is_plausibly_safe_filter("kategorie = 'Wald'"));
    }

    #[test]
    fn empty_relation_has_no_resolution() {
        let rel = CellRelation::empty();
        assert!(rel.is_empty());
        assert_eq!(rel.resolution(), None);
    }

    #[test]
    fn selection_converts_from_str_and_relation() {
        let from_str: Selection = "a = 1".into();
        matches!(from_str, Selection::Filter(_));
        let from_rel: Selection = CellRelation::empty().into();
        matches!(from_rel, Selection::CellRelation(_));
    }
}
