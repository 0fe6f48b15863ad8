use ahash::{HashMap, HashMapExt};
use arrow2::array::PrimitiveArray;
use h3o::CellIndex;
use std::cmp::{max, min};
use std::collections::hash_map::Entry;

use crate::array::{CellIndexArray, H3ListArray, H3ListArrayBuilder};
use crate::error::GeometryError as Error;

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum KAggregationMethod {
    Min,
    Max,
}

pub struct GridDiskAggregateK {
    pub cells: CellIndexArray,
    pub distances: PrimitiveArray<u32>,
}

/// `grid_disk`/`grid_ring` lifted to whole columns. `touches` (§4.7) is built
/// on `grid_disk(cell, 1)`, exactly as the hierarchical predicate library
/// specifies.
pub trait GridOp
where
    Self: Sized,
{
    fn grid_disk(&self, k: u32) -> Result<H3ListArray<CellIndex>, Error>;

    fn grid_disk_aggregate_k(
        &self,
        k: u32,
        k_agg_method: KAggregationMethod,
    ) -> Result<GridDiskAggregateK, Error>;
}

impl GridOp for CellIndexArray {
    fn grid_disk(&self, k: u32) -> Result<H3ListArray<CellIndex>, Error> {
        let mut builder = H3ListArrayBuilder::<CellIndex>::default();
        for cell in self.iter() {
            match cell {
                Some(cell) => builder.push_valid(cell.grid_disk::<Vec<_>>(k).into_iter()),
                None => builder.push_invalid(),
            }
        }
        builder.build()
    }

    fn grid_disk_aggregate_k(
        &self,
        k: u32,
        k_agg_method: KAggregationMethod,
    ) -> Result<GridDiskAggregateK, Error> {
        let mut cellmap: HashMap<CellIndex, u32> = HashMap::with_capacity(self.len());
        for cell in self.iter().flatten() {
            for (grid_cell, grid_distance) in cell.grid_disk_distances::<Vec<_>>(k).into_iter() {
                match cellmap.entry(grid_cell) {
                    Entry::Occupied(mut e) => {
                        e.insert(match k_agg_method {
                            KAggregationMethod::Min => min(*e.get(), grid_distance),
                            KAggregationMethod::Max => max(*e.get(), grid_distance),
                        });
                    }
                    Entry::Vacant(e) => {
                        e.insert(grid_distance);
                    }
                };
            }
        }

        let mut cells = Vec::with_capacity(cellmap.len());
        let mut distances = Vec::with_capacity(cellmap.len());
        for (cell, distance) in cellmap.into_iter() {
            cells.push(cell);
            distances.push(distance);
        }

        Ok(GridDiskAggregateK {
            cells: CellIndexArray::from(cells),
            distances: PrimitiveArray::from_vec(distances),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::GridOp;
    use crate::array::CellIndexArray;
    use h3o::{LatLng, Resolution};

    #[test]
    fn grid_disk_k1_has_seven_cells() {
        let cell = LatLng::new(23.4, 12.4).unwrap().to_cell(Resolution::Seven);
        let arr: CellIndexArray = vec![cell].into();
        let disks = arr.grid_disk(1).unwrap();
        let disk = disks.iter_arrays().next().flatten().unwrap().unwrap();
        assert_eq!(disk.len(), 7);
    }
}
