use arrow2::array::PrimitiveArray;
use h3o::Resolution;

use crate::array::{CellIndexArray, H3ListArray, H3ListArrayBuilder};
use crate::error::GeometryError as Error;
use h3o::CellIndex;

/// `cell_to_parent`/`cell_to_children` lifted to whole columns, the
/// building block resolution normalization (§4.6, §4.7) is expressed with.
pub trait HierarchyOp
where
    Self: Sized,
{
    fn parent(&self, resolution: Resolution) -> Self;

    fn children(&self, resolution: Resolution) -> Result<H3ListArray<CellIndex>, Error>;

    fn children_count(&self, resolution: Resolution) -> PrimitiveArray<u64>;
}

impl HierarchyOp for CellIndexArray {
    fn parent(&self, resolution: Resolution) -> Self {
        self.map_values(|cell| cell.parent(resolution)).collect()
    }

    fn children(&self, resolution: Resolution) -> Result<H3ListArray<CellIndex>, Error> {
        let mut builder = H3ListArrayBuilder::<CellIndex>::default();
        for value in self.iter() {
            match value {
                Some(cell) => builder.push_valid(cell.children(resolution)),
                None => builder.push_invalid(),
            }
        }
        builder.build()
    }

    fn children_count(&self, resolution: Resolution) -> PrimitiveArray<u64> {
        self.map_values(|cell| Some(cell.children_count(resolution)))
            .collect()
    }
}
