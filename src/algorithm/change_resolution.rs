use crate::array::CellIndexArray;
use crate::error::GeometryError as Error;
use h3o::{CellIndex, Resolution};
use std::cmp::Ordering;
use std::iter::repeat;

pub struct ChangedResolutionPair<T> {
    pub before: T,
    pub after: T,
}

/// The resolution-normalization step every boolean predicate and set
/// operation in §4.6/§4.7 is built from: coarsen via `parent`, refine via
/// `children`, both through one uniform entry point.
pub trait ChangeResolutionOp
where
    Self: Sized,
{
    /// Change the resolution of every contained cell to `resolution`.
    /// Coarsening maps a cell to its parent; refining expands a cell into
    /// all of its children. Invalid/empty values are omitted.
    fn change_resolution(&self, resolution: Resolution) -> Result<Self, Error>;

    /// Same as [`ChangeResolutionOp::change_resolution`], but also returns a
    /// before-array with the original cell repeated once per resulting
    /// after-cell, so a caller can pair each refined cell back to its source.
    fn change_resolution_paired(
        &self,
        resolution: Resolution,
    ) -> Result<ChangedResolutionPair<Self>, Error>;
}

#[inline]
fn extend_with_cell(out_vec: &mut Vec<CellIndex>, cell: CellIndex, target_resolution: Resolution) {
    match cell.resolution().cmp(&target_resolution) {
        Ordering::Less => out_vec.extend(cell.children(target_resolution)),
        Ordering::Equal => out_vec.push(cell),
        Ordering::Greater => out_vec.extend(cell.parent(target_resolution)),
    }
}

impl ChangeResolutionOp for CellIndexArray {
    fn change_resolution(&self, resolution: Resolution) -> Result<Self, Error> {
        let mut out_vec: Vec<CellIndex> = Vec::with_capacity(self.len());
        self.iter()
            .flatten()
            .for_each(|cell| extend_with_cell(&mut out_vec, cell, resolution));
        Ok(out_vec.into())
    }

    fn change_resolution_paired(
        &self,
        resolution: Resolution,
    ) -> Result<ChangedResolutionPair<Self>, Error> {
        let mut before_vec: Vec<CellIndex> = Vec::with_capacity(self.len());
        let mut after_vec: Vec<CellIndex> = Vec::with_capacity(self.len());

        self.iter().flatten().for_each(|cell| {
            let len_before = after_vec.len();
            extend_with_cell(&mut after_vec, cell, resolution);
            before_vec.extend(repeat(cell).take(after_vec.len() - len_before));
        });

        Ok(ChangedResolutionPair {
            before: before_vec.into(),
            after: after_vec.into(),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::ChangeResolutionOp;
    use crate::array::CellIndexArray;
    use ahash::HashSet;
    use h3o::{LatLng, Resolution};

    #[test]
    fn change_resolution_refines() {
        let arr: CellIndexArray = vec![
            Some(LatLng::new(23.4, 12.4).unwrap().to_cell(Resolution::Five)),
            None,
            Some(LatLng::new(12.3, 0.5).unwrap().to_cell(Resolution::Nine)),
        ]
        .into();

        let arr_res_six = arr.change_resolution(Resolution::Six).unwrap();
        assert_eq!(arr_res_six.len(), 7 + 1);
    }

    #[test]
    fn change_resolution_paired_preserves_source() {
        let arr: CellIndexArray = vec![
            Some(LatLng::new(23.4, 12.4).unwrap().to_cell(Resolution::Five)),
            None,
            Some(LatLng::new(12.3, 0.5).unwrap().to_cell(Resolution::Nine)),
        ]
        .into();

        let pair = arr.change_resolution_paired(Resolution::Six).unwrap();
        assert_eq!(pair.after.len(), 7 + 1);
        assert_eq!(pair.before.len(), pair.after.len());
        assert_eq!(
            pair.before.iter().flatten().collect::<HashSet<_>>().len(),
            2
        );
    }
}
