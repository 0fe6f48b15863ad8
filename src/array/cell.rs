use arrow2::array::PrimitiveArray;

use crate::array::{CellIndexArray, ResolutionArray};

impl CellIndexArray {
    pub fn resolution(&self) -> ResolutionArray {
        self.map_values(|cell| Some(cell.resolution())).collect()
    }

    pub fn area_km2(&self) -> PrimitiveArray<f64> {
        self.map_values(|cell| Some(cell.area_km2())).collect()
    }

    pub fn area_m2(&self) -> PrimitiveArray<f64> {
        self.map_values(|cell| Some(cell.area_m2())).collect()
    }
}
