use crate::array::CellIndexArray;
use crate::error::GeometryError as Error;
use arrow2::array::Float64Array;
use h3o::LatLng;

pub struct CoordinateArrays {
    pub lat: Float64Array,
    pub lng: Float64Array,
}

/// Cell-center coordinates in degrees, used by diagnostics and by the
/// geometric validation backend (`crate::spatial_engine`) to render a DGGS
/// cell set back to points for a planar oracle comparison.
pub trait ToCoordinatesOp {
    fn to_coordinates(&self) -> Result<CoordinateArrays, Error>;
}

impl ToCoordinatesOp for CellIndexArray {
    fn to_coordinates(&self) -> Result<CoordinateArrays, Error> {
        let mut lat = Vec::with_capacity(self.len());
        let mut lng = Vec::with_capacity(self.len());
        for cell in self.iter() {
            match cell {
                Some(cell) => {
                    let ll = LatLng::from(cell);
                    lat.push(ll.lat());
                    lng.push(ll.lng());
                }
                None => {
                    lat.push(0.0);
                    lng.push(0.0);
                }
            }
        }
        Ok(CoordinateArrays {
            lat: Float64Array::from_vec(lat)
                .with_validity(self.primitive_array().validity().cloned()),
            lng: Float64Array::from_vec(lng)
                .with_validity(self.primitive_array().validity().cloned()),
        })
    }
}
