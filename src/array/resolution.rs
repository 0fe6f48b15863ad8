use std::mem::transmute;

use arrow2::array::PrimitiveArray;
use h3o::Resolution;

use crate::error::GeometryError as Error;

pub struct ResolutionArray(PrimitiveArray<u8>);

impl TryFrom<PrimitiveArray<u8>> for ResolutionArray {
    type Error = Error;

    fn try_from(value: PrimitiveArray<u8>) -> Result<Self, Self::Error> {
        value
            .iter()
            .flatten()
            .try_for_each(|r| Resolution::try_from(*r).map(|_| ()))?;
        Ok(Self(value))
    }
}

impl ResolutionArray {
    pub fn iter(&self) -> impl Iterator<Item = Option<Resolution>> + '_ {
        // contents are validated upon construction, so a plain transmute is safe
        self.0
            .iter()
            .map(|v| v.map(|r| unsafe { transmute::<u8, Resolution>(*r) }))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn area_km2(&self) -> PrimitiveArray<f64> {
        PrimitiveArray::from_iter(self.iter().map(|v| v.map(|r| r.area_km2())))
    }

    pub fn area_m2(&self) -> PrimitiveArray<f64> {
        PrimitiveArray::from_iter(self.iter().map(|v| v.map(|r| r.area_m2())))
    }

    pub fn into_inner(self) -> PrimitiveArray<u8> {
        self.0
    }
}

impl FromIterator<Resolution> for ResolutionArray {
    fn from_iter<T: IntoIterator<Item = Resolution>>(iter: T) -> Self {
        Self(PrimitiveArray::from_iter(
            iter.into_iter().map(|v| Some(u8::from(v))),
        ))
    }
}

impl FromIterator<Option<Resolution>> for ResolutionArray {
    fn from_iter<T: IntoIterator<Item = Option<Resolution>>>(iter: T) -> Self {
        Self(PrimitiveArray::from_iter(
            iter.into_iter().map(|v| v.map(u8::from)),
        ))
    }
}

impl From<Vec<Resolution>> for ResolutionArray {
    fn from(value: Vec<Resolution>) -> Self {
        Self::from_iter(value.into_iter())
    }
}
