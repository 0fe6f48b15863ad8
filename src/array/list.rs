use std::marker::PhantomData;

use arrow2::array::{Array, ListArray, PrimitiveArray};
use arrow2::bitmap::{Bitmap, MutableBitmap};
use arrow2::datatypes::DataType;
use arrow2::offset::OffsetsBuffer;

use super::{H3Array, H3IndexArrayValue};
use crate::error::GeometryError as Error;

/// A list-array of H3 index arrays: one variable-length cell set per row.
/// Used wherever a single operation (`grid_disk`, `children`, polyfill of a
/// batch of geometries, ...) produces one cell set per input element.
pub struct H3ListArray<IX> {
    list_array: ListArray<i64>,
    h3index_phantom: PhantomData<IX>,
}

impl<IX> H3ListArray<IX>
where
    IX: H3IndexArrayValue,
    H3Array<IX>: TryFrom<PrimitiveArray<u64>, Error = Error>,
{
    pub fn len(&self) -> usize {
        self.list_array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_array.is_empty()
    }

    /// Iterate over the per-row cell sets. `None` for a null row, `Some(Err(_))`
    /// if the row's values somehow failed re-validation (should not happen for
    /// arrays built through [`H3ListArrayBuilder`]).
    pub fn iter_arrays(&self) -> impl Iterator<Item = Option<Result<H3Array<IX>, Error>>> + '_ {
        self.list_array.iter().map(|opt| {
            opt.map(|array| {
                array
                    .as_any()
                    .downcast_ref::<PrimitiveArray<u64>>()
                    .cloned()
                    .ok_or(Error::UnsupportedVariant("list value is not UInt64"))
                    .and_then(H3Array::<IX>::try_from)
            })
        })
    }

    pub fn try_from_iter<I>(iter: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Option<Vec<IX>>>,
    {
        let mut builder = H3ListArrayBuilder::<IX>::default();
        for item in iter {
            match item {
                Some(values) => builder.push_valid(values.into_iter()),
                None => builder.push_invalid(),
            }
        }
        builder.build()
    }

    pub fn into_inner(self) -> ListArray<i64> {
        self.list_array
    }
}

/// Accumulates per-row cell sets into one [`H3ListArray`], the way a
/// `Vec<Vec<_>>` would, but directly into arrow2's offsets + values layout.
pub struct H3ListArrayBuilder<IX> {
    values: Vec<u64>,
    offsets: Vec<i64>,
    validity: Vec<bool>,
    h3index_phantom: PhantomData<IX>,
}

impl<IX> Default for H3ListArrayBuilder<IX> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            offsets: vec![0],
            validity: Vec::new(),
            h3index_phantom: PhantomData,
        }
    }
}

impl<IX> H3ListArrayBuilder<IX>
where
    IX: H3IndexArrayValue,
{
    pub fn push_valid<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = IX>,
    {
        self.values
            .extend(values.into_iter().map(|v| v.into()));
        self.offsets.push(self.values.len() as i64);
        self.validity.push(true);
    }

    pub fn push_invalid(&mut self) {
        self.offsets.push(self.values.len() as i64);
        self.validity.push(false);
    }

    /// Push one row for each item: `Some(values)` pushes a valid row,
    /// `None` pushes a null row.
    pub fn extend<I, J>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Option<J>>,
        J: IntoIterator<Item = IX>,
    {
        for row in rows {
            match row {
                Some(values) => self.push_valid(values),
                None => self.push_invalid(),
            }
        }
    }

    pub fn build(self) -> Result<H3ListArray<IX>, Error> {
        let offsets: OffsetsBuffer<i64> = self.offsets.try_into()?;
        let validity: Option<Bitmap> = {
            let bitmap: Bitmap = MutableBitmap::from_iter(self.validity).into();
            if bitmap.unset_bits() == 0 {
                None
            } else {
                Some(bitmap)
            }
        };
        let list_array = ListArray::try_new(
            ListArray::<i64>::default_datatype(DataType::UInt64),
            offsets,
            PrimitiveArray::from_vec(self.values).to_boxed(),
            validity,
        )
        .map_err(Error::from)?;
        Ok(H3ListArray {
            list_array,
            h3index_phantom: PhantomData,
        })
    }
}
