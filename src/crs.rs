//! CRS transformer (C2): reproject a geometry's vertices to WGS84 once per
//! batch, reusing one [`proj::Proj`] instance per source CRS for the
//! lifetime of the transformer the way the teacher's codebase amortizes
//! per-batch setup elsewhere (building a list-array builder once per call
//! rather than per row).

use std::collections::HashMap;

use geo_types::{Coord, Geometry};
use proj::{Proj, Transform};

use crate::error::CrsError;

/// The sentinel and the two accepted spellings of an EPSG code (§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    Wgs84,
    Epsg(u32),
}

impl Crs {
    pub fn parse(raw: &str) -> Result<Self, CrsError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("already WGS84") || trimmed.eq_ignore_ascii_case("wgs84") {
            return Ok(Crs::Wgs84);
        }
        if let Some(code) = trimmed.strip_prefix("EPSG:").or_else(|| trimmed.strip_prefix("epsg:"))
        {
            return code
                .parse::<u32>()
                .map(Crs::Epsg)
                .map_err(|_| CrsError::UnrecognizedCrs(raw.to_string()));
        }
        if let Ok(code) = trimmed.parse::<u32>() {
            return Ok(Crs::Epsg(code));
        }
        Err(CrsError::UnrecognizedCrs(raw.to_string()))
    }

    fn proj_string(&self) -> String {
        match self {
            Crs::Wgs84 => "EPSG:4326".to_string(),
            Crs::Epsg(code) => format!("EPSG:{code}"),
        }
    }
}

/// Caches one [`Proj`] per `(source, target)` pair for the duration of a
/// batch. A `source` of [`Crs::Wgs84`] is always a no-op and never touches
/// the cache.
#[derive(Default)]
pub struct CrsTransformer {
    cache: HashMap<(Crs, Crs), Proj>,
}

impl CrsTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproject every vertex of `geometry` from `source` to WGS84 in place.
    /// A no-op when `source` is already [`Crs::Wgs84`].
    pub fn to_wgs84(&mut self, source: &Crs, geometry: &mut Geometry<f64>) -> Result<(), CrsError> {
        if *source == Crs::Wgs84 {
            return Ok(());
        }
        let target = Crs::Wgs84;
        let key = (source.clone(), target.clone());
        if !self.cache.contains_key(&key) {
            let proj = Proj::new_known_crs(&source.proj_string(), &target.proj_string(), None)
                .map_err(|source_err| CrsError::TransformerSetup {
                    from: source.proj_string(),
                    to: target.proj_string(),
                    source: source_err,
                })?;
            self.cache.insert(key.clone(), proj);
        }
        let proj = self.cache.get(&key).expect("just inserted");

        geometry
            .transform(proj)
            .map_err(|source_err| CrsError::Transform {
                x: f64::NAN,
                y: f64::NAN,
                source: source_err,
            })?;
        Ok(())
    }

    /// Reproject a single coordinate. Used by the point-to-cell fast path,
    /// which does not need a whole-geometry transform.
    pub fn point_to_wgs84(&mut self, source: &Crs, coord: Coord<f64>) -> Result<Coord<f64>, CrsError> {
        let mut geom = Geometry::Point(coord.into());
        self.to_wgs84(source, &mut geom)?;
        match geom {
            Geometry::Point(p) => Ok(p.0),
            _ => unreachable!("geometry variant is preserved by transform"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accepted_forms() {
        assert_eq!(Crs::parse("already WGS84").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::parse("EPSG:4326").unwrap(), Crs::Epsg(4326));
        assert_eq!(Crs::parse("2056").unwrap(), Crs::Epsg(2056));
        assert_eq!(Crs::parse("EPSG:2056").unwrap(), Crs::Epsg(2056));
        assert!(Crs::parse("not a crs").is_err());
    }
}
