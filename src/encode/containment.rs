//! The containment-mode vocabulary (§6): four string values that must
//! round-trip exactly through ingest configuration, mapped onto the H3
//! library's own polyfill semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy deciding which cells "cover" a polygon (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Cell included iff its center lies in the polygon.
    Center,
    /// Cell included iff it is entirely inside the polygon.
    Full,
    /// Cell included iff it intersects the polygon at any point. Default.
    Overlap,
    /// Cell included iff its bounding box intersects the polygon (superset
    /// of `Overlap`).
    OverlapBbox,
}

impl Default for ContainmentMode {
    fn default() -> Self {
        ContainmentMode::Overlap
    }
}

impl ContainmentMode {
    /// Map onto `h3o`'s own containment vocabulary. `OverlapBbox` has no
    /// literal bounding-box-intersection counterpart in `h3o`; `Covers` is
    /// the closest available superset of `Overlap` (documented in
    /// `DESIGN.md` as a resolved open question).
    pub fn to_h3o(self) -> h3o::geom::ContainmentMode {
        match self {
            ContainmentMode::Center => h3o::geom::ContainmentMode::ContainsCentroid,
            ContainmentMode::Full => h3o::geom::ContainmentMode::ContainsBoundary,
            ContainmentMode::Overlap => h3o::geom::ContainmentMode::IntersectsBoundary,
            ContainmentMode::OverlapBbox => h3o::geom::ContainmentMode::Covers,
        }
    }
}

impl fmt::Display for ContainmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainmentMode::Center => "center",
            ContainmentMode::Full => "full",
            ContainmentMode::Overlap => "overlap",
            ContainmentMode::OverlapBbox => "overlap_bbox",
        };
        f.write_str(s)
    }
}

impl FromStr for ContainmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(ContainmentMode::Center),
            "full" => Ok(ContainmentMode::Full),
            "overlap" => Ok(ContainmentMode::Overlap),
            "overlap_bbox" => Ok(ContainmentMode::OverlapBbox),
            other => Err(format!(
                "{other:?} is not one of center, full, overlap, overlap_bbox"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        for mode in [
            ContainmentMode::Center,
            ContainmentMode::Full,
            ContainmentMode::Overlap,
            ContainmentMode::OverlapBbox,
        ] {
            let s = mode.to_string();
            assert_eq!(ContainmentMode::from_str(&s).unwrap(), mode);
        }
    }
}
