//! Ingest configuration surface (§6). Values are taken from whatever the
//! owning process already parsed (a TOML/JSON file, environment variables,
//! ...); this crate only validates and consumes the result, it never reads
//! files or prompts interactively — that belongs to a boundary layer.

use serde::{Deserialize, Serialize};

use crate::encode::ContainmentMode;
use crate::error::ConfigError;

/// Ingest configuration: the settings a single ingest run is parameterized
/// by. Every failing field is collected and reported together, mirroring
/// the fail-before-any-side-effect policy in §7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Paths of the geometry/attribute sources to ingest. File reading
    /// itself is out of scope; this crate only needs the list to report on.
    pub input_files: Vec<String>,

    /// Path of the columnar database to (re-)create.
    pub output_path: String,

    /// Target cell count the adaptive planner aims for per polygon feature.
    pub target_cells: u32,

    /// Inclusive lower bound of the resolution range the planner may pick.
    pub min_resolution: u8,

    /// Inclusive upper bound of the resolution range the planner may pick.
    pub max_resolution: u8,

    /// One of `center`, `full`, `overlap`, `overlap_bbox`.
    pub containment_mode: String,
}

impl IngestConfig {
    /// Validate every field, collecting all failures instead of stopping at
    /// the first one, and parse `containment_mode` into its typed form.
    pub fn validate(&self) -> Result<ValidatedIngestConfig, ConfigError> {
        let mut errors = Vec::new();

        if self.input_files.is_empty() {
            errors.push("input_files must not be empty".to_string());
        }
        if self.output_path.trim().is_empty() {
            errors.push("output_path must not be empty".to_string());
        }
        if self.target_cells < 1 {
            errors.push("target_cells must be >= 1".to_string());
        }
        if self.min_resolution > 15 {
            errors.push(format!(
                "min_resolution {} is out of range [0, 15]",
                self.min_resolution
            ));
        }
        if self.max_resolution > 15 {
            errors.push(format!(
                "max_resolution {} is out of range [0, 15]",
                self.max_resolution
            ));
        }
        if self.min_resolution <= 15
            && self.max_resolution <= 15
            && self.min_resolution > self.max_resolution
        {
            errors.push(format!(
                "min_resolution ({}) must be <= max_resolution ({})",
                self.min_resolution, self.max_resolution
            ));
        }
        let containment_mode = match self.containment_mode.as_str() {
            "center" => Some(ContainmentMode::Center),
            "full" => Some(ContainmentMode::Full),
            "overlap" => Some(ContainmentMode::Overlap),
            "overlap_bbox" => Some(ContainmentMode::OverlapBbox),
            other => {
                errors.push(format!(
                    "containment_mode {other:?} is not one of center, full, overlap, overlap_bbox"
                ));
                None
            }
        };

        if !errors.is_empty() {
            return Err(ConfigError(errors));
        }

        Ok(ValidatedIngestConfig {
            input_files: self.input_files.clone(),
            output_path: self.output_path.clone(),
            target_cells: self.target_cells,
            min_resolution: self.min_resolution,
            max_resolution: self.max_resolution,
            containment_mode: containment_mode.expect("checked above"),
        })
    }
}

/// An [`IngestConfig`] that has passed [`IngestConfig::validate`]; resolution
/// bounds are guaranteed in range and ordered, and the containment mode is
/// parsed.
#[derive(Debug, Clone)]
pub struct ValidatedIngestConfig {
    pub input_files: Vec<String>,
    pub output_path: String,
    pub target_cells: u32,
    pub min_resolution: u8,
    pub max_resolution: u8,
    pub containment_mode: ContainmentMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_collects_all_errors() {
        let cfg = IngestConfig {
            input_files: vec![],
            output_path: String::new(),
            target_cells: 0,
            min_resolution: 9,
            max_resolution: 5,
            containment_mode: "bogus".to_string(),
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.0.len(), 5);
    }

    #[test]
    fn validate_accepts_a_well_formed_config() {
        let cfg = IngestConfig {
            input_files: vec!["a.gpkg".to_string()],
            output_path: "out.duckdb".to_string(),
            target_cells: 1000,
            min_resolution: 5,
            max_resolution: 12,
            containment_mode: "overlap".to_string(),
        };
        assert!(cfg.validate().is_ok());
    }
}
