use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ChefError, Result};

/// Tunables for the resource planner. Heuristics, not contracts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerPolicy {
    /// Working-buffer headroom for the compressor, as a multiple of input size.
    pub compression_factor: f64,
    /// Per-worker bytes not proportional to input (allocator, pool, stacks).
    pub fixed_overhead: u64,
    pub default_chunk: usize,
    pub min_chunk: usize,
    pub max_chunk: usize,
    /// Artifact bytes per input byte. Derived from the recipe when unset.
    pub expansion_factor: Option<f64>,
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        Self {
            compression_factor: 1.1,
            fixed_overhead: 8 * 1024 * 1024,
            default_chunk: 64 * 1024,
            min_chunk: 4 * 1024,
            max_chunk: 4 * 1024 * 1024,
            expansion_factor: None,
        }
    }
}

impl PlannerPolicy {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        let policy: Self = serde_json::from_slice(&raw)
            .map_err(|e| ChefError::Configuration(format!("policy {}: {e}", path.display())))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.compression_factor.is_finite() && self.compression_factor >= 0.0) {
            return Err(ChefError::Configuration(
                "compression_factor must be a finite non-negative number".into(),
            ));
        }
        if let Some(f) = self.expansion_factor {
            if !(f.is_finite() && f > 0.0) {
                return Err(ChefError::Configuration(
                    "expansion_factor must be a finite positive number".into(),
                ));
            }
        }
        if self.min_chunk == 0 || self.min_chunk > self.max_chunk {
            return Err(ChefError::Configuration(format!(
                "chunk bounds [{}, {}] are empty",
                self.min_chunk, self.max_chunk
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, br#"{"fixed_overhead": 1024}"#).unwrap();
        let p = PlannerPolicy::from_json_file(&path).unwrap();
        assert_eq!(p.fixed_overhead, 1024);
        assert_eq!(p.default_chunk, PlannerPolicy::default().default_chunk);
    }

    #[test]
    fn inverted_chunk_bounds_are_rejected() {
        let p = PlannerPolicy {
            min_chunk: 10,
            max_chunk: 5,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ChefError::Configuration(_))));
    }
}
