use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};

/// Parameters controlling suboptimal path enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFinderConfig {
    /// Keep enumerating while a path scores at least this fraction of the
    /// first (best) path found for the same TSS.
    pub fraction_major_path: f64,

    /// Maximum number of paths emitted per TSS.
    pub max_paths: usize,

    /// Safety bound on best-path searches per TSS.
    pub max_iters: usize,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self {
            fraction_major_path: 0.15,
            max_paths: 5,
            max_iters: 10_000,
        }
    }
}

impl PathFinderConfig {
    pub fn validate(&self) -> Result<()> {
        let f = self.fraction_major_path;
        if !(f > 0.0 && f <= 1.0) {
            return Err(PathError::InvalidFraction(f));
        }
        if self.max_paths == 0 {
            return Err(PathError::InvalidMaxPaths);
        }
        if self.max_iters == 0 {
            return Err(PathError::InvalidMaxIters);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PathFinderConfig::default().validate().is_ok());
    }

    #[test]
    fn fraction_out_of_range_is_rejected() {
        for f in [0.0, -0.5, 1.5, f64::NAN] {
            let cfg = PathFinderConfig { fraction_major_path: f, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(PathError::InvalidFraction(_))));
        }
        let cfg = PathFinderConfig { fraction_major_path: 1.0, ..Default::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_bounds_are_rejected() {
        let cfg = PathFinderConfig { max_paths: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(PathError::InvalidMaxPaths));

        let cfg = PathFinderConfig { max_iters: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(PathError::InvalidMaxIters));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PathFinderConfig = serde_json::from_str(r#"{"max_paths": 2}"#).unwrap();
        assert_eq!(cfg.max_paths, 2);
        assert_eq!(cfg.fraction_major_path, 0.15);
        assert_eq!(cfg.max_iters, 10_000);
    }
}
