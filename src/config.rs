//! Engine configuration.
//!
//! The acceptance threshold and the fusion weights are deliberately
//! configuration, not logic baked into comparisons: the reference values
//! (0.7 threshold, equal weights) come with no stated ROC/FAR-FRR
//! calibration, so deployments must be able to tune them.

use crate::liveness::LivenessConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reference acceptance threshold for the fused score (closed lower bound:
/// a total exactly at the threshold is accepted).
pub const DEFAULT_ACCEPT_THRESHOLD: f32 = 0.7;

/// Reference face embedding dimension (ArcFace-class encoders).
pub const DEFAULT_FACE_DIM: usize = 512;

/// Reference voice embedding dimension (ECAPA-TDNN-class encoders).
pub const DEFAULT_VOICE_DIM: usize = 256;

/// Configuration for the enrollment and verification engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fused score at or above which verification accepts.
    pub accept_threshold: f32,
    /// Fusion weight for the face score.
    pub face_weight: f32,
    /// Fusion weight for the voice score.
    pub voice_weight: f32,
    /// Expected face embedding dimension.
    pub face_dim: usize,
    /// Expected voice embedding dimension.
    pub voice_dim: usize,
    /// Placeholder liveness gate settings.
    pub liveness: LivenessConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            face_weight: 0.5,
            voice_weight: 0.5,
            face_dim: DEFAULT_FACE_DIM,
            voice_dim: DEFAULT_VOICE_DIM,
            liveness: LivenessConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults when the file does
    /// not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Reject out-of-range thresholds and degenerate weight combinations.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            bail!(
                "accept_threshold must be between 0.0 and 1.0, got {}",
                self.accept_threshold
            );
        }
        if self.face_weight < 0.0 || self.voice_weight < 0.0 {
            bail!("Fusion weights must be non-negative");
        }
        if self.face_weight + self.voice_weight <= 0.0 {
            bail!("At least one fusion weight must be positive");
        }
        if self.face_dim == 0 || self.voice_dim == 0 {
            bail!("Embedding dimensions must be non-zero");
        }
        Ok(())
    }

    /// Fuse the two per-modality scores into the decision score. With the
    /// default equal weights this is the unweighted mean.
    pub fn fuse(&self, face_score: f32, voice_score: f32) -> f32 {
        (face_score * self.face_weight + voice_score * self.voice_weight)
            / (self.face_weight + self.voice_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_fusion_is_unweighted_mean() {
        let config = EngineConfig::default();
        assert!((config.fuse(0.8, 0.6) - 0.7).abs() < 1e-6);
        assert_eq!(config.fuse(1.0, 1.0), 1.0);
        assert_eq!(config.fuse(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_fusion() {
        let config = EngineConfig {
            face_weight: 3.0,
            voice_weight: 1.0,
            ..EngineConfig::default()
        };
        assert!((config.fuse(1.0, 0.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = EngineConfig::default();
        config.accept_threshold = 1.5;
        assert!(config.validate().is_err());
        config.accept_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_weights() {
        let mut config = EngineConfig::default();
        config.face_weight = 0.0;
        config.voice_weight = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.accept_threshold = 0.82;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.accept_threshold, 0.82);
        assert_eq!(loaded.face_dim, DEFAULT_FACE_DIM);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.accept_threshold, DEFAULT_ACCEPT_THRESHOLD);
    }
}
