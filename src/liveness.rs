//! Stubbed liveness gate.
//!
//! NOTE: This is a placeholder, not an anti-spoof defense. It applies a
//! trivial signal-energy heuristic to the voice capture and accepts every
//! face capture unconditionally. It exists so callers integrating a real
//! liveness subsystem have a seam to replace, and it is explicitly outside
//! the engine's trust guarantees.
//!
//! To integrate real liveness detection:
//! 1. Feed consecutive face frames and check landmark micro-movement.
//! 2. Run a challenge/response or replay-detection model on the audio.
//! 3. Replace [`LivenessGate::check`] with the combined verdict.

use serde::{Deserialize, Serialize};

/// Placeholder liveness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Run the placeholder gate during verification.
    pub enable: bool,
    /// Minimum RMS level below which the voice capture is treated as silent.
    pub min_voice_rms: f32,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enable: false,
            min_voice_rms: 1e-4,
        }
    }
}

/// Outcome of the placeholder check.
#[derive(Debug, Clone)]
pub struct LivenessOutcome {
    pub passed: bool,
    pub reason: Option<String>,
}

impl LivenessOutcome {
    fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Placeholder liveness gate.
pub struct LivenessGate {
    config: LivenessConfig,
}

impl LivenessGate {
    pub fn new(config: LivenessConfig) -> Self {
        if config.enable {
            log::info!(
                "Liveness gate enabled (placeholder heuristic, min_voice_rms={})",
                config.min_voice_rms
            );
        }
        Self { config }
    }

    pub fn enabled(&self) -> bool {
        self.config.enable
    }

    /// Check the mono voice capture. A disabled gate always passes.
    pub fn check(&self, voice_samples: &[f32]) -> LivenessOutcome {
        if !self.config.enable {
            return LivenessOutcome::pass();
        }

        if voice_samples.is_empty() {
            return LivenessOutcome::fail("empty voice capture");
        }

        let rms = (voice_samples.iter().map(|s| s * s).sum::<f32>()
            / voice_samples.len() as f32)
            .sqrt();

        if rms < self.config.min_voice_rms {
            return LivenessOutcome::fail(format!(
                "voice capture is silent (rms {rms:.6} < {})",
                self.config.min_voice_rms
            ));
        }

        LivenessOutcome::pass()
    }
}
