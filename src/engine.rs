//! Enrollment and verification pipelines.
//!
//! Both pipelines are synchronous request/response operations: no internal
//! parallelism, no scheduling assumptions. Callers needing responsiveness
//! dispatch them off any interactive thread themselves.
//!
//! The face/voice failure asymmetry is deliberate policy, not an oversight:
//! face extraction failures abort hard (the caller must recapture), while
//! voice extraction failures degrade to a flagged zero-vector embedding that
//! scores 0 — availability over strictness for the audio path. Callers that
//! want strictness check the `voice_degraded` flag on the result.

use crate::config::EngineConfig;
use crate::embedding::{score_face, score_voice, Embedding};
use crate::encoder::{FaceEncoder, VoiceEncoder};
use crate::error::{EnrollError, StoreError, VerifyError};
use crate::identity::validate_identity;
use crate::liveness::LivenessGate;
use crate::media::{AudioClip, FaceImage};
use crate::store::TemplateStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a successful enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollReport {
    pub identity: String,
    /// Voice extraction failed and a zero-vector template was stored.
    /// Verification against it will score the voice modality 0.
    pub voice_degraded: bool,
    /// Record creation timestamp (RFC 3339).
    pub created_at: String,
}

/// Outcome of a verification attempt. Component scores are always reported
/// so callers can audit the fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub accepted: bool,
    pub face_score: f32,
    pub voice_score: f32,
    /// Fused score the decision was made on.
    pub total: f32,
    /// Threshold the decision used (closed lower bound).
    pub threshold: f32,
    /// Fresh or stored voice embedding was a degraded zero-vector fallback.
    pub voice_degraded: bool,
}

impl Decision {
    /// Fuse two per-modality scores and decide. Accept iff the fused total
    /// reaches the configured threshold; a total exactly at the threshold
    /// accepts.
    pub fn from_scores(
        face_score: f32,
        voice_score: f32,
        voice_degraded: bool,
        config: &EngineConfig,
    ) -> Self {
        let total = config.fuse(face_score, voice_score);
        Decision {
            accepted: total >= config.accept_threshold,
            face_score,
            voice_score,
            total,
            threshold: config.accept_threshold,
            voice_degraded,
        }
    }
}

/// The dual-factor enrollment and verification engine.
///
/// Encoders are injected capabilities; the engine never constructs them.
/// The template store is cheap to clone, so several engines (or an engine
/// plus administrative tooling) can share one store and its per-identity
/// locks.
pub struct BiometricEngine {
    config: EngineConfig,
    store: TemplateStore,
    face_encoder: Arc<dyn FaceEncoder>,
    voice_encoder: Arc<dyn VoiceEncoder>,
    liveness: LivenessGate,
}

impl BiometricEngine {
    pub fn new(
        config: EngineConfig,
        store: TemplateStore,
        face_encoder: Arc<dyn FaceEncoder>,
        voice_encoder: Arc<dyn VoiceEncoder>,
    ) -> Result<Self> {
        config.validate()?;

        if face_encoder.dim() != config.face_dim {
            log::warn!(
                "Face encoder dim {} differs from configured {}",
                face_encoder.dim(),
                config.face_dim
            );
        }
        if voice_encoder.dim() != config.voice_dim {
            log::warn!(
                "Voice encoder dim {} differs from configured {}",
                voice_encoder.dim(),
                config.voice_dim
            );
        }

        log::info!(
            "Engine ready: threshold={:.2}, weights face={:.2}/voice={:.2}, store={}",
            config.accept_threshold,
            config.face_weight,
            config.voice_weight,
            store.root().display()
        );

        let liveness = LivenessGate::new(config.liveness.clone());
        Ok(Self {
            config,
            store,
            face_encoder,
            voice_encoder,
            liveness,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// True iff a complete enrollment record exists for the identity.
    pub fn is_enrolled(&self, identity: &str) -> bool {
        self.store.enrolled(identity)
    }

    /// Enroll an identity from captured inputs. All-or-nothing: any failure
    /// leaves no trace in the store. Re-enrolling an existing identity
    /// requires `allow_overwrite`.
    pub fn enroll(
        &self,
        identity: &str,
        face: Option<&FaceImage>,
        voice: Option<&AudioClip>,
        allow_overwrite: bool,
    ) -> Result<EnrollReport, EnrollError> {
        validate_identity(identity)?;
        let face = face.ok_or(EnrollError::MissingFaceCapture)?;
        let voice = voice.ok_or(EnrollError::MissingVoiceCapture)?;

        // Face first: a NoFaceDetected failure aborts before anything is
        // extracted for the voice path, and the store commit below is
        // atomic, so a partial record cannot appear.
        let face_embedding = self.face_encoder.encode(face)?;
        let (voice_embedding, voice_degraded) = self.extract_voice(voice);

        let created_at = self.store.save_record(
            identity,
            &face_embedding,
            &voice_embedding,
            voice_degraded,
            allow_overwrite,
        )?;

        log::info!(
            "Enrolled '{}'{}",
            identity,
            if voice_degraded {
                " (voice extraction degraded)"
            } else {
                ""
            }
        );

        Ok(EnrollReport {
            identity: identity.to_string(),
            voice_degraded,
            created_at,
        })
    }

    /// Verify fresh captures against the stored record for `identity`.
    ///
    /// Never attempts extraction for an identity without a complete record,
    /// and loads both stored templates under the identity's lock, so a
    /// concurrent re-enrollment is observed either entirely or not at all.
    pub fn verify(
        &self,
        identity: &str,
        face: Option<&FaceImage>,
        voice: Option<&AudioClip>,
    ) -> Result<Decision, VerifyError> {
        validate_identity(identity)?;

        if !self.store.exists(identity) {
            return Err(VerifyError::Store(StoreError::NotEnrolled {
                identity: identity.to_string(),
            }));
        }

        let face = face.ok_or(VerifyError::MissingFaceCapture)?;
        let voice = voice.ok_or(VerifyError::MissingVoiceCapture)?;

        // Partial records also surface as NotEnrolled, still before any
        // model inference runs.
        let (stored_face, stored_voice) = self.store.load_record(identity)?;

        if self.liveness.enabled() {
            let outcome = self.liveness.check(&voice.to_mono());
            if !outcome.passed {
                return Err(VerifyError::LivenessRejected {
                    reason: outcome.reason.unwrap_or_default(),
                });
            }
        }

        let fresh_face = self.face_encoder.encode(face)?;
        let (fresh_voice, fresh_degraded) = self.extract_voice(voice);

        let face_score = score_face(&fresh_face, &stored_face.embedding);
        let voice_score = score_voice(&fresh_voice, &stored_voice.embedding);
        let voice_degraded = fresh_degraded || stored_voice.degraded;

        let decision = Decision::from_scores(face_score, voice_score, voice_degraded, &self.config);

        log::info!(
            "Verification for '{}': face={:.2}, voice={:.2}, total={:.2}, threshold={:.2}, result={}",
            identity,
            decision.face_score,
            decision.voice_score,
            decision.total,
            decision.threshold,
            if decision.accepted { "ACCEPT" } else { "REJECT" }
        );

        Ok(decision)
    }

    /// Prepare and encode the voice capture. Encoder or preparation
    /// failures degrade to a zero vector instead of aborting.
    fn extract_voice(&self, clip: &AudioClip) -> (Embedding, bool) {
        match clip
            .to_mono_16k()
            .and_then(|samples| self.voice_encoder.encode(&samples))
        {
            Ok(embedding) => {
                if embedding.is_zero() {
                    log::warn!("Voice encoder produced a zero-norm embedding");
                    (embedding, true)
                } else {
                    (embedding, false)
                }
            }
            Err(err) => {
                log::warn!("Voice extraction failed, using zero-vector fallback: {err:#}");
                (Embedding::zeros(self.voice_encoder.dim()), true)
            }
        }
    }
}
