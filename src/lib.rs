//! duoprint — dual-factor biometric enrollment and verification.
//!
//! A user registers a face image and a short voice sample; fixed-length
//! embeddings are derived by pluggable encoders and persisted per identity.
//! A later fresh face/voice pair is scored against the stored templates and
//! the two similarities are fused into a single accept/reject decision.
//!
//! The crate is an embeddable engine: camera and microphone capture, preview
//! rendering, and the concrete encoder networks all live outside it. The
//! engine consumes already-decoded pixel buffers and waveforms and talks to
//! the encoders through the [`encoder::FaceEncoder`] and
//! [`encoder::VoiceEncoder`] traits.

pub mod config;
pub mod embedding;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod identity;
pub mod liveness;
pub mod media;
pub mod paths;
pub mod store;

pub use config::EngineConfig;
pub use embedding::{score_face, score_voice, Embedding};
pub use encoder::{FaceEncoder, FaceRegion, VoiceEncoder};
pub use engine::{BiometricEngine, Decision, EnrollReport};
pub use error::{EnrollError, FaceEncodeError, IdentityError, StoreError, VerifyError};
pub use liveness::LivenessConfig;
pub use media::{AudioClip, FaceImage, PixelLayout, TARGET_SAMPLE_RATE};
pub use store::{Modality, TemplateStore};
