//! Typed error taxonomy for the enrollment and verification pipelines.
//!
//! Every pipeline-level failure is returned as a typed result; nothing is
//! fatal to the process. A failed call leaves the engine ready to serve the
//! next one.

use thiserror::Error;

/// Rejections of the identity string itself, before any I/O or inference.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity cannot be empty")]
    Empty,

    #[error("Identity too long: max {max}, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Identity contains path separators or control characters")]
    InvalidCharacters,
}

/// Template store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record, or only a partial record, exists for the identity.
    /// Partial records (face without voice or vice versa) are never
    /// treated as enrolled.
    #[error("No enrollment record for '{identity}'")]
    NotEnrolled { identity: String },

    /// Re-enrollment was attempted without the explicit overwrite flag.
    #[error("Identity '{identity}' is already enrolled (pass allow_overwrite to replace)")]
    AlreadyEnrolled { identity: String },

    #[error("Corrupt template for '{identity}': {reason}")]
    CorruptTemplate { identity: String, reason: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Face extraction failures. The face pipeline refuses to proceed without a
/// real face, so these are hard failures for both enrollment and
/// verification. Voice extraction has no counterpart: it soft-fails to a
/// flagged zero vector instead (see [`crate::engine::BiometricEngine`]).
#[derive(Error, Debug)]
pub enum FaceEncodeError {
    #[error("No face detected in the supplied image")]
    NoFaceDetected,

    #[error("Face encoder failure")]
    Encoder(#[source] anyhow::Error),
}

/// Enrollment pipeline failures. Enrollment is all-or-nothing: any of these
/// leaves no trace in the template store.
#[derive(Error, Debug)]
pub enum EnrollError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("No face capture supplied")]
    MissingFaceCapture,

    #[error("No voice capture supplied")]
    MissingVoiceCapture,

    #[error(transparent)]
    Face(#[from] FaceEncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Verification pipeline failures.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("No face capture supplied")]
    MissingFaceCapture,

    #[error("No voice capture supplied")]
    MissingVoiceCapture,

    #[error(transparent)]
    Face(#[from] FaceEncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The placeholder liveness gate rejected the captures. Not a real
    /// anti-spoof defense; see [`crate::liveness`].
    #[error("Liveness check rejected the captures: {reason}")]
    LivenessRejected { reason: String },
}

impl VerifyError {
    /// True when the failure is a missing or incomplete enrollment record.
    pub fn is_not_enrolled(&self) -> bool {
        matches!(self, VerifyError::Store(StoreError::NotEnrolled { .. }))
    }
}
