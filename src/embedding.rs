//! Fixed-length biometric embeddings and the similarity scorer.
//!
//! Face embeddings are L2-normalized by convention, so dot product
//! approximates cosine similarity. Voice embeddings carry no such guarantee
//! and are scored with an explicit cosine. Both scorers clamp into [0, 1]:
//! clamping absorbs floating-point drift above 1.0 and maps any negative
//! similarity to 0 (this engine has no anti-correlation semantics).

use serde::{Deserialize, Serialize};

/// A fixed-dimensional real-valued vector summarizing biometric identity
/// features, produced by a feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Embedding(values)
    }

    /// All-zero embedding of the given dimension. Used as the voice
    /// extraction fallback; callers must treat it as a failed-extraction
    /// signal, never as a legitimate template.
    pub fn zeros(dim: usize) -> Self {
        Embedding(vec![0.0; dim])
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_values(self) -> Vec<f32> {
        self.0
    }

    pub fn l2_norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// True when the vector has zero norm, i.e. cosine against it is
    /// undefined.
    pub fn is_zero(&self) -> bool {
        self.l2_norm() == 0.0
    }

    /// Scale to unit length. Zero vectors are left untouched.
    pub fn l2_normalize(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for x in self.0.iter_mut() {
                *x /= norm;
            }
        }
    }

    /// Dot product. Mismatched dimensions score 0 rather than panicking;
    /// the operands then cannot have come from the same encoder.
    pub fn dot(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() {
            return 0.0;
        }
        self.0.iter().zip(other.0.iter()).map(|(x, y)| x * y).sum()
    }

    /// Cosine similarity. Defined as 0.0 when either operand has zero norm
    /// (avoids division by zero) or when dimensions differ.
    pub fn cosine(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() {
            return 0.0;
        }

        let norm_a = self.l2_norm();
        let norm_b = other.l2_norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        self.dot(other) / (norm_a * norm_b)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Embedding(values)
    }
}

/// Face similarity: dot product of two (assumed L2-normalized) embeddings,
/// clamped into [0, 1].
pub fn score_face(a: &Embedding, b: &Embedding) -> f32 {
    a.dot(b).clamp(0.0, 1.0)
}

/// Voice similarity: `1 - cosine_distance(a, b)`, clamped into [0, 1].
/// A zero-norm operand (the degraded-extraction fallback) scores 0.
pub fn score_voice(a: &Embedding, b: &Embedding) -> f32 {
    a.cosine(b).clamp(0.0, 1.0)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(-1000.0f32..1000.0, dim)
    }

    proptest! {
        #[test]
        fn face_score_in_unit_interval(a in vector(8), b in vector(8)) {
            let (a, b) = (Embedding::new(a), Embedding::new(b));
            let s = score_face(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn voice_score_in_unit_interval(a in vector(8), b in vector(8)) {
            let (a, b) = (Embedding::new(a), Embedding::new(b));
            let s = score_voice(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn face_score_symmetric(a in vector(8), b in vector(8)) {
            let (a, b) = (Embedding::new(a), Embedding::new(b));
            prop_assert_eq!(score_face(&a, &b), score_face(&b, &a));
        }

        #[test]
        fn voice_score_symmetric(a in vector(8), b in vector(8)) {
            let (a, b) = (Embedding::new(a), Embedding::new(b));
            prop_assert_eq!(score_voice(&a, &b), score_voice(&b, &a));
        }

        #[test]
        fn self_similarity_is_one(a in vector(8).prop_filter("non-zero", |v| {
            v.iter().map(|x| x * x).sum::<f32>().sqrt() > 1e-3
        })) {
            let a = Embedding::new(a);
            prop_assert!((score_voice(&a, &a) - 1.0).abs() < 1e-3);
        }
    }
}
