//! Feature extractor boundary.
//!
//! The concrete encoder networks (ArcFace-class for faces, ECAPA-TDNN-class
//! for voices) live outside this crate. The engine depends only on their
//! contract: a fixed-dimensional vector per input, stable for identical
//! inputs. Encoders are injected capabilities at engine construction, never
//! process-global singletons, so tests run on deterministic fakes without
//! loading models.
//!
//! Failure policy at this boundary is asymmetric by design:
//! - Face encoders fail hard with [`FaceEncodeError::NoFaceDetected`] when
//!   the image contains no face. They must never return a zero or garbage
//!   vector instead.
//! - Voice encoders may fail internally; the engine converts that into a
//!   flagged zero-vector template rather than aborting (availability over
//!   strictness for the audio path).

use crate::embedding::Embedding;
use crate::error::FaceEncodeError;
use crate::media::FaceImage;
use anyhow::Result;

/// A detected face's bounding box in pixel coordinates, as reported by a
/// face detector ahead of embedding extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceRegion {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Select the canonical face when a detector reports several: the largest
/// bounding box wins, ties broken by the lowest detection index. The policy
/// is deterministic so repeated extraction of the same image reproduces the
/// same embedding.
pub fn select_primary_face(regions: &[FaceRegion]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, region) in regions.iter().enumerate() {
        let area = region.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((idx, area)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Face feature extractor: image in, fixed-dimensional embedding out.
///
/// Implementations must L2-normalize their output (the face scorer assumes
/// unit-length operands) and must apply [`select_primary_face`] or an
/// equivalent deterministic policy when more than one face is detected.
pub trait FaceEncoder: Send + Sync {
    /// Output embedding dimension.
    fn dim(&self) -> usize;

    fn encode(&self, image: &FaceImage) -> Result<Embedding, FaceEncodeError>;
}

/// Voice feature extractor: mono 16 kHz samples in, fixed-dimensional
/// embedding out. The engine owns downmix and resampling; implementations
/// receive audio already at the processing rate.
pub trait VoiceEncoder: Send + Sync {
    /// Output embedding dimension.
    fn dim(&self) -> usize;

    fn encode(&self, samples: &[f32]) -> Result<Embedding>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: f32, y: f32, w: f32, h: f32) -> FaceRegion {
        FaceRegion {
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_primary_face_none_when_empty() {
        assert_eq!(select_primary_face(&[]), None);
    }

    #[test]
    fn test_primary_face_largest_wins() {
        let regions = [
            region(0.0, 0.0, 10.0, 10.0),
            region(50.0, 50.0, 40.0, 40.0),
            region(200.0, 10.0, 20.0, 20.0),
        ];
        assert_eq!(select_primary_face(&regions), Some(1));
    }

    #[test]
    fn test_primary_face_tie_breaks_to_lowest_index() {
        let regions = [
            region(0.0, 0.0, 30.0, 30.0),
            region(100.0, 0.0, 30.0, 30.0),
        ];
        assert_eq!(select_primary_face(&regions), Some(0));
    }

    #[test]
    fn test_primary_face_deterministic() {
        let regions = [
            region(0.0, 0.0, 12.0, 9.0),
            region(5.0, 5.0, 9.0, 12.0),
            region(9.0, 9.0, 11.0, 10.0),
        ];
        let first = select_primary_face(&regions);
        for _ in 0..10 {
            assert_eq!(select_primary_face(&regions), first);
        }
    }
}
