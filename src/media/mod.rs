//! Capture-boundary input types.
//!
//! The capture subsystem (camera, microphone, file import) lives outside
//! this crate and hands over already-decoded data: a pixel buffer for the
//! face and a raw waveform with its sample rate for the voice. These types
//! normalize that input to what the encoders expect — RGB8 pixels, and
//! mono audio at the fixed 16 kHz processing rate.

pub mod audio;
pub mod image;

pub use audio::{AudioClip, TARGET_SAMPLE_RATE};
pub use image::{FaceImage, PixelLayout};
