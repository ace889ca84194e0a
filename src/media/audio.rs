//! Raw waveform handling: channel downmix and resampling.
//!
//! Voice encoders consume mono audio at a fixed 16 kHz rate. Whatever the
//! capture device produced — stereo, 44.1/48 kHz, integer samples — is
//! normalized here: multi-channel input is downmixed by averaging channels,
//! then resampled with an FFT resampler when the source rate differs.

use anyhow::{bail, Context, Result};
use rubato::{FftFixedIn, Resampler};
use std::path::Path;

/// Target sample rate for all voice processing (16 kHz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Resampler input chunk size in frames.
const RESAMPLE_CHUNK: usize = 1024;

/// A decoded waveform as delivered by the capture subsystem: interleaved
/// f32 samples in [-1, 1], with the source sample rate and channel count.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            bail!("Sample rate must be non-zero");
        }
        if channels == 0 {
            bail!("Channel count must be non-zero");
        }
        if !samples.len().is_multiple_of(channels as usize) {
            bail!(
                "Interleaved sample count {} is not divisible by {} channels",
                samples.len(),
                channels
            );
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Decode a WAV file into a clip. Integer and float PCM are supported;
    /// integer samples are scaled into [-1, 1].
    pub fn from_wav_path(path: &Path) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV: {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .context("Failed to decode float WAV samples")?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .context("Failed to decode integer WAV samples")?
            }
        };

        log::debug!(
            "Loaded WAV {}: {} Hz, {} ch, {} frames",
            path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len() / spec.channels as usize
        );

        Self::new(samples, spec.sample_rate, spec.channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() / self.channels as usize;
        (frames as f64 / self.sample_rate as f64 * 1000.0) as u64
    }

    /// Downmix to mono by averaging channels.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }

    /// Downmix to mono and resample to [`TARGET_SAMPLE_RATE`].
    pub fn to_mono_16k(&self) -> Result<Vec<f32>> {
        let mono = self.to_mono();
        resample(&mono, self.sample_rate, TARGET_SAMPLE_RATE)
    }
}

/// Resample a mono signal. A no-op when the rates already match; otherwise
/// processed in fixed chunks, with the final partial chunk zero-padded so no
/// trailing samples are dropped.
fn resample(mono: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(mono.to_vec());
    }
    if mono.is_empty() {
        return Ok(Vec::new());
    }

    log::debug!("Resampling {} frames: {} Hz -> {} Hz", mono.len(), from_rate, to_rate);

    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 2, 1)
            .context("Failed to construct resampler")?;

    let expected = (mono.len() as f64 * to_rate as f64 / from_rate as f64) as usize;
    let mut out = Vec::with_capacity(expected + RESAMPLE_CHUNK);
    let mut pos = 0;

    while pos < mono.len() {
        let needed = resampler.input_frames_next();
        let chunk = if pos + needed <= mono.len() {
            mono[pos..pos + needed].to_vec()
        } else {
            let mut tail = mono[pos..].to_vec();
            tail.resize(needed, 0.0);
            tail
        };
        pos += needed;

        let output = resampler
            .process(&[chunk], None)
            .context("Resampling failed")?;
        out.extend_from_slice(&output[0]);
    }

    Ok(out)
}
