use std::path::Path;

use super::frame::StereoFrame;
use crate::error::SoundLoadError;

pub const TONE_SECONDS: f32 = 0.5;
const TONE_GAIN: f32 = 0.5;
const TONE_DECAY_RATE: f32 = 6.0; // e^(-rate * t)

#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // the audio data array
    pub sample_rate: u32,
}

impl SampleBuffer {
    // A3 = 220Hz sits on note 57
    pub fn tone_frequency(note: u8) -> f32 {
        220.0 * 2.0_f32.powf((note as f32 - 57.0) / 12.0)
    }

    // Half a second of decaying sine at the note's pitch, same on both sides
    pub fn synth_tone(note: u8, sample_rate: u32) -> Self {
        let freq = Self::tone_frequency(note);
        let rate = sample_rate as f32;
        let len = (TONE_SECONDS * rate) as usize;
        let data = (0..len)
            .map(|i| {
                let t = i as f32 / rate;
                let env = TONE_GAIN * (-TONE_DECAY_RATE * t).exp();
                StereoFrame::mono(env * (std::f32::consts::TAU * freq * t).sin())
            })
            .collect();
        Self { data, sample_rate }
    }

    // Interleaved samples of any channel count, folded down to stereo
    pub fn from_interleaved(samples: &[f32], channels: usize, file_rate: u32, target_rate: u32) -> Result<Self, SoundLoadError> {
        if channels == 0 {
            return Err(SoundLoadError::MissingChannels);
        }
        let frames: Vec<StereoFrame> = if channels == 1 {
            samples.iter().map(|&x| StereoFrame::mono(x)).collect() // mono, duplicate
        } else {
            samples
                .chunks_exact(channels) // anything past the first two channels is dropped
                .map(|c| StereoFrame { left: c[0], right: c[1] })
                .collect()
        };
        if frames.is_empty() {
            return Err(SoundLoadError::Empty);
        }

        let data = if file_rate != target_rate {
            resample_linear(&frames, file_rate, target_rate)
        } else {
            frames
        };
        Ok(Self { data, sample_rate: target_rate })
    }

    // Load a WAV file from disk into the sample buffer
    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self, SoundLoadError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        // Read the samples from the WAV file
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, just pass it through
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, convert to float
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Self::from_interleaved(&samples, spec.channels as usize, spec.sample_rate, target_rate)
    }

    pub fn duration_secs(&self) -> f32 {
        self.data.len() as f32 / self.sample_rate.max(1) as f32
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio; // ex. 3.7
        let idx = src_pos.floor() as usize; // ex. 3
        let frac = (src_pos - idx as f64) as f32; // ex. 0.7
        if idx >= frames.len().saturating_sub(1) { // edge case
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame { // blend via frac and linear interpolation
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}
