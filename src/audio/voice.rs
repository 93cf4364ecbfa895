use std::sync::Arc;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

// One-shot playback of a registered buffer. No stop, no loop: it plays to the
// end and frees its slot.
#[derive(Clone, Debug)]
pub struct Voice {
    buffer: Arc<SampleBuffer>,
    pos: usize,
    pub gain: f32,
    pub started: u64, // engine block counter at trigger time, used for stealing
}

impl Voice {
    pub fn new(buffer: Arc<SampleBuffer>, gain: f32, started: u64) -> Self {
        Self { buffer, pos: 0, gain, started }
    }

    pub fn active(&self) -> bool {
        self.pos < self.buffer.data.len()
    }

    pub fn render_into(&mut self, out: &mut [StereoFrame]) {
        // mix whatever is left of this buffer into the block
        let remaining = &self.buffer.data[self.pos.min(self.buffer.data.len())..];
        let n = remaining.len().min(out.len());
        for (frame, sample) in out.iter_mut().zip(&remaining[..n]) {
            frame.left += sample.left * self.gain;
            frame.right += sample.right * self.gain;
        }
        self.pos += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(len: usize) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer { data: vec![StereoFrame::mono(1.0); len], sample_rate: 48_000 })
    }

    #[test]
    fn voice_finishes_at_end_of_buffer() {
        let mut voice = Voice::new(buffer(5), 0.5, 0);
        let mut out = [StereoFrame::zero(); 4];
        voice.render_into(&mut out);
        assert!(voice.active());
        assert_eq!(out[3], StereoFrame::mono(0.5));

        let mut out = [StereoFrame::zero(); 4];
        voice.render_into(&mut out);
        assert!(!voice.active());
        assert_eq!(out[0], StereoFrame::mono(0.5));
        assert_eq!(out[1], StereoFrame::zero());
    }

    #[test]
    fn voices_sum_into_the_block() {
        let mut out = [StereoFrame::mono(0.25); 2];
        Voice::new(buffer(2), 1.0, 0).render_into(&mut out);
        assert_eq!(out[0], StereoFrame::mono(1.25));
    }
}
