use std::collections::HashMap;
use std::sync::Arc;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sound_id::SoundId;
use super::voice::Voice;
use crate::audio_api::AudioCommand;

const MAX_VOICES: usize = 32; // hard cap on simultaneous one-shots
const VOICE_GAIN: f32 = 0.8;

pub struct Engine {
    buffers: HashMap<SoundId, Arc<SampleBuffer>>,
    voices: Vec<Voice>,
    blocks: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            voices: Vec::with_capacity(MAX_VOICES),
            blocks: 0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.buffers.insert(id, buffer);
            }
            AudioCommand::Play(id) => self.trigger_voice(id),
        }
    }

    // unknown ids are a silent no-op
    fn trigger_voice(&mut self, id: SoundId) {
        let Some(buffer) = self.buffers.get(&id) else {
            return;
        };
        let voice = Voice::new(Arc::clone(buffer), VOICE_GAIN, self.blocks);
        if self.voices.len() < MAX_VOICES {
            self.voices.push(voice);
        } else if let Some(oldest) = self.voices.iter_mut().min_by_key(|v| v.started) {
            *oldest = voice; // steal
        }
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for voice in &mut self.voices {
            voice.render_into(out);
        }
        self.voices.retain(Voice::active);
        self.blocks += 1;
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}
