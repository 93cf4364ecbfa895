// Audio bank: every buffer the engine can play, keyed by sound id. Entries
// are never removed, so replaced custom sounds stay resident.

use std::collections::HashMap;
use std::sync::Arc;

use crate::audio::{next_custom_id, SampleBuffer, SoundId};
use crate::audio_api::AudioCommand;
use crate::pipeline::project::Pad;

pub struct AudioBank {
    sample_rate: u32,
    entries: HashMap<SoundId, Arc<SampleBuffer>>,
}

impl AudioBank {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, entries: HashMap::new() }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // Synthesize the pad's default tone under its default id
    pub fn register_default(&mut self, pad: &Pad) -> AudioCommand {
        let id = SoundId::default_for(pad.note);
        let buffer = Arc::new(SampleBuffer::synth_tone(pad.note, self.sample_rate));
        self.entries.insert(id, Arc::clone(&buffer));
        AudioCommand::RegisterSample { id, buffer }
    }

    // Store a decoded user sound under a fresh id and point the pad at it
    pub fn register_custom(&mut self, buffer: SampleBuffer, pad: &mut Pad) -> AudioCommand {
        let id = next_custom_id();
        let buffer = Arc::new(buffer);
        self.entries.insert(id, Arc::clone(&buffer));
        pad.sound_id = id;
        pad.has_custom_sound = true;
        AudioCommand::RegisterSample { id, buffer }
    }

    // None when nothing is registered under the id: playing it is a no-op
    pub fn play(&self, id: SoundId) -> Option<AudioCommand> {
        self.entries.contains_key(&id).then_some(AudioCommand::Play(id))
    }

    #[cfg(test)]
    pub fn contains(&self, id: SoundId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
