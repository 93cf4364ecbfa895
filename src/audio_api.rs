use std::sync::Arc;

use crate::audio::{SampleBuffer, SoundId};

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't decode or synthesize (that would stall the audio
    // thread), so buffers are built up front and handed over here first
    RegisterSample { id: SoundId, buffer: Arc<SampleBuffer> },

    // The engine then uses the sound id to start a one-shot
    Play(SoundId),
}
