// Channel-voice note messages only. Everything else, including running
// status and system messages, decodes to nothing.

/// A note trigger, independent of channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    Press { note: u8, velocity: u8 },
    Release { note: u8 },
}

impl NoteEvent {
    pub fn note(&self) -> u8 {
        match *self {
            NoteEvent::Press { note, .. } | NoteEvent::Release { note } => note,
        }
    }
}

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// Decode one raw message. Note-on with velocity 0 is a release.
pub fn decode(message: &[u8]) -> Option<NoteEvent> {
    let &[status, note, velocity, ..] = message else {
        return None;
    };
    match status & 0xF0 {
        NOTE_ON if velocity > 0 => Some(NoteEvent::Press { note, velocity }),
        NOTE_ON | NOTE_OFF => Some(NoteEvent::Release { note }),
        _ => None,
    }
}
