use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CUSTOM: AtomicU64 = AtomicU64::new(0);

// Key into the audio bank. Default tones are keyed by note, so rebuilding a
// grid lands on the same ids; custom sounds always get a fresh number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    Default(u8),
    Custom(u64),
}

impl SoundId {
    pub fn default_for(note: u8) -> Self {
        SoundId::Default(note)
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundId::Default(note) => write!(f, "default-{note}"),
            SoundId::Custom(n) => write!(f, "custom-{n}"),
        }
    }
}

// fancy atomic counter lets us generate unique ids from the decode thread too
pub fn next_custom_id() -> SoundId {
    SoundId::Custom(NEXT_CUSTOM.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_ids_are_never_reused() {
        let a = next_custom_id();
        let b = next_custom_id();
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn string_forms() {
        assert_eq!(SoundId::default_for(36).to_string(), "default-36");
        assert_eq!(SoundId::Custom(7).to_string(), "custom-7");
    }
}
