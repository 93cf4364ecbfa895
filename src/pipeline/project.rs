// The pad state store: one explicit struct the middle layer mutates and the
// TUI reads a snapshot of. Nothing here is persisted.

use crate::audio::SoundId;
use crate::midi::MidiDevice;
use crate::pipeline::color::{pad_color, PadColor};
use crate::shared::{ColorScheme, GridSize, PadId};

// One triggerable cell
#[derive(Clone, Debug)]
pub struct Pad {
    pub id: PadId, // linear index in trigger order
    pub note: u8,
    pub row: u16, // visual, 0 = top
    pub col: u16,
    pub sound_id: SoundId,
    pub has_custom_sound: bool,
    pub is_pressed: bool, // trigger physically held
    pub is_active: bool, // lit; outlives is_pressed by the decay
    pub color: PadColor,
}

impl Pad {
    pub fn new(id: PadId, note: u8, row: u16, col: u16, scheme: ColorScheme) -> Self {
        Self {
            id,
            note,
            row,
            col,
            sound_id: SoundId::default_for(note),
            has_custom_sound: false,
            is_pressed: false,
            is_active: false,
            color: pad_color(note, row, col, scheme),
        }
    }

    pub fn recolor(&mut self, scheme: ColorScheme) {
        self.color = pad_color(self.note, self.row, self.col, scheme);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    pub color_scheme: ColorScheme,
    pub grid_size: GridSize,
    pub selected_input_id: Option<String>,
}

// Sound (re)assignment modal
#[derive(Clone, Debug, PartialEq)]
pub struct AssignRequest {
    pub pad: PadId,
    pub path_input: String,
    pub decoding: bool, // a submitted file is still being decoded
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Configuration,
    pub pads: Vec<Pad>, // indexed by PadId
    pub devices: Vec<MidiDevice>,
    pub midi_available: bool,
    pub error: Option<String>, // latest error wins
    pub assign: Option<AssignRequest>,
    pub generation: u64, // bumped on every grid rebuild
}

impl AppState {
    pub fn new(config: Configuration) -> Self {
        Self {
            pads: super::grid::build_grid(config.grid_size, config.color_scheme),
            config,
            devices: Vec::new(),
            midi_available: false,
            error: None,
            assign: None,
            generation: 0,
        }
    }

    pub fn pad(&self, id: PadId) -> Option<&Pad> {
        self.pads.get(id.0 as usize)
    }

    pub fn pad_mut(&mut self, id: PadId) -> Option<&mut Pad> {
        self.pads.get_mut(id.0 as usize)
    }

    pub fn pad_for_note(&self, note: u8) -> Option<PadId> {
        self.pads.iter().find(|p| p.note == note).map(|p| p.id)
    }

    #[cfg(test)]
    pub fn pad_at(&self, row: u16, col: u16) -> Option<PadId> {
        self.pads.iter().find(|p| p.row == row && p.col == col).map(|p| p.id)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.error = Some(message);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}
