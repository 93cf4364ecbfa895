// The input plan:
//
// Pads:
//   mouse left down on a pad     //  PointerDown(pad)
//   mouse left up anywhere       //  PointerReleased (releases every held pad)
//   mouse left held for 800ms    //  opens the sound assignment modal for that pad
//   mouse right down on a pad    //  PadContext(pad), opens the modal without playing
//   1 2 3 4                      //  PadDown / PadUp on the top visual row, left to right
//   q w e r                      //  ... second visual row
//   a s d f                      //  ... third visual row
//   z x c v                      //  ... fourth visual row
//
// Selectors:
//   p             //  CycleColorScheme
//   g             //  CycleGridSize
//   m             //  CycleMidiInput (none -> each device -> none)
//   h             //  DismissError (hides the error banner)
//
// Assignment modal (while open, every key goes here):
//   printable     //  AssignChar
//   Backspace     //  AssignBackspace
//   Enter         //  AssignSubmit
//   Esc           //  AssignCancel
//
// Quit:
//   Esc           //  Quit
//
// The rendering process is the same as ever: the middle layer owns every bit
// of state, and each frame the TUI asks `middle.display_state()` for a
// `DisplayState` and draws exactly that.

use std::fmt;
use std::time::Duration;

use crate::midi::NoteEvent;
use crate::pipeline::color::PadColor;

pub const LOWEST_NOTE: u8 = 36;
pub const DECAY: Duration = Duration::from_millis(100);
pub const LONG_PRESS: Duration = Duration::from_millis(800);

// ye olde types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadId(pub u16);

impl fmt::Display for PadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pad {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Rainbow,
    MusicTheory,
    Checkerboard,
    NeonGlow,
    Mpc,
    Midnight,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        ColorScheme::Rainbow,
        ColorScheme::MusicTheory,
        ColorScheme::Checkerboard,
        ColorScheme::NeonGlow,
        ColorScheme::Mpc,
        ColorScheme::Midnight,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn tag(self) -> &'static str {
        match self {
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::MusicTheory => "music-theory",
            ColorScheme::Checkerboard => "checkerboard",
            ColorScheme::NeonGlow => "neon-glow",
            ColorScheme::Mpc => "mpc",
            ColorScheme::Midnight => "midnight",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GridSize {
    G3x3,
    #[default]
    G4x4,
    G5x5,
    G6x6,
    G7x7,
    G8x8,
    G12x2,
}

impl GridSize {
    pub const ALL: [GridSize; 7] = [
        GridSize::G3x3,
        GridSize::G4x4,
        GridSize::G5x5,
        GridSize::G6x6,
        GridSize::G7x7,
        GridSize::G8x8,
        GridSize::G12x2,
    ];

    // (rows, cols)
    pub fn dims(self) -> (u16, u16) {
        match self {
            GridSize::G3x3 => (3, 3),
            GridSize::G4x4 => (4, 4),
            GridSize::G5x5 => (5, 5),
            GridSize::G6x6 => (6, 6),
            GridSize::G7x7 => (7, 7),
            GridSize::G8x8 => (8, 8),
            GridSize::G12x2 => (12, 2),
        }
    }

    pub fn pad_count(self) -> usize {
        let (rows, cols) = self.dims();
        rows as usize * cols as usize
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|g| *g == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn tag(self) -> String {
        let (rows, cols) = self.dims();
        format!("{rows}x{cols}")
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase().replace('×', "x");
        Self::ALL.into_iter().find(|g| g.tag() == tag)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // pads
    PointerDown(PadId), // left button on a pad; may become a long press
    PadDown(PadId),
    PadUp(PadId),
    PointerReleased, // left button came up, wherever it was
    PadContext(PadId), // right click
    Midi(NoteEvent),

    // selectors
    CycleColorScheme,
    CycleGridSize,
    CycleMidiInput,
    DismissError,

    // assignment modal
    AssignChar(char),
    AssignBackspace,
    AssignSubmit,
    AssignCancel,

    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub rows: u16,
    pub cols: u16,
    pub pads: Vec<PadView>, // ordered by id, i.e. trigger order
    pub color_scheme: ColorScheme,
    pub grid_size: GridSize,
    pub midi_label: String, // selected device name, "none", or "unavailable"
    pub error: Option<String>,
    pub assign: Option<AssignView>,
}

#[derive(Clone, Debug)]
pub struct PadView {
    pub id: PadId,
    pub note: u8,
    pub row: u16,
    pub col: u16,
    pub color: PadColor, // glow color while lit, base color otherwise
    pub pressed: bool,
    pub lit: bool,
    pub custom: bool,
    pub label: Option<&'static str>, // interval name under music-theory
}

#[derive(Clone, Debug)]
pub struct AssignView {
    pub pad: PadId,
    pub note: u8,
    pub path_input: String,
    pub current_sound: String,
    pub decoding: bool,
}

