//! Pad colors per scheme, plus the brighter "glow" shown while a pad is lit.

use std::fmt;

use crate::shared::ColorScheme;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PadColor {
    Hsl { h: u16, s: u8, l: u8 },
    Hex { r: u8, g: u8, b: u8 },
    Rgba { r: u8, g: u8, b: u8, a: f32 },
}

const fn hex(rgb: u32) -> PadColor {
    PadColor::Hex { r: (rgb >> 16) as u8, g: (rgb >> 8) as u8, b: rgb as u8 }
}

const ROOT: PadColor = hex(0xFF5252);
const FOURTH: PadColor = hex(0x448AFF);
const FIFTH: PadColor = hex(0x69F0AE);
const OTHER: PadColor = hex(0x9E9E9E);
const CHECK_EVEN: PadColor = hex(0x212121);
const CHECK_ODD: PadColor = hex(0x616161);
const MPC: PadColor = hex(0x424242);
const MIDNIGHT: [PadColor; 8] = [
    hex(0x1A237E),
    hex(0x283593),
    hex(0x3949AB),
    hex(0x5C6BC0),
    hex(0x4A148C),
    hex(0x6A1B9A),
    hex(0x311B92),
    hex(0x512DA8),
];

const GLOW_OFFSET: (u8, u8, u8) = (50, 50, 100);
const GLOW_ALPHA: f32 = 0.6;

pub fn pad_color(note: u8, row: u16, col: u16, scheme: ColorScheme) -> PadColor {
    let note_value = (note % 12) as u16;
    match scheme {
        ColorScheme::Rainbow => PadColor::Hsl { h: (note_value * 30 + row * 15) % 360, s: 85, l: 65 },
        ColorScheme::MusicTheory => match note_value {
            0 => ROOT,
            5 => FOURTH,
            7 => FIFTH,
            _ => OTHER,
        },
        ColorScheme::Checkerboard => {
            if (row + col) % 2 == 0 { CHECK_EVEN } else { CHECK_ODD }
        }
        ColorScheme::NeonGlow => PadColor::Hsl { h: (note_value * 30) % 360, s: 100, l: 65 },
        ColorScheme::Mpc => MPC,
        ColorScheme::Midnight => MIDNIGHT[(note_value as usize + row as usize * 2) % MIDNIGHT.len()],
    }
}

// Interval name shown on music-theory pads
pub fn note_label(note: u8, scheme: ColorScheme) -> Option<&'static str> {
    if scheme != ColorScheme::MusicTheory {
        return None;
    }
    match note % 12 {
        0 => Some("Root"),
        5 => Some("4th"),
        7 => Some("5th"),
        _ => None,
    }
}

pub fn glow_color(color: PadColor, scheme: ColorScheme) -> PadColor {
    match color {
        PadColor::Hex { r, g, b } if scheme == ColorScheme::Midnight => PadColor::Rgba {
            r: r.saturating_add(GLOW_OFFSET.0),
            g: g.saturating_add(GLOW_OFFSET.1),
            b: b.saturating_add(GLOW_OFFSET.2),
            a: GLOW_ALPHA,
        },
        PadColor::Hsl { h, .. } => PadColor::Hsl { h, s: 100, l: 70 },
        other => other,
    }
}

impl PadColor {
    /// Opaque RGB for the terminal. Translucent colors are composited over black.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            PadColor::Hex { r, g, b } => (r, g, b),
            PadColor::Rgba { r, g, b, a } => {
                let a = a.clamp(0.0, 1.0);
                let scale = |c: u8| (c as f32 * a).round() as u8;
                (scale(r), scale(g), scale(b))
            }
            PadColor::Hsl { h, s, l } => hsl_to_rgb(h, s, l),
        }
    }

    pub fn luminance(self) -> f32 {
        let (r, g, b) = self.to_rgb();
        (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
    }
}

fn hsl_to_rgb(h: u16, s: u8, l: u8) -> (u8, u8, u8) {
    let h = (h % 360) as f32 / 60.0;
    let s = s.min(100) as f32 / 100.0;
    let l = l.min(100) as f32 / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

impl fmt::Display for PadColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PadColor::Hsl { h, s, l } => write!(f, "hsl({h}, {s}%, {l}%)"),
            PadColor::Hex { r, g, b } => write!(f, "#{r:02X}{g:02X}{b:02X}"),
            PadColor::Rgba { r, g, b, a } => write!(f, "rgba({r}, {g}, {b}, {a})"),
        }
    }
}
