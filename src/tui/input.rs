use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use super::mode::TuiState;
use crate::pipeline::grid::trigger_index;
use crate::shared::{InputEvent, PadId};

// poll for input from tui, resolves keys and mouse clicks into semantic
// input events for the middle layer
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    let events = match event::read()? {
        Event::Key(key) => handle_key(key, ts),
        Event::Mouse(mouse) => handle_mouse(mouse, ts),
        Event::FocusLost => vec![InputEvent::PointerReleased], // pointer left the window
        _ => vec![],
    };
    Ok(events)
}

fn handle_key(key: KeyEvent, ts: &TuiState) -> Vec<InputEvent> {
    if key.kind == KeyEventKind::Repeat {
        return vec![];
    }
    let pressed = key.kind == KeyEventKind::Press;

    // the modal swallows the keyboard
    if ts.assign_open {
        if !pressed {
            return vec![];
        }
        return match key.code {
            KeyCode::Esc => vec![InputEvent::AssignCancel],
            KeyCode::Enter => vec![InputEvent::AssignSubmit],
            KeyCode::Backspace => vec![InputEvent::AssignBackspace],
            KeyCode::Char(c) => vec![InputEvent::AssignChar(c)],
            _ => vec![],
        };
    }

    match key.code {
        // any keys on the 4x4 key block
        KeyCode::Char(c) if char_to_cell(c).is_some() => {
            let Some(pad) = char_to_cell(c).and_then(|(row, col)| cell_to_pad(row, col, ts)) else {
                return vec![];
            };
            match (pressed, ts.key_release) {
                (true, true) => vec![InputEvent::PadDown(pad)],
                (false, true) => vec![InputEvent::PadUp(pad)],
                // no release events coming, so tap
                (true, false) => vec![InputEvent::PadDown(pad), InputEvent::PadUp(pad)],
                (false, false) => vec![],
            }
        }
        _ if !pressed => vec![],
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char('p') => vec![InputEvent::CycleColorScheme],
        KeyCode::Char('g') => vec![InputEvent::CycleGridSize],
        KeyCode::Char('m') => vec![InputEvent::CycleMidiInput],
        KeyCode::Char('h') => vec![InputEvent::DismissError],
        _ => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent, ts: &TuiState) -> Vec<InputEvent> {
    // pads under the modal stay out of reach, but a held pad still lets go
    if ts.assign_open {
        return match mouse.kind {
            MouseEventKind::Up(MouseButton::Left) => vec![InputEvent::PointerReleased],
            _ => vec![],
        };
    }
    let pad = ts.pad_at(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => pad.map(InputEvent::PointerDown).into_iter().collect(),
        MouseEventKind::Down(MouseButton::Right) => pad.map(InputEvent::PadContext).into_iter().collect(),
        MouseEventKind::Up(MouseButton::Left) => vec![InputEvent::PointerReleased],
        _ => vec![],
    }
}

// key -> visual (row, col) of the top-left 4x4 block
fn char_to_cell(c: char) -> Option<(u16, u16)> {
    let cell = match c {
        '1' => (0, 0), '2' => (0, 1), '3' => (0, 2), '4' => (0, 3),
        'q' => (1, 0), 'w' => (1, 1), 'e' => (1, 2), 'r' => (1, 3),
        'a' => (2, 0), 's' => (2, 1), 'd' => (2, 2), 'f' => (2, 3),
        'z' => (3, 0), 'x' => (3, 1), 'c' => (3, 2), 'v' => (3, 3),
        _ => return None,
    };
    Some(cell)
}

fn cell_to_pad(row: u16, col: u16, ts: &TuiState) -> Option<PadId> {
    if row >= ts.rows || col >= ts.cols {
        return None;
    }
    Some(PadId(trigger_index(ts.rows, ts.cols, row, col)))
}
