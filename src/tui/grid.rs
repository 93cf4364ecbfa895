use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::Frame;

use crate::shared::{DisplayState, PadId, PadView};

// Draws every pad and returns where each one landed, for mouse hit-testing
pub fn draw_pad_grid(frame: &mut Frame, area: Rect, state: &DisplayState) -> Vec<(Rect, PadId)> {
    let rows = state.rows.max(1) as u32;
    let cols = state.cols.max(1) as u32;
    let row_areas = Layout::vertical((0..rows).map(|_| Constraint::Ratio(1, rows))).split(area);

    let mut hits = Vec::with_capacity(state.pads.len());
    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let col_areas = Layout::horizontal((0..cols).map(|_| Constraint::Ratio(1, cols))).split(*row_area);
        for (col_idx, cell_area) in col_areas.iter().enumerate() {
            let Some(pad) = state
                .pads
                .iter()
                .find(|p| p.row as usize == row_idx && p.col as usize == col_idx)
            else {
                continue;
            };
            draw_pad(frame, *cell_area, pad);
            hits.push((*cell_area, pad.id));
        }
    }
    hits
}

fn draw_pad(frame: &mut Frame, area: Rect, pad: &PadView) {
    let (r, g, b) = pad.color.to_rgb();
    let fill = Color::Rgb(r, g, b);
    let ink = if pad.color.luminance() > 0.55 { Color::Black } else { Color::White };

    let border = if pad.pressed {
        BorderType::Thick
    } else if pad.lit {
        BorderType::Double
    } else {
        BorderType::Rounded
    };
    let mut style = Style::default().bg(fill).fg(ink);
    if pad.lit {
        style = style.add_modifier(Modifier::BOLD);
    }

    let mut lines = vec![Line::from(format!("{}", pad.note))];
    if let Some(label) = pad.label {
        lines.push(Line::from(label));
    }
    if pad.custom {
        lines.push(Line::from("♪"));
    }

    let block = Block::bordered().border_type(border).style(style);
    let text = Paragraph::new(Text::from(lines)).alignment(Alignment::Center).block(block);
    frame.render_widget(text, area);
}
