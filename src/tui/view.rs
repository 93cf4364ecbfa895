use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::grid::draw_pad_grid;
use super::mode::TuiState;
use crate::shared::{AssignView, DisplayState};

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &mut TuiState) {
    let banner = if state.error.is_some() { 1 } else { 0 };
    let sections = Layout::vertical([
        Constraint::Length(3), // selectors
        Constraint::Length(banner), // error slot
        Constraint::Min(6), // pad grid
        Constraint::Length(1), // key help
    ])
    .split(area);

    draw_selectors(frame, sections[0], state);
    if let Some(error) = &state.error {
        draw_error(frame, sections[1], error);
    }
    ts.pad_areas = draw_pad_grid(frame, sections[2], state);
    draw_help(frame, sections[3]);

    if let Some(assign) = &state.assign {
        draw_assign_modal(frame, area, assign);
    }
}

fn draw_selectors(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cells = Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1), Constraint::Fill(1)]).split(area);
    let selector = |title: &'static str, value: String| {
        Paragraph::new(value)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(title))
    };
    frame.render_widget(selector(" MIDI [m] ", state.midi_label.clone()), cells[0]);
    frame.render_widget(selector(" Colors [p] ", state.color_scheme.tag().to_string()), cells[1]);
    frame.render_widget(selector(" Grid [g] ", state.grid_size.tag()), cells[2]);
}

fn draw_error(frame: &mut Frame, area: Rect, error: &str) {
    let line = Line::from(vec![
        Span::styled(" ! ", Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(error.to_string(), Style::default().fg(Color::LightRed)),
        Span::styled("  [h] hide", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = "click: play   hold/right-click: assign sound   1-4 q-r a-f z-v: play   esc: quit";
    frame.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), area);
}

fn draw_assign_modal(frame: &mut Frame, area: Rect, assign: &AssignView) {
    let [modal] = Layout::horizontal([Constraint::Percentage(70)]).flex(Flex::Center).areas(area);
    let [modal] = Layout::vertical([Constraint::Length(9)]).flex(Flex::Center).areas(modal);

    let status = if assign.decoding { "decoding…" } else { "enter: load   esc: cancel" };
    let lines = vec![
        Line::from(format!("Pad {} (note {}) plays {}", assign.pad.0, assign.note, assign.current_sound)),
        Line::from(""),
        Line::from("Audio file path:"),
        Line::from(Span::styled(
            format!("{}_", assign.path_input),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(status, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Assign sound ")),
        modal,
    );
}
