// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Follow-mode status widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::playback::PlayerStatus;

/// Values shown in the status widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub title: Option<String>,
    pub status: PlayerStatus,
    pub playing: bool,
    pub noob_mode: bool,
    pub transpose: i32,
    /// Notes of a half-pressed chord
    pub pending: Option<String>,
}

/// Status widget for displaying follow-mode state
pub struct StatusWidget<'a> {
    info: &'a StatusInfo,
    block: Option<Block<'a>>,
}

impl<'a> StatusWidget<'a> {
    /// Create a new status widget
    pub fn new(info: &'a StatusInfo) -> Self {
        Self { info, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for StatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(10), // Play state
                Constraint::Length(2),  // Spacer
                Constraint::Length(14), // Transpose
                Constraint::Length(2),  // Spacer
                Constraint::Length(6),  // Noob
                Constraint::Length(2),  // Spacer
                Constraint::Length(14), // Pending chord
                Constraint::Min(0),     // Title
            ])
            .split(area);

        let (indicator, style) = play_indicator(self.info);
        Paragraph::new(indicator).style(style).render(chunks[0], buf);

        Paragraph::new(format!("Transpose {:+}", self.info.transpose))
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[2], buf);

        if self.info.noob_mode {
            Paragraph::new("NOOB")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .render(chunks[4], buf);
        }

        if let Some(pending) = &self.info.pending {
            Paragraph::new(format!("[{}]", pending))
                .style(Style::default().fg(Color::Cyan))
                .render(chunks[6], buf);
        }

        if let Some(title) = &self.info.title {
            Paragraph::new(title.as_str())
                .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                .render(chunks[7], buf);
        }
    }
}

fn play_indicator(info: &StatusInfo) -> (&'static str, Style) {
    match (info.status, info.playing) {
        (PlayerStatus::Idle, _) => ("- IDLE", Style::default().fg(Color::DarkGray)),
        (PlayerStatus::End, _) => ("■ END", Style::default().fg(Color::Blue)),
        (PlayerStatus::AwaitingToken, true) => (
            "▶ PLAY",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        (PlayerStatus::AwaitingToken, false) => ("‖ PAUSE", Style::default().fg(Color::Yellow)),
    }
}
