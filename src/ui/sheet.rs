// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sheet display widget with the follow-mode cursor.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::playback::{LineView, SheetView};
use crate::sheet::{Token, INVISIBLE_JOINER};

/// Widget drawing every line of the open sheet
pub struct SheetWidget<'a> {
    view: &'a SheetView,
    scroll: usize,
    block: Option<Block<'a>>,
}

impl<'a> SheetWidget<'a> {
    /// Create a new sheet widget
    pub fn new(view: &'a SheetView) -> Self {
        Self {
            view,
            scroll: 0,
            block: None,
        }
    }

    /// First line to draw
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for SheetWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.view.lines.is_empty() {
            Paragraph::new("No sheet open")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        // Lines above the cursor are done; at the end everything is
        let played_until = self.view.cursor_line.unwrap_or(self.view.lines.len());

        let lines: Vec<Line> = self
            .view
            .lines
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .map(|line| sheet_line(line, line.index < played_until))
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}

/// First line to draw so the cursor stays on screen, a third from the top
pub fn scroll_offset(view: &SheetView, height: u16) -> usize {
    let height = height as usize;
    let Some(cursor) = view.cursor_line else {
        return view.lines.len().saturating_sub(height);
    };
    if height == 0 || view.lines.len() <= height {
        return 0;
    }
    cursor
        .saturating_sub(height / 3)
        .min(view.lines.len() - height)
}

fn sheet_line(line: &LineView, played: bool) -> Line<'static> {
    if line.is_directive() {
        return Line::from(Span::styled(
            line.text.clone(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let base = if played {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let Some(highlight) = line.highlight else {
        return Line::from(
            line.tokens
                .iter()
                .map(|t| Span::styled(display_text(t), token_style(t, base)))
                .collect::<Vec<_>>(),
        );
    };

    let spans = line
        .tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let style = if i < highlight.token {
                Style::default().fg(Color::DarkGray)
            } else if i == highlight.token {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                token_style(t, Style::default().fg(Color::White))
            };
            Span::styled(display_text(t), style)
        })
        .collect::<Vec<_>>();

    Line::from(spans)
}

fn token_style(token: &Token, base: Style) -> Style {
    if token.is_chord() && base.fg == Some(Color::White) {
        base.fg(Color::Cyan)
    } else {
        base
    }
}

/// Literal text with invisible filler shown as a space, one column per char
fn display_text(token: &Token) -> String {
    token
        .literal()
        .chars()
        .map(|c| if c == INVISIBLE_JOINER { ' ' } else { c })
        .collect()
}
