// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Library browser widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::library::SheetLibrary;

/// Widget listing folders and their sheets
pub struct LibraryWidget<'a> {
    library: &'a SheetLibrary,
    selected: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> LibraryWidget<'a> {
    /// Create a new library widget
    pub fn new(library: &'a SheetLibrary) -> Self {
        Self {
            library,
            selected: None,
            block: None,
        }
    }

    /// Set selected sheet index (library order)
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn rows(&self) -> (Vec<Line<'static>>, Option<usize>) {
        let mut rows = Vec::new();
        let mut selected_row = None;
        let mut index = 0;

        for folder in self.library.folders() {
            rows.push(Line::from(Span::styled(
                folder.name(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )));
            for sheet in &folder.sheets {
                let is_selected = self.selected == Some(index);
                if is_selected {
                    selected_row = Some(rows.len());
                }
                let style = if is_selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut spans = vec![Span::styled(format!(" {}", sheet.title), style)];
                if !sheet.artist.is_empty() {
                    spans.push(Span::styled(
                        format!(" - {}", sheet.artist),
                        Style::default().fg(Color::Gray),
                    ));
                }
                rows.push(Line::from(spans));
                index += 1;
            }
        }

        (rows, selected_row)
    }
}

impl Widget for LibraryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (rows, selected_row) = self.rows();

        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.library.is_empty() && self.library.folders().len() <= 1 {
            Paragraph::new(format!(
                "No .{} sheets in {}",
                self.library.extension(),
                self.library.root().display()
            ))
            .style(Style::default().fg(Color::DarkGray))
            .render(area, buf);
            return;
        }

        let height = area.height as usize;
        let scroll = match selected_row {
            Some(row) if row >= height => row + 1 - height,
            _ => 0,
        };

        let visible: Vec<Line> = rows.into_iter().skip(scroll).take(height).collect();
        Paragraph::new(visible).render(area, buf);
    }
}
