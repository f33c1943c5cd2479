//! Test file list widget

use ratatui::{
    prelude::*,
    widgets::{Block, StatefulWidget, Widget},
};

use crate::model::TestFile;

/// State for file list widget
#[derive(Default)]
pub struct FileListState {
    pub selected: Option<usize>,
    pub offset: usize,
}

impl FileListState {
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }
}

/// Filtered test files with their best coverage level
pub struct FileList<'a> {
    files: &'a [&'a TestFile],
    block: Option<Block<'a>>,
    highlight_style: Style,
}

impl<'a> FileList<'a> {
    pub fn new(files: &'a [&'a TestFile]) -> Self {
        Self {
            files,
            block: None,
            highlight_style: Style::default().bg(Color::DarkGray),
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }
}

impl<'a> StatefulWidget for FileList<'a> {
    type State = FileListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner_area = match self.block {
            Some(b) => {
                let inner = b.inner(area);
                b.render(area, buf);
                inner
            }
            None => area,
        };

        if self.files.is_empty() {
            buf.set_string(
                inner_area.x + 1,
                inner_area.y,
                "No test files match",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        // Each file takes two lines
        let visible = (inner_area.height as usize / 2).max(1);

        if let Some(selected) = state.selected {
            if selected < state.offset {
                state.offset = selected;
            } else if selected >= state.offset + visible {
                state.offset = selected + 1 - visible;
            }
        }

        for (i, file) in self.files.iter().skip(state.offset).take(visible).enumerate() {
            let y = inner_area.y + (i * 2) as u16;
            let is_selected = state.selected == Some(state.offset + i);
            let mut x = inner_area.x;

            if is_selected {
                buf.set_string(x, y, ">", Style::default().fg(Color::Cyan));
            }
            x += 2;

            let best = file.tests.iter().map(|t| t.coverage).max().unwrap_or_default();
            buf.set_string(x, y, best.symbol(), Style::default().fg(best.color()));
            x += 2;

            let name_style = if is_selected {
                self.highlight_style
            } else {
                Style::default()
            };
            let width = inner_area.right().saturating_sub(x) as usize;
            buf.set_stringn(x, y, &file.name, width, name_style);

            let meta = format!("{} · {} tests", file.test_type.label(), file.tests.len());
            let meta_x = inner_area.x + 4;
            let meta_width = inner_area.right().saturating_sub(meta_x) as usize;
            if y + 1 < inner_area.bottom() {
                buf.set_stringn(meta_x, y + 1, &meta, meta_width, Style::default().fg(Color::DarkGray));
            }
        }
    }
}
