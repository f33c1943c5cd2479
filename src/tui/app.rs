//! Coverage viewer TUI application state

use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::render::viewport::Viewport;
use crate::render::{Dashboard, ViewMode};
use crate::tui::widgets::{cell_to_flow, FileListState};

/// What a left-button drag is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    /// Panning the current view from the last cell position
    Pan { last: (u16, u16) },
    /// Moving a flow node
    Node,
}

/// TUI application state
pub struct App {
    pub dashboard: Dashboard,
    /// Directory exports are written to
    pub export_dir: PathBuf,
    pub file_list_state: FileListState,
    /// Inner area of the view canvas at the last draw
    pub canvas_area: Rect,
    pub drag: Option<DragState>,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(dashboard: Dashboard, export_dir: PathBuf) -> Self {
        let mut app = Self {
            dashboard,
            export_dir,
            file_list_state: FileListState::default(),
            canvas_area: Rect::default(),
            drag: None,
            status_message: Some("Press 1/2/3 to switch views, q to quit".to_string()),
        };
        app.report_fallback();
        app
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.drag = None;
        self.dashboard.set_view(mode);
        self.report_fallback();
    }

    pub fn cycle_view(&mut self) {
        self.set_view(self.dashboard.view().next());
    }

    pub fn cycle_coverage_filter(&mut self) {
        let mut filters = self.dashboard.filters();
        filters.cycle_coverage();
        self.apply_filters(filters);
    }

    pub fn cycle_type_filter(&mut self) {
        let mut filters = self.dashboard.filters();
        filters.cycle_test_type();
        self.apply_filters(filters);
    }

    fn apply_filters(&mut self, filters: crate::model::Filters) {
        self.dashboard.filter_tests(filters);
        self.file_list_state.select(self.dashboard.selected());
        self.status_message = Some(format!(
            "{} ({} files)",
            filters.describe(),
            self.dashboard.filtered_files().len()
        ));
        self.report_fallback();
    }

    pub fn select_next(&mut self) {
        self.dashboard.select_next();
        self.file_list_state.select(self.dashboard.selected());
    }

    pub fn select_prev(&mut self) {
        self.dashboard.select_prev();
        self.file_list_state.select(self.dashboard.selected());
    }

    pub fn refresh(&mut self) {
        self.dashboard.refresh();
        self.status_message = Some(format!(
            "Statistics recomputed: {}%",
            self.dashboard.analysis().coverage_percentage
        ));
        self.report_fallback();
    }

    pub fn export(&mut self) {
        self.status_message = Some(match self.dashboard.export_report(&self.export_dir) {
            Ok(path) => format!("✓ Exported to {}", path.display()),
            Err(e) => format!("✗ Export failed: {:#}", e),
        });
    }

    fn canvas_center(&self) -> (f64, f64) {
        (
            self.canvas_area.width as f64 / 2.0,
            self.canvas_area.height as f64 / 2.0,
        )
    }

    /// Keyboard zoom about the canvas center; `None` resets
    pub fn zoom(&mut self, direction: Option<bool>) {
        let anchor = Some(self.canvas_center());
        let viewport: &mut dyn Viewport = match self.dashboard.view() {
            ViewMode::Tree => &mut self.dashboard.tree_viewport,
            ViewMode::Flow => &mut self.dashboard.flow_viewport,
            ViewMode::Heatmap => return,
        };
        match direction {
            Some(true) => viewport.zoom_in(anchor),
            Some(false) => viewport.zoom_out(anchor),
            None => viewport.reset(),
        }
    }

    /// Cell position relative to the canvas, if inside it
    fn canvas_cell(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.canvas_area;
        let inside = column >= area.x && column < area.right() && row >= area.y && row < area.bottom();
        inside.then(|| ((column - area.x) as f64, (row - area.y) as f64))
    }

    fn canvas_size(&self) -> (u16, u16) {
        (self.canvas_area.width, self.canvas_area.height)
    }

    pub fn mouse_down(&mut self, column: u16, row: u16) {
        let Some(cell) = self.canvas_cell(column, row) else {
            return;
        };

        if self.dashboard.view() == ViewMode::Flow {
            let (x, y) = cell_to_flow(&self.dashboard.flow_viewport, self.canvas_size(), cell);
            let radius = 1.5 * crate::tui::widgets::FLOW_CELL.0 / self.dashboard.flow_viewport.zoom();
            if let Some(index) = self.dashboard.flow.node_at(x, y, radius) {
                self.dashboard.flow.drag_start(index);
                self.drag = Some(DragState::Node);
                return;
            }
        }

        if self.dashboard.view() != ViewMode::Heatmap {
            self.drag = Some(DragState::Pan { last: (column, row) });
        }
    }

    pub fn mouse_drag(&mut self, column: u16, row: u16) {
        match self.drag {
            Some(DragState::Pan { last }) => {
                let dx = column as f64 - last.0 as f64;
                let dy = row as f64 - last.1 as f64;
                match self.dashboard.view() {
                    ViewMode::Tree => self.dashboard.tree_viewport.pan_by(dx, dy),
                    ViewMode::Flow => self.dashboard.flow_viewport.pan_by(dx, dy),
                    ViewMode::Heatmap => {}
                }
                self.drag = Some(DragState::Pan { last: (column, row) });
            }
            Some(DragState::Node) => {
                let area = self.canvas_area;
                let cell = (
                    column.saturating_sub(area.x) as f64,
                    row.saturating_sub(area.y) as f64,
                );
                let (x, y) = cell_to_flow(&self.dashboard.flow_viewport, self.canvas_size(), cell);
                self.dashboard.flow.drag_to(x, y);
            }
            None => {}
        }
    }

    pub fn mouse_up(&mut self) {
        if self.drag == Some(DragState::Node) {
            self.dashboard.flow.drag_end();
        }
        self.drag = None;
    }

    /// Wheel: Ctrl+wheel zooms the tree, plain wheel zooms the graph
    pub fn scroll(&mut self, column: u16, row: u16, up: bool, ctrl: bool) {
        let Some(cell) = self.canvas_cell(column, row) else {
            return;
        };
        let viewport: &mut dyn Viewport = match self.dashboard.view() {
            ViewMode::Tree if ctrl => &mut self.dashboard.tree_viewport,
            ViewMode::Flow => &mut self.dashboard.flow_viewport,
            _ => return,
        };
        if up {
            viewport.zoom_in(Some(cell));
        } else {
            viewport.zoom_out(Some(cell));
        }
    }

    /// Advance the force simulation while it is hot
    pub fn update(&mut self) {
        if self.dashboard.view() == ViewMode::Flow && self.dashboard.flow.is_active() {
            self.dashboard.flow.tick();
        }
    }

    fn report_fallback(&mut self) {
        if self.dashboard.view() != ViewMode::Tree {
            return;
        }
        if let Some(error) = self.dashboard.tree.fallback_reason() {
            self.status_message = Some(format!("⚠ Tree diagram unavailable: {}", error));
        }
    }
}
