//! View canvases: tree diagram, force graph and heatmap grid
//!
//! Positions are laid out in world units and mapped to terminal cells
//! relative to the canvas' inner area before the viewport transform applies.

use ratatui::{
    prelude::*,
    widgets::{Block, Widget},
};

use crate::render::flow::ForceSimulation;
use crate::render::heatmap::{level_color, Heatmap};
use crate::render::tree::TreeView;
use crate::render::viewport::{GraphViewport, TransformViewport, Viewport};

/// World units per terminal column and row
pub const TREE_CELL: (f64, f64) = (10.0, 25.0);
pub const FLOW_CELL: (f64, f64) = (6.0, 12.0);

pub fn tree_to_cell(viewport: &TransformViewport, (x, y): (f64, f64)) -> (f64, f64) {
    viewport.to_screen((x / TREE_CELL.0, y / TREE_CELL.1))
}

pub fn flow_to_cell(viewport: &GraphViewport, size: (u16, u16), (x, y): (f64, f64)) -> (f64, f64) {
    viewport.to_screen((
        x / FLOW_CELL.0 + size.0 as f64 / 2.0,
        y / FLOW_CELL.1 + size.1 as f64 / 2.0,
    ))
}

pub fn cell_to_flow(viewport: &GraphViewport, size: (u16, u16), cell: (f64, f64)) -> (f64, f64) {
    let (bx, by) = viewport.to_world(cell);
    (
        (bx - size.0 as f64 / 2.0) * FLOW_CELL.0,
        (by - size.1 as f64 / 2.0) * FLOW_CELL.1,
    )
}

fn inner(block: Option<Block<'_>>, area: Rect, buf: &mut Buffer) -> Rect {
    match block {
        Some(b) => {
            let inner = b.inner(area);
            b.render(area, buf);
            inner
        }
        None => area,
    }
}

/// Draw text at a cell position, clipped to `area`
fn plot(buf: &mut Buffer, area: Rect, (cx, cy): (f64, f64), text: &str, style: Style) {
    let (col, row) = (cx.round(), cy.round());
    if row < 0.0 || col < 0.0 || row >= area.height as f64 || col >= area.width as f64 {
        return;
    }
    let x = area.x + col as u16;
    let y = area.y + row as u16;
    buf.set_stringn(x, y, text, area.right().saturating_sub(x) as usize, style);
}

fn line(buf: &mut Buffer, area: Rect, from: (f64, f64), to: (f64, f64), style: Style) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().min(2000.0) as usize;
    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
        let p = (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        plot(buf, area, p, "·", style);
    }
}

pub struct TreeCanvas<'a> {
    view: &'a TreeView,
    viewport: &'a TransformViewport,
    block: Option<Block<'a>>,
}

impl<'a> TreeCanvas<'a> {
    pub fn new(view: &'a TreeView, viewport: &'a TransformViewport) -> Self {
        Self {
            view,
            viewport,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for TreeCanvas<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = inner(self.block, area, buf);

        match self.view {
            TreeView::Diagram(layout) => {
                let edge_style = Style::default().fg(Color::DarkGray);
                for &(parent, child) in &layout.edges {
                    let (p, c) = (&layout.nodes[parent], &layout.nodes[child]);
                    line(
                        buf,
                        area,
                        tree_to_cell(self.viewport, (p.x, p.y)),
                        tree_to_cell(self.viewport, (c.x, c.y)),
                        edge_style,
                    );
                }
                for node in &layout.nodes {
                    let (cx, cy) = tree_to_cell(self.viewport, (node.x, node.y));
                    let color = node.coverage.color();
                    plot(buf, area, (cx, cy), "●", Style::default().fg(color));
                    plot(buf, area, (cx + 2.0, cy), &node.name, Style::default().fg(color));
                }
            }
            TreeView::Fallback { boxes, error } => {
                plot(
                    buf,
                    area,
                    (0.0, 0.0),
                    &format!("⚠ {} (nested view)", error),
                    Style::default().fg(Color::Yellow),
                );
                for (i, (depth, node)) in boxes.flatten().iter().enumerate() {
                    let text = format!("{}▣ {}", "│ ".repeat(*depth), node.name);
                    plot(
                        buf,
                        area,
                        (1.0, i as f64 + 2.0),
                        &text,
                        Style::default().fg(node.coverage.color()),
                    );
                }
            }
        }
    }
}

pub struct FlowCanvas<'a> {
    sim: &'a ForceSimulation,
    viewport: &'a GraphViewport,
    block: Option<Block<'a>>,
}

impl<'a> FlowCanvas<'a> {
    pub fn new(sim: &'a ForceSimulation, viewport: &'a GraphViewport) -> Self {
        Self {
            sim,
            viewport,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for FlowCanvas<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = inner(self.block, area, buf);
        let size = (area.width, area.height);
        let at = |x: f64, y: f64| flow_to_cell(self.viewport, size, (x, y));

        for link in &self.sim.links {
            let (s, t) = (&self.sim.nodes[link.source], &self.sim.nodes[link.target]);
            line(buf, area, at(s.x, s.y), at(t.x, t.y), Style::default().fg(Color::DarkGray));
        }
        for (i, node) in self.sim.nodes.iter().enumerate() {
            let (cx, cy) = at(node.x, node.y);
            let mut style = Style::default().fg(node.coverage.color());
            if self.sim.dragging() == Some(i) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            plot(buf, area, (cx, cy), "◉", style);
            plot(buf, area, (cx + 2.0, cy), &node.name, style);
        }
    }
}

pub struct HeatmapGrid<'a> {
    heatmap: &'a Heatmap,
    block: Option<Block<'a>>,
}

impl<'a> HeatmapGrid<'a> {
    pub fn new(heatmap: &'a Heatmap) -> Self {
        Self {
            heatmap,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

const LABEL_WIDTH: u16 = 26;
const CELL_WIDTH: u16 = 3;

impl<'a> Widget for HeatmapGrid<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = inner(self.block, area, buf);
        let heatmap = self.heatmap;
        let header = Style::default().fg(Color::DarkGray);

        // Column numbers, names listed in the legend below the grid
        for col in 0..heatmap.columns.len() {
            let x = (LABEL_WIDTH + col as u16 * CELL_WIDTH) as f64;
            plot(buf, area, (x, 0.0), &format!("{:02}", col + 1), header);
        }

        if heatmap.is_empty() {
            plot(buf, area, (0.0, 2.0), "No test files match the filters", header);
        }

        for (row, name) in heatmap.rows.iter().enumerate() {
            let y = row as f64 + 1.0;
            let label: String = name.chars().take(LABEL_WIDTH as usize - 1).collect();
            plot(buf, area, (0.0, y), &label, Style::default());

            for col in 0..heatmap.columns.len() {
                let (r, g, b) = level_color(heatmap.value(row, col).unwrap_or(0));
                let x = (LABEL_WIDTH + col as u16 * CELL_WIDTH) as f64;
                plot(buf, area, (x, y), "██", Style::default().fg(Color::Rgb(r, g, b)));
            }
        }

        let legend_top = heatmap.rows.len().max(1) as f64 + 2.0;
        let column_width = 28.0;
        let per_column = (area.height as f64 - legend_top).max(1.0) as usize;
        for (i, name) in heatmap.columns.iter().enumerate() {
            let x = (i / per_column) as f64 * column_width;
            let y = legend_top + (i % per_column) as f64;
            plot(buf, area, (x, y), &format!("{:02} {}", i + 1, name), header);
        }
    }
}
