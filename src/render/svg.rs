//! SVG output of the three views, embedded by the HTML dashboard

use std::fmt::Write;

use super::flow::ForceSimulation;
use super::heatmap::{level_color, to_hex, Heatmap};
use super::tree::{NestedBox, TreeLayout, TreeView, NODE_SPACING};

const NODE_RADIUS: f64 = 14.0;
/// Heatmap cell size, also used by the dashboard to restack filtered rows
pub const HEATMAP_CELL: f64 = 26.0;
const CELL: f64 = HEATMAP_CELL;
const PADDING: f64 = 40.0;

/// Minimal SVG document builder
pub struct SvgCanvas {
    body: String,
    width: f64,
    height: f64,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            body: String::with_capacity(4096),
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = writeln!(
            self.body,
            "  <line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke=\"{stroke}\" stroke-width=\"1.5\"/>"
        );
    }

    /// A component node; `data-component` lets the dashboard recolor it
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, component: &str, title: &str) {
        let _ = writeln!(
            self.body,
            "  <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\" fill=\"{fill}\" stroke=\"#0f0f1a\" stroke-width=\"2\" data-component=\"{}\"><title>{}</title></circle>",
            escape_xml(component),
            escape_xml(title)
        );
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>, component: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(" stroke=\"{s}\" stroke-width=\"2\""))
            .unwrap_or_default();
        let component = component
            .map(|c| format!(" data-component=\"{}\"", escape_xml(c)))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            "  <rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" rx=\"4\" fill=\"{fill}\"{stroke}{component}/>"
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, anchor: &str, size: u32) {
        let _ = writeln!(
            self.body,
            "  <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"{anchor}\" font-size=\"{size}\" fill=\"#ddd\">{}</text>",
            escape_xml(content)
        );
    }

    pub fn finish(self, id: &str) -> String {
        let (w, h) = (self.width, self.height);
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"{id}\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.0} {h:.0}\">\n<g class=\"viewport\">\n{}</g>\n</svg>",
            self.body
        )
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn tree_svg(view: &TreeView) -> String {
    match view {
        TreeView::Diagram(layout) => diagram_svg(layout),
        TreeView::Fallback { boxes, .. } => nested_boxes_svg(boxes),
    }
}

fn diagram_svg(layout: &TreeLayout) -> String {
    let mut canvas = SvgCanvas::new(layout.width + 2.0 * PADDING, layout.height + 2.0 * PADDING);

    for &(parent, child) in &layout.edges {
        let (p, c) = (&layout.nodes[parent], &layout.nodes[child]);
        canvas.line(p.x + PADDING, p.y + PADDING, c.x + PADDING, c.y + PADDING, "#2d2d44");
    }
    for node in &layout.nodes {
        let (x, y) = (node.x + PADDING, node.y + PADDING);
        canvas.circle(x, y, NODE_RADIUS, node.coverage.hex(), &node.name, &node.name);
        canvas.text(x, y + NODE_RADIUS + 14.0, &node.name, "middle", 11);
    }

    canvas.finish("tree-svg")
}

fn nested_boxes_svg(root: &NestedBox) -> String {
    const ROW: f64 = 28.0;
    const INDENT: f64 = 18.0;

    let flat = root.flatten();
    let width = NODE_SPACING * 4.0;
    let mut canvas = SvgCanvas::new(width, flat.len() as f64 * ROW + 2.0 * PADDING);

    for (i, (depth, node)) in flat.iter().enumerate() {
        let x = PADDING / 2.0 + *depth as f64 * INDENT;
        let y = PADDING / 2.0 + i as f64 * ROW;
        canvas.rect(
            x,
            y,
            width - x - PADDING / 2.0,
            ROW - 4.0,
            "#1a1a2e",
            Some(node.coverage.hex()),
            Some(&node.name),
        );
        canvas.text(x + 8.0, y + ROW / 2.0 + 2.0, &node.name, "start", 12);
    }

    canvas.finish("tree-svg")
}

/// Snapshot of a (settled) simulation
pub fn flow_svg(sim: &ForceSimulation) -> String {
    let (x0, y0, x1, y1) = sim.bounds();
    if !x0.is_finite() {
        return SvgCanvas::new(1.0, 1.0).finish("flow-svg");
    }

    let mut canvas = SvgCanvas::new(x1 - x0 + 2.0 * PADDING, y1 - y0 + 2.0 * PADDING);
    let at = |x: f64, y: f64| (x - x0 + PADDING, y - y0 + PADDING);

    for link in &sim.links {
        let (s, t) = (&sim.nodes[link.source], &sim.nodes[link.target]);
        let (sx, sy) = at(s.x, s.y);
        let (tx, ty) = at(t.x, t.y);
        canvas.line(sx, sy, tx, ty, "#2d2d44");
    }
    for node in &sim.nodes {
        let (x, y) = at(node.x, node.y);
        canvas.circle(x, y, NODE_RADIUS * 0.7, node.coverage.hex(), &node.name, &node.name);
        canvas.text(x, y - NODE_RADIUS, &node.name, "middle", 10);
    }

    canvas.finish("flow-svg")
}

pub fn heatmap_svg(heatmap: &Heatmap) -> String {
    let label_width = 220.0;
    let header_height = 170.0;
    let mut canvas = SvgCanvas::new(
        label_width + heatmap.columns.len() as f64 * CELL + PADDING,
        header_height + heatmap.rows.len().max(1) as f64 * CELL + PADDING,
    );

    for (col, name) in heatmap.columns.iter().enumerate() {
        let x = label_width + col as f64 * CELL + CELL / 2.0;
        let _ = writeln!(
            canvas.body,
            "  <text transform=\"translate({x:.1},{:.1}) rotate(-60)\" font-size=\"10\" fill=\"#aaa\">{}</text>",
            header_height - 6.0,
            escape_xml(name)
        );
    }

    // Shown by the dashboard when its filters hide every row
    let _ = writeln!(
        canvas.body,
        "  <text class=\"heatmap-empty\" x=\"{label_width:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#ddd\" visibility=\"{}\">No test files match the filters</text>",
        header_height + CELL / 2.0,
        if heatmap.is_empty() { "visible" } else { "hidden" }
    );

    for (row, name) in heatmap.rows.iter().enumerate() {
        let y = header_height + row as f64 * CELL;
        let _ = writeln!(
            canvas.body,
            "  <g class=\"heatmap-row\" data-row=\"{row}\" data-file=\"{}\">",
            escape_xml(name)
        );
        canvas.text(label_width - 8.0, y + CELL / 2.0 + 4.0, name, "end", 11);
        for col in 0..heatmap.columns.len() {
            let level = heatmap.value(row, col).unwrap_or(0);
            let x = label_width + col as f64 * CELL;
            canvas.rect(x + 1.0, y + 1.0, CELL - 2.0, CELL - 2.0, &to_hex(level_color(level)), None, None);
        }
        canvas.body.push_str("  </g>\n");
    }

    canvas.finish("heatmap-svg")
}
