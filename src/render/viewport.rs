//! Pan/zoom state for the interactive views
//!
//! A viewport maps world coordinates (layout units) to screen coordinates:
//! `screen = world * zoom + pan`. Zooming never touches the layout.

use crate::config::ViewerConfig;

pub trait Viewport {
    fn zoom(&self) -> f64;

    fn pan(&self) -> (f64, f64);

    /// Set the zoom level, clamped to the viewport's range. With an anchor,
    /// the world point under that screen position stays put.
    fn set_zoom(&mut self, zoom: f64, anchor: Option<(f64, f64)>);

    fn set_pan(&mut self, x: f64, y: f64);

    /// Back to zoom 1.0 and no pan
    fn reset(&mut self);

    fn zoom_in(&mut self, anchor: Option<(f64, f64)>);

    fn zoom_out(&mut self, anchor: Option<(f64, f64)>);

    fn pan_by(&mut self, dx: f64, dy: f64) {
        let (x, y) = self.pan();
        self.set_pan(x + dx, y + dy);
    }

    fn to_screen(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (px, py) = self.pan();
        (x * self.zoom() + px, y * self.zoom() + py)
    }

    fn to_world(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (px, py) = self.pan();
        ((x - px) / self.zoom(), (y - py) / self.zoom())
    }
}

/// Pan keeping the anchor's world point fixed while zoom changes
fn pan_for_anchor(pan: (f64, f64), old_zoom: f64, new_zoom: f64, anchor: (f64, f64)) -> (f64, f64) {
    let ratio = new_zoom / old_zoom;
    (
        anchor.0 - ratio * (anchor.0 - pan.0),
        anchor.1 - ratio * (anchor.1 - pan.1),
    )
}

/// Translate + scale transform of the tree diagram, additive zoom steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformViewport {
    zoom: f64,
    pan: (f64, f64),
    min_zoom: f64,
    max_zoom: f64,
    step: f64,
}

impl TransformViewport {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            step: config.zoom_step,
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }
}

impl Default for TransformViewport {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl Viewport for TransformViewport {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pan(&self) -> (f64, f64) {
        self.pan
    }

    fn set_zoom(&mut self, zoom: f64, anchor: Option<(f64, f64)>) {
        // Round away float drift from repeated steps
        let zoom = (zoom * 1000.0).round() / 1000.0;
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if let Some(anchor) = anchor {
            self.pan = pan_for_anchor(self.pan, self.zoom, new_zoom, anchor);
        }
        self.zoom = new_zoom;
    }

    fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = (x, y);
    }

    fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = (0.0, 0.0);
    }

    fn zoom_in(&mut self, anchor: Option<(f64, f64)>) {
        self.set_zoom(self.zoom + self.step, anchor);
    }

    fn zoom_out(&mut self, anchor: Option<(f64, f64)>) {
        self.set_zoom(self.zoom - self.step, anchor);
    }
}

pub const GRAPH_SCALE_EXTENT: (f64, f64) = (0.1, 8.0);
pub const GRAPH_ZOOM_FACTOR: f64 = 1.2;

/// Zoom transform of the force graph, multiplicative wheel steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphViewport {
    k: f64,
    pan: (f64, f64),
}

impl Default for GraphViewport {
    fn default() -> Self {
        Self {
            k: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Viewport for GraphViewport {
    fn zoom(&self) -> f64 {
        self.k
    }

    fn pan(&self) -> (f64, f64) {
        self.pan
    }

    fn set_zoom(&mut self, zoom: f64, anchor: Option<(f64, f64)>) {
        let k = zoom.clamp(GRAPH_SCALE_EXTENT.0, GRAPH_SCALE_EXTENT.1);
        if let Some(anchor) = anchor {
            self.pan = pan_for_anchor(self.pan, self.k, k, anchor);
        }
        self.k = k;
    }

    fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = (x, y);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn zoom_in(&mut self, anchor: Option<(f64, f64)>) {
        self.set_zoom(self.k * GRAPH_ZOOM_FACTOR, anchor);
    }

    fn zoom_out(&mut self, anchor: Option<(f64, f64)>) {
        self.set_zoom(self.k / GRAPH_ZOOM_FACTOR, anchor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_tree_zoom_is_clamped() {
        let mut vp = TransformViewport::default();
        assert_eq!(vp.zoom(), 1.0);

        for _ in 0..50 {
            vp.zoom_in(None);
        }
        assert_eq!(vp.zoom(), 3.0);

        for _ in 0..50 {
            vp.zoom_out(None);
        }
        assert_eq!(vp.zoom(), 0.3);

        vp.set_zoom(100.0, None);
        assert_eq!(vp.zoom(), 3.0);
    }

    #[test]
    fn test_tree_zoom_steps_are_additive() {
        let mut vp = TransformViewport::default();
        vp.zoom_in(None);
        vp.zoom_in(None);
        assert_eq!(vp.zoom(), 1.2);
        vp.zoom_out(None);
        assert_eq!(vp.zoom(), 1.1);
    }

    #[test]
    fn test_zoom_at_point_keeps_point_fixed() {
        let mut vp = TransformViewport::default();
        vp.set_pan(40.0, -25.0);
        vp.set_zoom(1.5, None);

        let cursor = (320.0, 180.0);
        let world = vp.to_world(cursor);

        vp.zoom_in(Some(cursor));
        assert!(close(vp.to_screen(world), cursor));

        vp.set_zoom(0.4, Some(cursor));
        assert!(close(vp.to_screen(world), cursor));
    }

    #[test]
    fn test_zoom_in_then_out_restores_pan() {
        let mut vp = TransformViewport::default();
        vp.set_pan(40.0, -25.0);
        vp.set_zoom(1.5, None);
        let before = vp.pan();

        let cursor = (320.0, 180.0);
        vp.zoom_in(Some(cursor));
        assert!(!close(vp.pan(), before));
        vp.zoom_out(Some(cursor));
        assert_eq!(vp.zoom(), 1.5);
        assert!(close(vp.pan(), before));

        let mut graph = GraphViewport::default();
        graph.set_pan(-30.0, 15.0);
        let before = graph.pan();
        graph.zoom_in(Some(cursor));
        graph.zoom_out(Some(cursor));
        assert!((graph.zoom() - 1.0).abs() < 1e-12);
        assert!(close(graph.pan(), before));
    }

    #[test]
    fn test_clamped_zoom_keeps_point_fixed() {
        let mut vp = TransformViewport::default();
        let cursor = (100.0, 100.0);
        let world = vp.to_world(cursor);
        vp.set_zoom(10.0, Some(cursor));
        assert_eq!(vp.zoom(), 3.0);
        assert!(close(vp.to_screen(world), cursor));
    }

    #[test]
    fn test_reset() {
        let mut vp = TransformViewport::default();
        vp.zoom_in(None);
        vp.pan_by(12.0, 8.0);
        vp.reset();
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_graph_zoom_is_multiplicative() {
        let mut vp = GraphViewport::default();
        vp.zoom_in(None);
        assert!((vp.zoom() - 1.2).abs() < 1e-12);
        vp.zoom_in(None);
        assert!((vp.zoom() - 1.44).abs() < 1e-12);

        for _ in 0..100 {
            vp.zoom_in(None);
        }
        assert_eq!(vp.zoom(), GRAPH_SCALE_EXTENT.1);
        for _ in 0..200 {
            vp.zoom_out(None);
        }
        assert_eq!(vp.zoom(), GRAPH_SCALE_EXTENT.0);
    }

    #[test]
    fn test_graph_zoom_about_pointer() {
        let mut vp = GraphViewport::default();
        vp.set_pan(-30.0, 15.0);
        let pointer = (200.0, 90.0);
        let world = vp.to_world(pointer);
        vp.zoom_out(Some(pointer));
        assert!(close(vp.to_screen(world), pointer));
    }

    #[test]
    fn test_viewports_are_independent() {
        let mut tree = TransformViewport::default();
        let graph = GraphViewport::default();
        tree.zoom_in(None);
        assert_eq!(graph.zoom(), 1.0);
    }
}
