//! Force-directed graph of the component tree
//!
//! A small velocity-Verlet simulation in the style of d3-force: a link
//! force pulls parents and children to a rest distance, a many-body force
//! pushes every pair apart, and a centering force keeps the mean position at
//! the origin. `alpha` cools towards `alpha_target` each tick and the
//! simulation stops once it drops under `alpha_min`.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::model::Coverage;
use crate::structure::ComponentNode;

pub const LINK_DISTANCE: f64 = 60.0;
pub const CHARGE_STRENGTH: f64 = -300.0;
pub const ALPHA_MIN: f64 = 0.001;
pub const VELOCITY_DECAY: f64 = 0.4;
/// Alpha the simulation is kept at while a node is dragged
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub name: String,
    pub coverage: Coverage,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned position while dragged
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    strength: f64,
    bias: f64,
}

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    dragging: Option<usize>,
}

impl ForceSimulation {
    /// One node per distinct component name, one link per tree edge
    pub fn new(structure: &ComponentNode, classes: &HashMap<String, Coverage>) -> Self {
        let names = structure.component_names();
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let nodes: Vec<FlowNode> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Phyllotaxis arrangement, as d3 seeds unpositioned nodes
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
                FlowNode {
                    name: name.clone(),
                    coverage: classes.get(name).copied().unwrap_or_default(),
                    x: radius * angle.cos(),
                    y: radius * angle.sin(),
                    vx: 0.0,
                    vy: 0.0,
                    fx: None,
                    fy: None,
                }
            })
            .collect();

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (parent, child) in structure.edges() {
            if let (Some(&s), Some(&t)) = (index.get(parent.as_str()), index.get(child.as_str())) {
                if s != t && !pairs.contains(&(s, t)) {
                    pairs.push((s, t));
                }
            }
        }

        let mut degree = vec![0usize; nodes.len()];
        for &(s, t) in &pairs {
            degree[s] += 1;
            degree[t] += 1;
        }

        let links = pairs
            .into_iter()
            .map(|(source, target)| FlowLink {
                source,
                target,
                strength: 1.0 / degree[source].min(degree[target]) as f64,
                bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
            })
            .collect();

        Self {
            nodes,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            dragging: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the event loop should keep ticking
    pub fn is_active(&self) -> bool {
        self.alpha >= ALPHA_MIN || self.dragging.is_some()
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        self.apply_links();
        self.apply_charge();
        self.apply_center();

        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= 1.0 - VELOCITY_DECAY;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= 1.0 - VELOCITY_DECAY;
                    node.y += node.vy;
                }
            }
        }
    }

    /// Tick until the simulation cools down
    pub fn settle(&mut self) {
        // 300 ticks cool alpha from 1 to alpha_min; the cap covers reheats
        for _ in 0..1000 {
            if !self.is_active() {
                break;
            }
            self.tick();
        }
    }

    fn apply_links(&mut self) {
        for link in &self.links {
            let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
            let mut dx = t.x + t.vx - s.x - s.vx;
            let mut dy = t.y + t.vy - s.y - s.vy;
            if dx == 0.0 && dy == 0.0 {
                dx = 1e-6;
                dy = 1e-6;
            }
            let l = (dx * dx + dy * dy).sqrt();
            let k = (l - LINK_DISTANCE) / l * self.alpha * link.strength;
            dx *= k;
            dy *= k;

            let target = &mut self.nodes[link.target];
            target.vx -= dx * link.bias;
            target.vy -= dy * link.bias;
            let source = &mut self.nodes[link.source];
            source.vx += dx * (1.0 - link.bias);
            source.vy += dy * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self) {
        let n = self.nodes.len();
        let mut forces = vec![(0.0, 0.0); n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = self.nodes[j].x - self.nodes[i].x;
                let mut dy = self.nodes[j].y - self.nodes[i].y;
                if dx == 0.0 && dy == 0.0 {
                    dx = 1e-6 * (j as f64 - i as f64);
                    dy = 1e-6;
                }
                let l2 = (dx * dx + dy * dy).max(1.0);
                let w = CHARGE_STRENGTH * self.alpha / l2;
                forces[i].0 += dx * w;
                forces[i].1 += dy * w;
            }
        }

        for (node, (fx, fy)) in self.nodes.iter_mut().zip(forces) {
            node.vx += fx;
            node.vy += fy;
        }
    }

    fn apply_center(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let n = self.nodes.len() as f64;
        let sx = self.nodes.iter().map(|n| n.x).sum::<f64>() / n;
        let sy = self.nodes.iter().map(|n| n.y).sum::<f64>() / n;
        for node in &mut self.nodes {
            node.x -= sx;
            node.y -= sy;
        }
    }

    /// Pin a node where it is and reheat
    pub fn drag_start(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = Some(node.x);
            node.fy = Some(node.y);
            self.dragging = Some(index);
            self.alpha_target = DRAG_ALPHA_TARGET;
        }
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some(node) = self.dragging.and_then(|i| self.nodes.get_mut(i)) {
            node.fx = Some(x);
            node.fy = Some(y);
        }
    }

    /// Unpin the dragged node and let the simulation cool again
    pub fn drag_end(&mut self) {
        if let Some(node) = self.dragging.take().and_then(|i| self.nodes.get_mut(i)) {
            node.fx = None;
            node.fy = None;
        }
        self.alpha_target = 0.0;
    }

    /// Closest node within `radius` of a world point
    pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (i, (n.x - x).hypot(n.y - y)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// (min_x, min_y, max_x, max_y) of the node positions
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.nodes.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), n| (x0.min(n.x), y0.min(n.y), x1.max(n.x), y1.max(n.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::app_structure;

    fn simulation() -> ForceSimulation {
        ForceSimulation::new(&app_structure(), &HashMap::new())
    }

    #[test]
    fn test_graph_shape() {
        let sim = simulation();
        assert_eq!(sim.nodes.len(), 30);
        assert_eq!(sim.links.len(), 29);
        assert!(sim.is_active());
        assert!(sim.nodes.iter().all(|n| n.coverage == Coverage::None));
    }

    #[test]
    fn test_settle_cools_down() {
        let mut sim = simulation();
        sim.settle();
        assert!(!sim.is_active());
        assert!(sim.alpha() < ALPHA_MIN);
        assert!(sim.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }

    #[test]
    fn test_settled_nodes_spread_out() {
        let mut sim = simulation();
        sim.settle();
        let (x0, y0, x1, y1) = sim.bounds();
        assert!(x1 - x0 > LINK_DISTANCE);
        assert!(y1 - y0 > LINK_DISTANCE);
    }

    #[test]
    fn test_drag_pins_and_reheats() {
        let mut sim = simulation();
        sim.settle();

        sim.drag_start(3);
        assert!(sim.is_active());
        sim.drag_to(500.0, -200.0);
        for _ in 0..10 {
            sim.tick();
        }
        // Centering moves free nodes, a pinned node stays at its pin
        assert_eq!(sim.nodes[3].x, 500.0);
        assert_eq!(sim.nodes[3].y, -200.0);
        assert!(sim.alpha() > ALPHA_MIN);

        sim.drag_end();
        assert_eq!(sim.nodes[3].fx, None);
        assert_eq!(sim.dragging(), None);
        sim.settle();
        assert!(!sim.is_active());
    }

    #[test]
    fn test_node_at() {
        let sim = simulation();
        let node = &sim.nodes[5];
        assert_eq!(sim.node_at(node.x + 0.5, node.y, 2.0), Some(5));
        assert_eq!(sim.node_at(10_000.0, 10_000.0, 2.0), None);
    }
}
