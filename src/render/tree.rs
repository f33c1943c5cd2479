//! Tree diagram of the component hierarchy
//!
//! Top-down layout: leaves take consecutive slots left to right, every parent
//! is centered over its children. When a diagram cannot be built the view
//! degrades to nested boxes with the same hierarchy and coloring.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::Coverage;
use crate::structure::ComponentNode;

pub const NODE_SPACING: f64 = 140.0;
pub const LEVEL_GAP: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("component tree is empty")]
    EmptyTree,

    #[error("label {0:?} contains control characters")]
    InvalidLabel(String),

    #[error("layout is {width} units wide, limit is {max}")]
    TooWide { width: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutNode {
    pub name: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub coverage: Coverage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    /// Nodes in pre-order
    pub nodes: Vec<LaidOutNode>,
    /// Parent/child index pairs into `nodes`
    pub edges: Vec<(usize, usize)>,
    pub width: f64,
    pub height: f64,
}

/// Fallback rendering: the hierarchy as nested boxes
#[derive(Debug, Clone, PartialEq)]
pub struct NestedBox {
    pub name: String,
    pub coverage: Coverage,
    pub children: Vec<NestedBox>,
}

impl NestedBox {
    pub fn from_structure(node: &ComponentNode, classes: &HashMap<String, Coverage>) -> Self {
        Self {
            name: node.name.clone(),
            coverage: class_of(classes, &node.name),
            children: node
                .children
                .iter()
                .map(|c| Self::from_structure(c, classes))
                .collect(),
        }
    }

    /// Boxes in pre-order with their nesting depth
    pub fn flatten(&self) -> Vec<(usize, &NestedBox)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a NestedBox)>) {
        out.push((depth, self));
        for child in &self.children {
            child.flatten_into(depth + 1, out);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeView {
    Diagram(TreeLayout),
    Fallback { boxes: NestedBox, error: DiagramError },
}

impl TreeView {
    pub fn build(
        structure: &ComponentNode,
        classes: &HashMap<String, Coverage>,
        max_width: f64,
    ) -> Self {
        match layout_tree(structure, classes, max_width) {
            Ok(layout) => TreeView::Diagram(layout),
            Err(error) => TreeView::Fallback {
                boxes: NestedBox::from_structure(structure, classes),
                error,
            },
        }
    }

    pub fn fallback_reason(&self) -> Option<&DiagramError> {
        match self {
            TreeView::Diagram(_) => None,
            TreeView::Fallback { error, .. } => Some(error),
        }
    }
}

fn class_of(classes: &HashMap<String, Coverage>, name: &str) -> Coverage {
    classes.get(name).copied().unwrap_or_default()
}

/// Lay the tree out top-down
pub fn layout_tree(
    structure: &ComponentNode,
    classes: &HashMap<String, Coverage>,
    max_width: f64,
) -> Result<TreeLayout, DiagramError> {
    if structure.name.trim().is_empty() && structure.is_leaf() {
        return Err(DiagramError::EmptyTree);
    }

    let mut invalid = None;
    structure.walk(&mut |node, _| {
        if invalid.is_none() && node.name.chars().any(char::is_control) {
            invalid = Some(node.name.clone());
        }
    });
    if let Some(label) = invalid {
        return Err(DiagramError::InvalidLabel(label));
    }

    let mut layout = TreeLayout {
        nodes: Vec::new(),
        edges: Vec::new(),
        width: 0.0,
        height: 0.0,
    };
    let mut next_slot = 0usize;
    place(structure, 0, None, classes, &mut next_slot, &mut layout);

    layout.width = next_slot as f64 * NODE_SPACING;
    layout.height = (structure.depth() + 1) as f64 * LEVEL_GAP;

    if layout.width > max_width {
        return Err(DiagramError::TooWide {
            width: layout.width,
            max: max_width,
        });
    }

    Ok(layout)
}

fn place(
    node: &ComponentNode,
    depth: usize,
    parent: Option<usize>,
    classes: &HashMap<String, Coverage>,
    next_slot: &mut usize,
    layout: &mut TreeLayout,
) -> f64 {
    let index = layout.nodes.len();
    layout.nodes.push(LaidOutNode {
        name: node.name.clone(),
        depth,
        x: 0.0,
        y: depth as f64 * LEVEL_GAP + LEVEL_GAP / 2.0,
        coverage: class_of(classes, &node.name),
    });
    if let Some(parent) = parent {
        layout.edges.push((parent, index));
    }

    let x = if node.is_leaf() {
        let x = *next_slot as f64 * NODE_SPACING + NODE_SPACING / 2.0;
        *next_slot += 1;
        x
    } else {
        let xs: Vec<f64> = node
            .children
            .iter()
            .map(|child| place(child, depth + 1, Some(index), classes, next_slot, layout))
            .collect();
        let first = xs.first().copied().unwrap_or_default();
        let last = xs.last().copied().unwrap_or_default();
        (first + last) / 2.0
    };

    layout.nodes[index].x = x;
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::app_structure;

    fn classes() -> HashMap<String, Coverage> {
        let mut classes = HashMap::new();
        classes.insert("Giriş".to_string(), Coverage::Full);
        classes.insert("Sorgulama".to_string(), Coverage::Partial);
        classes
    }

    #[test]
    fn test_app_tree_lays_out() {
        let layout = layout_tree(&app_structure(), &classes(), 4000.0).unwrap();
        assert_eq!(layout.nodes.len(), 30);
        assert_eq!(layout.edges.len(), 29);
        assert_eq!(layout.nodes[0].name, "Hukuk Takip Sistemi");

        let login = layout.nodes.iter().find(|n| n.name == "Giriş").unwrap();
        assert_eq!(login.coverage, Coverage::Full);
        assert_eq!(login.depth, 1);
        let reports = layout.nodes.iter().find(|n| n.name == "Raporlar").unwrap();
        assert_eq!(reports.coverage, Coverage::None);
    }

    #[test]
    fn test_parent_is_centered_over_children() {
        let tree = ComponentNode::new("root").with_children(vec![
            ComponentNode::new("a"),
            ComponentNode::new("b"),
            ComponentNode::new("c"),
        ]);
        let layout = layout_tree(&tree, &HashMap::new(), 4000.0).unwrap();
        assert_eq!(layout.nodes[0].x, layout.nodes[2].x);
        assert!(layout.nodes[1].x < layout.nodes[2].x);
        assert!(layout.nodes[1].y > layout.nodes[0].y);
        assert_eq!(layout.width, 3.0 * NODE_SPACING);
    }

    #[test]
    fn test_control_characters_fall_back() {
        let tree = ComponentNode::new("root")
            .with_children(vec![ComponentNode::new("line\nbreak"), ComponentNode::new("ok")]);
        let view = TreeView::build(&tree, &classes(), 4000.0);

        match view {
            TreeView::Fallback { boxes, error } => {
                assert_eq!(error, DiagramError::InvalidLabel("line\nbreak".to_string()));
                assert_eq!(boxes.children.len(), 2);
                assert_eq!(boxes.flatten().len(), 3);
            }
            TreeView::Diagram(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_too_wide_falls_back_with_same_coloring() {
        let view = TreeView::build(&app_structure(), &classes(), 500.0);
        assert!(matches!(view.fallback_reason(), Some(DiagramError::TooWide { .. })));

        if let TreeView::Fallback { boxes, .. } = view {
            let flat = boxes.flatten();
            assert_eq!(flat.len(), 30);
            let login = flat.iter().find(|(_, b)| b.name == "Giriş").unwrap();
            assert_eq!(login.0, 1);
            assert_eq!(login.1.coverage, Coverage::Full);
        }
    }

    #[test]
    fn test_empty_tree_falls_back() {
        let view = TreeView::build(&ComponentNode::new(""), &HashMap::new(), 4000.0);
        assert_eq!(view.fallback_reason(), Some(&DiagramError::EmptyTree));
    }
}
