//! Test file × component heatmap

use crate::model::{Coverage, TestFile};
use crate::structure::ComponentNode;

/// Color stops of the scale at levels 0, 1 and 2
const SCALE: [(u8, u8, u8); 3] = [(0xef, 0x53, 0x50), (0xff, 0xd7, 0x00), (0x26, 0xa6, 0x9a)];

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    /// Test file names
    pub rows: Vec<String>,
    /// Component names in tree order
    pub columns: Vec<String>,
    /// `cells[row][col]` is a coverage level, 0 to 2
    pub cells: Vec<Vec<u8>>,
}

impl Heatmap {
    pub fn build(structure: &ComponentNode, files: &[&TestFile]) -> Self {
        let columns = structure.component_names();
        let cells = files
            .iter()
            .map(|file| {
                columns
                    .iter()
                    .map(|c| file.component_level(c).map(|l| l.level()).unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            rows: files.iter().map(|f| f.name.clone()).collect(),
            columns,
            cells,
        }
    }

    pub fn value(&self, row: usize, col: usize) -> Option<u8> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Piecewise linear interpolation over the three-color scale, `t` in [0, 1]
pub fn interpolate_color(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (SCALE.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(SCALE.len() - 2);
    let local = scaled - i as f64;

    let (a, b) = (SCALE[i], SCALE[i + 1]);
    let lerp = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * local).round() as u8;
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

pub fn level_color(level: u8) -> (u8, u8, u8) {
    interpolate_color(level as f64 / Coverage::Full.level() as f64)
}

pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestCase, TestType};
    use crate::structure::app_structure;

    fn case(coverage: Coverage, components: &[&str]) -> TestCase {
        TestCase {
            name: "t".to_string(),
            coverage,
            covered_components: components.iter().map(|c| c.to_string()).collect(),
            user_flow: Vec::new(),
        }
    }

    #[test]
    fn test_cells_take_highest_level() {
        let file = TestFile {
            name: "query-execution.spec.ts".to_string(),
            test_type: TestType::QueryExecution,
            description: String::new(),
            tests: vec![
                case(Coverage::Partial, &["Sorgulama", "Banka Sorgusu"]),
                case(Coverage::Full, &["Sorgulama"]),
                case(Coverage::None, &["Tapu Sorgusu"]),
            ],
        };
        let heatmap = Heatmap::build(&app_structure(), &[&file]);
        let col = |name: &str| heatmap.columns.iter().position(|c| c == name).unwrap();

        assert_eq!(heatmap.rows, vec!["query-execution.spec.ts"]);
        assert_eq!(heatmap.columns.len(), 30);
        assert_eq!(heatmap.value(0, col("Sorgulama")), Some(2));
        assert_eq!(heatmap.value(0, col("Banka Sorgusu")), Some(1));
        assert_eq!(heatmap.value(0, col("Tapu Sorgusu")), Some(0));
        assert_eq!(heatmap.value(0, col("Raporlar")), Some(0));
        assert_eq!(heatmap.value(1, 0), None);
    }

    #[test]
    fn test_scale_endpoints_and_midpoints() {
        assert_eq!(to_hex(level_color(0)), "#ef5350");
        assert_eq!(to_hex(level_color(1)), "#ffd700");
        assert_eq!(to_hex(level_color(2)), "#26a69a");

        // Halfway between red and gold
        assert_eq!(interpolate_color(0.25), (0xf7, 0x95, 0x28));
        assert_eq!(interpolate_color(-1.0), SCALE[0]);
        assert_eq!(interpolate_color(7.0), SCALE[2]);
    }

    #[test]
    fn test_empty_heatmap() {
        let heatmap = Heatmap::build(&app_structure(), &[]);
        assert!(heatmap.is_empty());
        assert_eq!(heatmap.columns.len(), 30);
    }
}
