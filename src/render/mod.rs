//! Coverage renderer
//!
//! View state over a loaded report: the current view mode, filters, file
//! selection and the per-view pan/zoom. Both the terminal UI and the static
//! HTML dashboard drive a [`Dashboard`].

pub mod flow;
pub mod heatmap;
pub mod svg;
pub mod tree;
pub mod viewport;

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::analysis;
use crate::config::ViewerConfig;
use crate::model::{Coverage, CoverageAnalysis, Filters, TestFile};
use crate::report::{self, CoverageReport};

use flow::ForceSimulation;
use heatmap::Heatmap;
use tree::TreeView;
use viewport::{GraphViewport, TransformViewport, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tree,
    Flow,
    Heatmap,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Tree, ViewMode::Flow, ViewMode::Heatmap];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Tree => "Tree",
            ViewMode::Flow => "Flow",
            ViewMode::Heatmap => "Heatmap",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ViewMode::Tree => ViewMode::Flow,
            ViewMode::Flow => ViewMode::Heatmap,
            ViewMode::Heatmap => ViewMode::Tree,
        }
    }
}

/// Renderer state over one loaded report
pub struct Dashboard {
    report: CoverageReport,
    viewer: ViewerConfig,
    view: ViewMode,
    filters: Filters,
    /// Index into the filtered file list
    selected: Option<usize>,
    classes: HashMap<String, Coverage>,
    pub tree_viewport: TransformViewport,
    pub flow_viewport: GraphViewport,
    pub tree: TreeView,
    pub flow: ForceSimulation,
    pub heatmap: Heatmap,
}

impl Dashboard {
    pub fn new(report: CoverageReport, viewer: ViewerConfig) -> Self {
        let classes = analysis::component_classes(&report.app_structure, &report.test_files);
        let tree = TreeView::build(&report.app_structure, &classes, viewer.max_canvas_width);
        let flow = ForceSimulation::new(&report.app_structure, &classes);
        let heatmap = Heatmap::build(&report.app_structure, &report.test_files.iter().collect::<Vec<_>>());

        Self {
            tree_viewport: TransformViewport::new(&viewer),
            flow_viewport: GraphViewport::default(),
            report,
            viewer,
            view: ViewMode::Tree,
            filters: Filters::default(),
            selected: None,
            classes,
            tree,
            flow,
            heatmap,
        }
    }

    pub fn report(&self) -> &CoverageReport {
        &self.report
    }

    pub fn analysis(&self) -> &CoverageAnalysis {
        &self.report.coverage_analysis
    }

    pub fn viewer(&self) -> &ViewerConfig {
        &self.viewer
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn filters(&self) -> Filters {
        self.filters
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Coverage class per component under the current filters
    pub fn classes(&self) -> &HashMap<String, Coverage> {
        &self.classes
    }

    pub fn filtered_files(&self) -> Vec<&TestFile> {
        self.report
            .test_files
            .iter()
            .filter(|f| self.filters.matches(f))
            .collect()
    }

    pub fn selected_file(&self) -> Option<&TestFile> {
        self.selected
            .and_then(|i| self.filtered_files().get(i).copied())
    }

    /// Switch views; the view being left loses its pan/zoom
    pub fn set_view(&mut self, mode: ViewMode) {
        if mode == self.view {
            return;
        }
        match self.view {
            ViewMode::Tree => self.tree_viewport.reset(),
            ViewMode::Flow => self.flow_viewport.reset(),
            ViewMode::Heatmap => {}
        }
        self.view = mode;
        self.render_current();
    }

    /// Apply new filters and re-render the current view from the matching files
    pub fn filter_tests(&mut self, filters: Filters) {
        self.filters = filters;
        let count = self.filtered_files().len();
        if self.selected.is_some_and(|i| i >= count) {
            self.selected = None;
        }
        self.render_current();
    }

    /// Highlight a file in the list; the views are unaffected
    pub fn select_file(&mut self, index: usize) {
        if index < self.filtered_files().len() {
            self.selected = Some(index);
        }
    }

    pub fn select_next(&mut self) {
        let count = self.filtered_files().len();
        if count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.filtered_files().is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Recompute the statistics from the loaded files, no re-scan
    pub fn refresh(&mut self) {
        self.report.coverage_analysis = self.report.recompute();
        self.render_current();
    }

    /// Write the export document into `dir`
    pub fn export_report(&self, dir: &Path) -> Result<PathBuf> {
        report::export_report(&self.report, dir)
    }

    /// Rebuild the current view from scratch
    pub fn render_current(&mut self) {
        let report = &self.report;
        let filters = self.filters;
        let files: Vec<&TestFile> = report.test_files.iter().filter(|f| filters.matches(f)).collect();
        self.classes = analysis::component_classes(&report.app_structure, files.iter().copied());

        let structure = &report.app_structure;
        match self.view {
            ViewMode::Tree => {
                self.tree = TreeView::build(structure, &self.classes, self.viewer.max_canvas_width)
            }
            ViewMode::Flow => self.flow = ForceSimulation::new(structure, &self.classes),
            ViewMode::Heatmap => self.heatmap = Heatmap::build(structure, &files),
        }
    }

    /// Build all three views for a static snapshot
    pub fn render_all(&mut self) {
        let current = self.view;
        for mode in ViewMode::ALL {
            self.view = mode;
            self.render_current();
        }
        self.view = current;
        self.flow.settle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Extractor;
    use crate::model::{Coverage, TestType};
    use crate::structure::app_structure;
    use crate::tables::Tables;
    use tempfile::TempDir;

    const JOURNEY: &str = r#"
test('complete journey', async ({ page }) => {
  // complete flow through İcra Dosyalarım and Giriş
  await page.goto('/icra-dosyalarim');
});
"#;

    const SMOKE: &str = r#"
test('dashboard loads', async ({ page }) => {
  await page.goto('/dashboard');
  // verify the page loads
});
"#;

    fn dashboard() -> Dashboard {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("user-journey.spec.ts"), JOURNEY).unwrap();
        std::fs::write(temp_dir.path().join("basic-page-load.spec.ts"), SMOKE).unwrap();

        let extractor = Extractor::new(
            Tables::embedded().unwrap(),
            &["*.spec.ts".to_string()],
            app_structure(),
        )
        .unwrap();
        Dashboard::new(extractor.build_report(temp_dir.path()), ViewerConfig::default())
    }

    #[test]
    fn test_switching_view_resets_viewport() {
        let mut dash = dashboard();
        dash.tree_viewport.zoom_in(None);
        dash.tree_viewport.set_pan(10.0, 10.0);

        dash.set_view(ViewMode::Flow);
        assert_eq!(dash.view(), ViewMode::Flow);
        assert_eq!(dash.tree_viewport.zoom(), 1.0);
        assert_eq!(dash.tree_viewport.pan(), (0.0, 0.0));

        dash.flow_viewport.zoom_in(None);
        dash.set_view(ViewMode::Heatmap);
        assert_eq!(dash.flow_viewport.zoom(), 1.0);
    }

    #[test]
    fn test_filters_recolor_but_keep_tree() {
        let mut dash = dashboard();
        assert_eq!(dash.classes()["İcra Dosyalarım"], Coverage::Full);

        dash.filter_tests(Filters {
            coverage: None,
            test_type: Some(TestType::BasicPageLoad),
        });
        let names: Vec<&str> = dash.filtered_files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["basic-page-load.spec.ts"]);
        assert_eq!(dash.classes()["İcra Dosyalarım"], Coverage::None);
        assert_eq!(dash.classes().len(), 30);

        if let TreeView::Diagram(layout) = &dash.tree {
            assert_eq!(layout.nodes.len(), 30);
        } else {
            panic!("expected a diagram");
        }

        // Stored statistics are not touched by filtering
        assert!(dash.analysis().fully_covered > 0);
    }

    #[test]
    fn test_heatmap_follows_filters() {
        let mut dash = dashboard();
        dash.set_view(ViewMode::Heatmap);
        assert_eq!(dash.heatmap.rows.len(), 2);

        dash.filter_tests(Filters {
            coverage: Some(Coverage::Full),
            test_type: None,
        });
        assert_eq!(dash.heatmap.rows, vec!["user-journey.spec.ts"]);
    }

    #[test]
    fn test_selection_is_display_only() {
        let mut dash = dashboard();
        let before = dash.classes().clone();

        dash.select_file(1);
        assert_eq!(dash.selected(), Some(1));
        assert_eq!(dash.classes(), &before);

        dash.select_file(9);
        assert_eq!(dash.selected(), Some(1));

        dash.select_prev();
        dash.select_prev();
        assert_eq!(dash.selected(), Some(0));
        dash.select_next();
        dash.select_next();
        assert_eq!(dash.selected(), Some(1));

        dash.filter_tests(Filters {
            coverage: Some(Coverage::Full),
            test_type: None,
        });
        assert_eq!(dash.selected(), None);
    }

    #[test]
    fn test_refresh_recomputes_statistics() {
        let mut dash = dashboard();
        let expected = *dash.analysis();
        dash.report.coverage_analysis = CoverageAnalysis::default();
        dash.refresh();
        assert_eq!(dash.analysis(), &expected);
    }

    #[test]
    fn test_export_writes_document() {
        let dash = dashboard();
        let out = TempDir::new().unwrap();
        let path = dash.export_report(out.path()).unwrap();
        assert!(path.exists());
        assert!(dash.export_report(&out.path().join("missing")).is_err());
    }
}
