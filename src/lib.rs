//! covmap - end-to-end test coverage map
//!
//! A library for measuring how well the Hukuk Takip Sistemi e2e suite covers
//! the application's feature tree:
//! - Test block extraction and heuristic classification of Playwright test files
//! - Coverage aggregation and missing-test detection over a fixed component tree
//! - A JSON report artifact shared by the extractor and the renderer
//! - Tree, force-graph and heatmap views in the terminal and as static HTML

pub mod analysis;
pub mod config;
pub mod extractor;
pub mod html;
pub mod model;
pub mod render;
pub mod report;
pub mod structure;
pub mod tables;
pub mod threshold;
pub mod tui;
pub mod watcher;

pub use config::Config;
pub use extractor::Extractor;
pub use model::{Coverage, CoverageAnalysis, MissingTestEntry, Priority, TestCase, TestFile, TestType};
pub use report::CoverageReport;
pub use structure::{app_structure, ComponentNode};
