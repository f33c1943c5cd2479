//! Coverage model definitions
//!
//! Core data structures for scanned test files, classified test cases and
//! the aggregate statistics shared by the extractor and the renderer.

use serde::{Deserialize, Serialize};

/// Coverage depth of a test case, and the derived class of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    /// No indicator matched
    #[default]
    None,
    /// Basic interaction only
    Partial,
    /// Comprehensive workflow
    Full,
}

impl Coverage {
    pub const ALL: [Coverage; 3] = [Coverage::Full, Coverage::Partial, Coverage::None];

    /// Ordinal level used by the heatmap scale
    pub fn level(&self) -> u8 {
        match self {
            Coverage::None => 0,
            Coverage::Partial => 1,
            Coverage::Full => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Coverage::None => "none",
            Coverage::Partial => "partial",
            Coverage::Full => "full",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Coverage::None => "○",
            Coverage::Partial => "◐",
            Coverage::Full => "●",
        }
    }

    /// Hex color shared by the SVG views
    pub fn hex(&self) -> &'static str {
        match self {
            Coverage::None => "#ef5350",
            Coverage::Partial => "#ffd700",
            Coverage::Full => "#26a69a",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            Coverage::None => Color::Red,
            Coverage::Partial => Color::Yellow,
            Coverage::Full => Color::Green,
        }
    }
}

/// Kind of test file, derived from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    UserJourney,
    CaseCreation,
    QueryExecution,
    BasicPageLoad,
    #[default]
    Other,
}

impl TestType {
    pub const ALL: [TestType; 5] = [
        TestType::UserJourney,
        TestType::CaseCreation,
        TestType::QueryExecution,
        TestType::BasicPageLoad,
        TestType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TestType::UserJourney => "user-journey",
            TestType::CaseCreation => "case-creation",
            TestType::QueryExecution => "query-execution",
            TestType::BasicPageLoad => "basic-page-load",
            TestType::Other => "other",
        }
    }
}

/// One extracted and classified test block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Declared test title
    pub name: String,
    pub coverage: Coverage,
    /// Component names matched by keyword, without duplicates
    pub covered_components: Vec<String>,
    /// Action labels in pattern-table order
    pub user_flow: Vec<String>,
}

impl TestCase {
    pub fn covers(&self, component: &str) -> bool {
        self.covered_components.iter().any(|c| c == component)
    }
}

/// One scanned test source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFile {
    /// File basename
    pub name: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub description: String,
    pub tests: Vec<TestCase>,
}

impl TestFile {
    /// Whether any test in the file has the given coverage level
    pub fn has_coverage(&self, coverage: Coverage) -> bool {
        self.tests.iter().any(|t| t.coverage == coverage)
    }

    /// Highest coverage level among the file's tests that cover `component`
    pub fn component_level(&self, component: &str) -> Option<Coverage> {
        self.tests
            .iter()
            .filter(|t| t.covers(component))
            .map(|t| t.coverage)
            .max()
    }
}

/// Aggregate statistics over all components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageAnalysis {
    pub total_components: usize,
    pub fully_covered: usize,
    pub partially_covered: usize,
    pub not_covered: usize,
    pub coverage_percentage: u32,
}

/// Priority of a missing test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// A component no test references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTestEntry {
    pub component: String,
    pub description: String,
    pub priority: Priority,
}

/// File filters of the renderer; both combine with AND
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    /// Keep files containing at least one test at this level
    pub coverage: Option<Coverage>,
    /// Keep files of this type
    pub test_type: Option<TestType>,
}

impl Filters {
    pub fn matches(&self, file: &TestFile) -> bool {
        let coverage_ok = self.coverage.map_or(true, |c| file.has_coverage(c));
        let type_ok = self.test_type.map_or(true, |t| file.test_type == t);
        coverage_ok && type_ok
    }

    pub fn cycle_coverage(&mut self) {
        self.coverage = match self.coverage {
            None => Some(Coverage::Full),
            Some(Coverage::Full) => Some(Coverage::Partial),
            Some(Coverage::Partial) => Some(Coverage::None),
            Some(Coverage::None) => None,
        };
    }

    pub fn cycle_test_type(&mut self) {
        self.test_type = match self.test_type {
            None => Some(TestType::ALL[0]),
            Some(current) => TestType::ALL
                .iter()
                .position(|t| *t == current)
                .and_then(|i| TestType::ALL.get(i + 1))
                .copied(),
        };
    }

    pub fn describe(&self) -> String {
        format!(
            "coverage: {} | type: {}",
            self.coverage.map_or("all", |c| c.label()),
            self.test_type.map_or("all", |t| t.label())
        )
    }
}
