//! Lookup tables
//!
//! Versioned classification data: file-name rules, coverage indicators,
//! keyword→component aliases, flow patterns and missing-test priorities.
//! The defaults live in `assets/tables.toml` and are embedded in the binary.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::model::{Priority, TestType};

pub const TABLES_VERSION: u32 = 1;

const EMBEDDED_TABLES: &str = include_str!("../assets/tables.toml");

#[derive(Debug, Deserialize)]
struct TablesFile {
    version: u32,
    missing_description: String,
    default_description: String,
    comprehensive: Vec<String>,
    basic: Vec<String>,
    #[serde(default)]
    test_types: Vec<TestTypeRule>,
    #[serde(default)]
    descriptions: HashMap<String, String>,
    #[serde(default)]
    components: Vec<ComponentKeyword>,
    #[serde(default)]
    flows: Vec<FlowRule>,
    #[serde(default)]
    priority: PriorityLists,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestTypeRule {
    /// Substring of the file name
    pub pattern: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentKeyword {
    pub keyword: String,
    pub component: String,
}

#[derive(Debug, Deserialize)]
struct FlowRule {
    pattern: String,
    action: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriorityLists {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

/// A compiled flow pattern
#[derive(Debug, Clone)]
pub struct FlowPattern {
    pub regex: Regex,
    pub action: String,
}

/// Validated lookup tables, ready for matching
#[derive(Debug, Clone)]
pub struct Tables {
    pub missing_description: String,
    pub default_description: String,
    /// Case-folded "comprehensive" indicators
    pub comprehensive: Vec<String>,
    /// Case-folded "basic" indicators
    pub basic: Vec<String>,
    pub test_types: Vec<TestTypeRule>,
    pub descriptions: HashMap<String, String>,
    /// Keywords are case-folded with [`fold_case`]
    pub components: Vec<ComponentKeyword>,
    pub flows: Vec<FlowPattern>,
    pub priority: PriorityLists,
}

impl Tables {
    /// The tables compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_TABLES).context("Embedded lookup tables are invalid")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lookup tables: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to load lookup tables from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: TablesFile = toml::from_str(content).context("Failed to parse lookup tables")?;

        if file.version != TABLES_VERSION {
            anyhow::bail!(
                "Unsupported lookup table version {} (expected {})",
                file.version,
                TABLES_VERSION
            );
        }

        let flows = file
            .flows
            .into_iter()
            .map(|rule| {
                let regex = Regex::new(&rule.pattern).with_context(|| {
                    format!("Invalid flow pattern '{}' for '{}'", rule.pattern, rule.action)
                })?;
                Ok(FlowPattern { regex, action: rule.action })
            })
            .collect::<Result<Vec<_>>>()?;

        let components = file
            .components
            .into_iter()
            .map(|entry| ComponentKeyword {
                keyword: fold_case(&entry.keyword),
                component: entry.component,
            })
            .collect();

        Ok(Self {
            missing_description: file.missing_description,
            default_description: file.default_description,
            comprehensive: lowercase_all(file.comprehensive),
            basic: lowercase_all(file.basic),
            test_types: file.test_types,
            descriptions: file.descriptions,
            components,
            flows,
            priority: file.priority,
        })
    }

    /// Test type of a file, first matching rule wins
    pub fn test_type_for(&self, file_name: &str) -> TestType {
        self.test_types
            .iter()
            .find(|rule| file_name.contains(&rule.pattern))
            .map(|rule| rule.test_type)
            .unwrap_or_default()
    }

    pub fn description_for(&self, file_name: &str) -> String {
        self.descriptions
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| self.default_description.clone())
    }

    pub fn priority_for(&self, component: &str) -> Priority {
        if self.priority.high.iter().any(|c| c == component) {
            Priority::High
        } else if self.priority.low.iter().any(|c| c == component) {
            Priority::Low
        } else {
            Priority::Medium
        }
    }

    pub fn missing_description_for(&self, component: &str) -> String {
        self.missing_description.replace("{component}", component)
    }
}

/// Lower-case for matching, with the Turkish dotted capital `İ` folded to `i`
///
/// Unicode lower-cases `İ` to `i` plus U+0307, which would never match a
/// keyword written with a plain `i`.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase().replace("i\u{307}", "i")
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values.iter().map(|v| fold_case(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version = 1
missing_description = "missing {component}"
default_description = "generic"
comprehensive = ["Complete"]
basic = ["click"]

[[flows]]
pattern = 'page\.goto\('
action = "Navigate"
"#;

    #[test]
    fn test_fold_case_drops_dot_above() {
        assert_eq!(fold_case("İstatistik"), "istatistik");
        assert_eq!(fold_case("Son İşlemler"), "son işlemler");
        assert_eq!(fold_case("Giriş"), "giriş");
    }

    #[test]
    fn test_embedded_tables_load() {
        let tables = Tables::embedded().unwrap();
        assert!(tables.comprehensive.contains(&"sorgu çalıştırma".to_string()));
        assert_eq!(tables.basic.len(), 6);
        assert!(!tables.flows.is_empty());
        assert!(tables
            .components
            .iter()
            .any(|k| k.component == "İcra Dosyalarım" && k.keyword == "icra dosyalarım"));
    }

    #[test]
    fn test_file_name_rules() {
        let tables = Tables::embedded().unwrap();
        assert_eq!(tables.test_type_for("user-journey.spec.ts"), TestType::UserJourney);
        assert_eq!(tables.test_type_for("query-execution.test.ts"), TestType::QueryExecution);
        assert_eq!(tables.test_type_for("dashboard-page-load.spec.ts"), TestType::BasicPageLoad);
        assert_eq!(tables.test_type_for("misc.spec.ts"), TestType::Other);

        assert_eq!(
            tables.description_for("case-creation.spec.ts"),
            "Multi-step enforcement file creation wizard"
        );
        assert_eq!(tables.description_for("misc.spec.ts"), "End-to-end test file");
    }

    #[test]
    fn test_priorities_default_to_medium() {
        let tables = Tables::embedded().unwrap();
        assert_eq!(tables.priority_for("Dosya Oluştur"), Priority::High);
        assert_eq!(tables.priority_for("Profil"), Priority::Low);
        assert_eq!(tables.priority_for("Belgeler"), Priority::Medium);
        assert_eq!(
            tables.missing_description_for("Belgeler"),
            "No end-to-end test exercises Belgeler"
        );
    }

    #[test]
    fn test_indicators_are_lowercased() {
        let tables = Tables::parse(MINIMAL).unwrap();
        assert_eq!(tables.comprehensive, vec!["complete"]);
        assert_eq!(tables.missing_description_for("X"), "missing X");
    }

    #[test]
    fn test_rejects_unknown_version() {
        let content = MINIMAL.replace("version = 1", "version = 2");
        assert!(Tables::parse(&content).is_err());
    }

    #[test]
    fn test_rejects_invalid_flow_regex() {
        let content = MINIMAL.replace(r"page\.goto\(", "page(");
        assert!(Tables::parse(&content).is_err());
    }
}
