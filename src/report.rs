//! Coverage report artifact
//!
//! The JSON document the extractor writes and the renderer reads. It is the
//! only interface between the two.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis;
use crate::model::{CoverageAnalysis, MissingTestEntry, TestFile};
use crate::structure::ComponentNode;
use crate::tables::Tables;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    /// Directory the test files were scanned from
    pub source_dir: String,
    pub app_structure: ComponentNode,
    pub test_files: Vec<TestFile>,
    pub coverage_analysis: CoverageAnalysis,
    pub missing_tests: Vec<MissingTestEntry>,
}

impl CoverageReport {
    /// Serialize as pretty JSON, replacing any previous file
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read an artifact; the statistics and missing tests are recomputed
    /// from its content, so a hand-edited file stays consistent
    pub fn load(path: &Path, tables: &Tables) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report: {}", path.display()))?;

        let mut report: CoverageReport = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {}", path.display()))?;

        if report.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported report schema version {} in {} (expected {})",
                report.schema_version,
                path.display(),
                SCHEMA_VERSION
            );
        }

        report.coverage_analysis = report.recompute();
        report.missing_tests =
            analysis::missing_tests(&report.app_structure, &report.test_files, tables);
        Ok(report)
    }

    /// Statistics derived from the report's own tree and test files
    pub fn recompute(&self) -> CoverageAnalysis {
        analysis::recompute(&self.app_structure, &self.test_files)
    }

    /// SHA-256 over everything except the generation metadata
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for part in [
            serde_json::to_string(&self.test_files),
            serde_json::to_string(&self.coverage_analysis),
            serde_json::to_string(&self.missing_tests),
        ] {
            // Serializing plain data structures cannot fail
            hasher.update(part.unwrap_or_default().as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    pub fn export_document(&self, exported_at: DateTime<Utc>) -> ExportDocument {
        ExportDocument {
            exported_at,
            statistics: self.coverage_analysis,
            test_files: self.test_files.clone(),
            missing_tests: self.missing_tests.clone(),
        }
    }
}

/// The user-facing export; no UI state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub statistics: CoverageAnalysis,
    pub test_files: Vec<TestFile>,
    pub missing_tests: Vec<MissingTestEntry>,
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("coverage-export-{}.json", at.format("%Y%m%d-%H%M%S"))
}

/// Write a timestamped export document into `dir`
pub fn export_report(report: &CoverageReport, dir: &Path) -> Result<PathBuf> {
    let now = Utc::now();
    let path = dir.join(export_file_name(now));

    let json = serde_json::to_string_pretty(&report.export_document(now))
        .context("Failed to serialize export")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
