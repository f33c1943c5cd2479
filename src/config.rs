use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::tables::Tables;

pub const CONFIG_FILE: &str = "covmap.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub tables: TablesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Directory holding the e2e test files
    #[serde(default = "default_scan_dir")]
    pub dir: PathBuf,
    /// Where the report artifact is written
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Glob patterns a file name must match to be scanned
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dir: default_scan_dir(),
            output: default_output(),
            patterns: default_patterns(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    /// Widest tree layout, in layout units, before the nested-box fallback
    #[serde(default = "default_max_canvas_width")]
    pub max_canvas_width: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            max_canvas_width: default_max_canvas_width(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesConfig {
    /// Replacement lookup-table file; the embedded tables are used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_scan_dir() -> PathBuf {
    PathBuf::from("tests/e2e")
}

fn default_output() -> PathBuf {
    PathBuf::from("coverage-report.json")
}

fn default_patterns() -> Vec<String> {
    ["*.spec.ts", "*.test.ts", "*.spec.js", "*.test.js"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_min_zoom() -> f64 {
    0.3
}

fn default_max_zoom() -> f64 {
    3.0
}

fn default_zoom_step() -> f64 {
    0.1
}

fn default_max_canvas_width() -> f64 {
    4000.0
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let viewer = &self.viewer;
        if !(viewer.min_zoom > 0.0
            && viewer.min_zoom <= 1.0
            && viewer.max_zoom >= 1.0
            && viewer.max_zoom.is_finite())
        {
            anyhow::bail!(
                "Invalid zoom range [{}, {}]: it must contain 1.0 and be positive",
                viewer.min_zoom,
                viewer.max_zoom
            );
        }
        // Negated comparisons so that NaN is rejected too
        if !(viewer.zoom_step.is_finite() && viewer.zoom_step > 0.0) {
            anyhow::bail!("zoom_step must be positive, got {}", viewer.zoom_step);
        }
        if !(viewer.max_canvas_width.is_finite() && viewer.max_canvas_width > 0.0) {
            anyhow::bail!(
                "max_canvas_width must be positive, got {}",
                viewer.max_canvas_width
            );
        }
        if self.scan.patterns.is_empty() {
            anyhow::bail!("[scan] patterns must list at least one file pattern");
        }
        for pattern in &self.scan.patterns {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid scan pattern '{}'", pattern))?;
        }
        Ok(())
    }

    /// Lookup tables: the configured replacement file or the embedded defaults
    pub fn load_tables(&self) -> Result<Tables> {
        match self.tables.path {
            Some(ref path) => Tables::load(path),
            None => Tables::embedded(),
        }
    }
}
