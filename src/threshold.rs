//! Coverage threshold validation

use colored::Colorize;

use crate::model::CoverageAnalysis;

/// Result of threshold validation
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub passed: bool,
    pub coverage: u32,
    pub threshold: Option<u32>,
    pub delta: Option<i64>,
}

impl ThresholdResult {
    pub fn print_summary(&self) {
        if let (Some(threshold), Some(delta)) = (self.threshold, self.delta) {
            let status = if delta >= 0 { "✓".green() } else { "✗".red() };
            let delta_str = if delta >= 0 {
                format!("+{}%", delta).green()
            } else {
                format!("{}%", delta).red()
            };

            println!(
                "  {} Component coverage: {}% (threshold: {}%, {})",
                status, self.coverage, threshold, delta_str
            );
        }
    }
}

/// Validate coverage against an optional minimum percentage
pub fn validate_threshold(analysis: &CoverageAnalysis, threshold: Option<u32>) -> ThresholdResult {
    let coverage = analysis.coverage_percentage;

    ThresholdResult {
        passed: threshold.map(|t| coverage >= t).unwrap_or(true),
        coverage,
        threshold,
        delta: threshold.map(|t| coverage as i64 - t as i64),
    }
}

/// Compare statistics between two scans
pub fn compare_analysis(old: &CoverageAnalysis, new: &CoverageAnalysis) -> AnalysisComparison {
    let delta = new.coverage_percentage as i64 - old.coverage_percentage as i64;

    AnalysisComparison {
        old_percentage: old.coverage_percentage,
        new_percentage: new.coverage_percentage,
        delta,
        newly_full: new.fully_covered as i64 - old.fully_covered as i64,
        improved: delta > 0,
        degraded: delta < 0,
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisComparison {
    pub old_percentage: u32,
    pub new_percentage: u32,
    pub delta: i64,
    pub newly_full: i64,
    pub improved: bool,
    pub degraded: bool,
}

impl AnalysisComparison {
    pub fn print_summary(&self) {
        let indicator = if self.delta > 0 {
            "↑".green()
        } else if self.delta < 0 {
            "↓".red()
        } else {
            "→".dimmed()
        };

        let delta_str = if self.delta > 0 {
            format!("+{}%", self.delta).green()
        } else if self.delta < 0 {
            format!("{}%", self.delta).red()
        } else {
            "0%".dimmed()
        };

        println!(
            "  {} Coverage: {}% → {}% ({}, {:+} fully covered)",
            indicator, self.old_percentage, self.new_percentage, delta_str, self.newly_full
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(full: usize, percentage: u32) -> CoverageAnalysis {
        CoverageAnalysis {
            total_components: 10,
            fully_covered: full,
            partially_covered: 0,
            not_covered: 10 - full,
            coverage_percentage: percentage,
        }
    }

    #[test]
    fn test_threshold_validation() {
        let data = analysis(7, 70);

        let result = validate_threshold(&data, Some(60));
        assert!(result.passed);
        assert_eq!(result.delta, Some(10));

        let result = validate_threshold(&data, Some(80));
        assert!(!result.passed);
        assert_eq!(result.delta, Some(-10));

        assert!(validate_threshold(&data, None).passed);
    }

    #[test]
    fn test_analysis_comparison() {
        let comparison = compare_analysis(&analysis(3, 30), &analysis(5, 50));
        assert!(comparison.improved);
        assert!(!comparison.degraded);
        assert_eq!(comparison.delta, 20);
        assert_eq!(comparison.newly_full, 2);
    }
}
