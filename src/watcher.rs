//! File watcher for automatic report rebuilding
//!
//! Watches the test directory and rewrites the coverage report whenever a
//! recognized test file changes.

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::extractor::Extractor;
use crate::model::CoverageAnalysis;
use crate::threshold::compare_analysis;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Rebuilds the report on test file changes
pub struct ReportWatcher<'a> {
    extractor: &'a Extractor,
    test_dir: PathBuf,
    output: PathBuf,
    last: Option<CoverageAnalysis>,
}

impl<'a> ReportWatcher<'a> {
    pub fn new(extractor: &'a Extractor, test_dir: &Path, output: &Path) -> Self {
        Self {
            extractor,
            test_dir: test_dir.to_path_buf(),
            output: output.to_path_buf(),
            last: None,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.rebuild()?;

        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(&self.test_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", self.test_dir.display()))?;

        println!(
            "\n{} {}\n",
            "Watching for changes in".bold(),
            self.test_dir.display()
        );
        println!("{}", "Press Ctrl+C to stop\n".dimmed());

        self.event_loop(rx)
    }

    fn event_loop(&mut self, rx: Receiver<Event>) -> Result<()> {
        while let Ok(event) = rx.recv() {
            let mut changed = self.relevant_paths(&event);
            if changed.is_empty() {
                continue;
            }

            // Debounce: wait until the directory has been quiet for a while
            loop {
                match rx.recv_timeout(DEBOUNCE) {
                    Ok(event) => {
                        for path in self.relevant_paths(&event) {
                            if !changed.contains(&path) {
                                changed.push(path);
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return Ok(()),
                }
            }

            println!(
                "\n{} {} {}",
                "↻".yellow(),
                "Files changed:".bold(),
                changed.join(", ").dimmed()
            );

            if let Err(e) = self.rebuild() {
                eprintln!("{} Rebuild failed: {:#}", "✗".red(), e);
            }
        }

        Ok(())
    }

    /// Names of recognized test files touched by an event
    fn relevant_paths(&self, event: &Event) -> Vec<String> {
        event
            .paths
            .iter()
            .filter(|p| p.as_path() != self.output.as_path())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .filter(|name| self.extractor.is_test_file(name))
            .collect()
    }

    fn rebuild(&mut self) -> Result<()> {
        let report = self.extractor.build_report(&self.test_dir);
        report.write(&self.output)?;

        let analysis = report.coverage_analysis;
        println!(
            "{} Report written to {} ({} files, {}% coverage)",
            "✓".green(),
            self.output.display(),
            report.test_files.len(),
            analysis.coverage_percentage
        );

        if let Some(previous) = self.last.replace(analysis) {
            compare_analysis(&previous, &analysis).print_summary();
        }

        Ok(())
    }
}
