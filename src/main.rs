use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use covmap::config::{Config, CONFIG_FILE};
use covmap::model::Priority;
use covmap::render::Dashboard;
use covmap::threshold::validate_threshold;
use covmap::watcher::ReportWatcher;
use covmap::{app_structure, html, report, tui, CoverageReport, Extractor};

const DEFAULT_DASHBOARD_PATH: &str = "coverage-dashboard.html";

#[derive(Parser)]
#[command(name = "covmap")]
#[command(about = "End-to-end test coverage map for Hukuk Takip Sistemi")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: covmap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan test files and write the coverage report
    Scan {
        /// Test directory (default from config)
        dir: Option<PathBuf>,

        /// Report output path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Explore a report in the terminal
    View {
        /// Report to load (default from config)
        report: Option<PathBuf>,
    },

    /// Write a static HTML dashboard
    Render {
        /// Report to load (default from config)
        report: Option<PathBuf>,

        /// Output path for the HTML dashboard
        #[arg(short, long, default_value = DEFAULT_DASHBOARD_PATH)]
        output: PathBuf,
    },

    /// Write a timestamped JSON export of a report
    Export {
        /// Report to load (default from config)
        report: Option<PathBuf>,

        /// Directory the export is written to
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print statistics and missing tests
    Stats {
        /// Report to load (default from config)
        report: Option<PathBuf>,

        /// Exit with an error when coverage is below this percentage
        #[arg(long)]
        fail_under: Option<u32>,
    },

    /// Rebuild the report whenever test files change
    Watch {
        /// Test directory (default from config)
        dir: Option<PathBuf>,

        /// Report output path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // An explicit config path must exist, the default one is optional
    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Could not load {}", path.display()))?,
        None => Config::load_or_default(Path::new(CONFIG_FILE))?,
    };

    match cli.command {
        Commands::Scan { dir, output } => cmd_scan(&config, dir, output),
        Commands::View { report } => cmd_view(&config, report),
        Commands::Render { report, output } => cmd_render(&config, report, &output),
        Commands::Export { report, dir } => cmd_export(&config, report, &dir),
        Commands::Stats { report, fail_under } => cmd_stats(&config, report, fail_under),
        Commands::Watch { dir, output } => cmd_watch(&config, dir, output),
    }
}

fn extractor(config: &Config) -> Result<Extractor> {
    let tables = config.load_tables()?;
    Extractor::new(tables, &config.scan.patterns, app_structure())
}

fn load_report(config: &Config, path: Option<PathBuf>) -> Result<CoverageReport> {
    let path = path.unwrap_or_else(|| config.scan.output.clone());
    if !path.exists() {
        anyhow::bail!(
            "Report {} not found. Run 'covmap scan' first.",
            path.display()
        );
    }
    CoverageReport::load(&path, &config.load_tables()?)
}

fn cmd_scan(config: &Config, dir: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.scan.dir.clone());
    let output = output.unwrap_or_else(|| config.scan.output.clone());

    println!("{} Scanning {}", "→".cyan(), dir.display());

    let report = extractor(config)?.build_report(&dir);
    report.write(&output)?;

    print_summary(&report);
    println!(
        "\n{} Report written to {}",
        "✓".green(),
        output.display().to_string().green()
    );
    println!("  {} {}", "fingerprint:".dimmed(), report.fingerprint());

    Ok(())
}

fn cmd_view(config: &Config, report: Option<PathBuf>) -> Result<()> {
    let report = load_report(config, report)?;
    let dashboard = Dashboard::new(report, config.viewer);
    tui::run_tui(dashboard, Path::new("."))
}

fn cmd_render(config: &Config, report: Option<PathBuf>, output: &Path) -> Result<()> {
    let report = load_report(config, report)?;
    let mut dashboard = Dashboard::new(report, config.viewer);

    html::generate_dashboard(&mut dashboard, output)?;

    if let Some(error) = dashboard.tree.fallback_reason() {
        eprintln!(
            "{} Tree diagram unavailable ({}), rendered nested boxes instead",
            "⚠".yellow(),
            error
        );
    }
    println!(
        "{} Dashboard generated: {}",
        "✓".green(),
        output.display().to_string().green()
    );

    Ok(())
}

fn cmd_export(config: &Config, report: Option<PathBuf>, dir: &Path) -> Result<()> {
    let report = load_report(config, report)?;
    let path = report::export_report(&report, dir)?;
    println!("{} Exported to {}", "✓".green(), path.display().to_string().green());
    Ok(())
}

fn cmd_stats(config: &Config, report: Option<PathBuf>, fail_under: Option<u32>) -> Result<()> {
    let report = load_report(config, report)?;

    print_summary(&report);
    println!("  {} {}", "fingerprint:".dimmed(), report.fingerprint());

    let result = validate_threshold(&report.coverage_analysis, fail_under);
    if fail_under.is_some() {
        println!();
        result.print_summary();
    }

    if !result.passed {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_watch(config: &Config, dir: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.scan.dir.clone());
    let output = output.unwrap_or_else(|| config.scan.output.clone());

    let extractor = extractor(config)?;
    let mut watcher = ReportWatcher::new(&extractor, &dir, &output);
    watcher.start()
}

fn print_summary(report: &CoverageReport) {
    let analysis = &report.coverage_analysis;
    let test_count: usize = report.test_files.iter().map(|f| f.tests.len()).sum();

    println!(
        "\n{} {} files, {} tests",
        "✓".green(),
        report.test_files.len(),
        test_count
    );
    println!(
        "  {} {}% ({} full, {} partial, {} none of {} components)",
        "Coverage:".bold(),
        analysis.coverage_percentage,
        analysis.fully_covered.to_string().green(),
        analysis.partially_covered.to_string().yellow(),
        analysis.not_covered.to_string().red(),
        analysis.total_components
    );

    if report.missing_tests.is_empty() {
        return;
    }

    println!("\n{}", "Missing tests:".bold());
    for entry in &report.missing_tests {
        let priority = match entry.priority {
            Priority::High => entry.priority.label().red(),
            Priority::Medium => entry.priority.label().yellow(),
            Priority::Low => entry.priority.label().dimmed(),
        };
        println!("  {} {} [{}]", "•".red(), entry.component, priority);
    }
}
