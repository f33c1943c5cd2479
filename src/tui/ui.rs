//! TUI rendering

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap},
};

use super::app::App;
use super::widgets::{FileList, FlowCanvas, HeatmapGrid, TreeCanvas};
use crate::model::TestFile;
use crate::render::viewport::Viewport;
use crate::render::ViewMode;

/// Draw the entire UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // View tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);
    draw_main(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let analysis = app.dashboard.analysis();
    let title = " Hukuk Takip Sistemi - E2E Coverage ";

    let label = format!(
        "{}% ({} full, {} partial, {} none of {} components)",
        analysis.coverage_percentage,
        analysis.fully_covered,
        analysis.partially_covered,
        analysis.not_covered,
        analysis.total_components
    );

    let color = match analysis.coverage_percentage {
        p if p >= 70 => Color::Green,
        p if p >= 40 => Color::Yellow,
        _ => Color::Red,
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .percent(analysis.coverage_percentage.min(100) as u16)
        .label(label);

    frame.render_widget(gauge, area);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = ViewMode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| format!("{} {}", i + 1, mode.label()))
        .collect();
    let selected = ViewMode::ALL
        .iter()
        .position(|m| *m == app.dashboard.view())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.dashboard.filters().describe())),
        )
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).bold());

    frame.render_widget(tabs, area);
}

fn draw_main(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // File list
            Constraint::Percentage(70), // View canvas
        ])
        .split(area);

    draw_file_list(frame, app, chunks[0]);
    draw_canvas(frame, app, chunks[1]);
}

fn draw_file_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let files = app.dashboard.filtered_files();
    let title = format!(" Test Files ({}) ", files.len());

    // The selected file gets a detail pane under the list
    let (list_area, detail_area) = match app.dashboard.selected_file() {
        Some(_) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        }
        None => (area, None),
    };

    let list = FileList::new(&files)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).bold());

    frame.render_stateful_widget(list, list_area, &mut app.file_list_state);

    if let (Some(file), Some(detail_area)) = (app.dashboard.selected_file(), detail_area) {
        let detail = Paragraph::new(file_detail(file))
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", file.name)))
            .wrap(Wrap { trim: true });
        frame.render_widget(detail, detail_area);
    }
}

/// Description, type and per-test coverage of one file
fn file_detail(file: &TestFile) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(file.description.clone()),
        Line::from(Span::styled(
            file.test_type.label().to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    for test in &file.tests {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", test.coverage.symbol()),
                Style::default().fg(test.coverage.color()),
            ),
            Span::raw(test.name.clone()),
        ]));
        if !test.covered_components.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {}", test.covered_components.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines
}

fn draw_canvas(frame: &mut Frame, app: &mut App, area: Rect) {
    let dashboard = &app.dashboard;
    let zoom = match dashboard.view() {
        ViewMode::Tree => format!(" {:.0}%", dashboard.tree_viewport.zoom() * 100.0),
        ViewMode::Flow => format!(" {:.0}%", dashboard.flow_viewport.zoom() * 100.0),
        ViewMode::Heatmap => String::new(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {}{} ", dashboard.view().label(), zoom));
    let inner = block.inner(area);

    match dashboard.view() {
        ViewMode::Tree => frame.render_widget(
            TreeCanvas::new(&dashboard.tree, &dashboard.tree_viewport).block(block),
            area,
        ),
        ViewMode::Flow => frame.render_widget(
            FlowCanvas::new(&dashboard.flow, &dashboard.flow_viewport).block(block),
            area,
        ),
        ViewMode::Heatmap => frame.render_widget(HeatmapGrid::new(&dashboard.heatmap).block(block), area),
    }

    app.canvas_area = inner;
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help = " [1-3/Tab]view [c]overage [t]ype [↑↓]select [+/-/0]zoom [e]xport [r]efresh [q]uit ";

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Percentage(45)])
        .split(area);

    let help_text = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::DarkGray));

    let status = app.status_message.as_deref().unwrap_or("Ready");
    let status_style = if status.starts_with('✗') {
        Style::default().fg(Color::Red)
    } else if status.starts_with('⚠') {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    let status_text = Paragraph::new(status)
        .block(Block::default().borders(Borders::ALL))
        .style(status_style);

    frame.render_widget(help_text, chunks[0]);
    frame.render_widget(status_text, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coverage, TestCase, TestType};

    #[test]
    fn test_file_detail_lists_tests_and_components() {
        let file = TestFile {
            name: "login.spec.ts".to_string(),
            test_type: TestType::Other,
            description: "Login screen".to_string(),
            tests: vec![
                TestCase {
                    name: "logs in".to_string(),
                    coverage: Coverage::Full,
                    covered_components: vec!["Giriş".to_string(), "Giriş Formu".to_string()],
                    user_flow: vec![],
                },
                TestCase {
                    name: "renders".to_string(),
                    coverage: Coverage::None,
                    covered_components: vec![],
                    user_flow: vec![],
                },
            ],
        };

        let text: Vec<String> = file_detail(&file)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text[0], "Login screen");
        assert_eq!(text.len(), 6);
        assert!(text[3].ends_with("logs in"));
        assert_eq!(text[4], "  Giriş, Giriş Formu");
        assert!(text[5].ends_with("renders"));
    }
}
