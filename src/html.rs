use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::model::{Coverage, MissingTestEntry, TestFile};
use crate::render::svg::{escape_xml, flow_svg, heatmap_svg, tree_svg, HEATMAP_CELL};
use crate::render::Dashboard;

/// Generate the static HTML coverage dashboard
pub fn generate_dashboard(dashboard: &mut Dashboard, output_path: &Path) -> Result<()> {
    dashboard.render_all();
    let html = build_html(dashboard);
    fs::write(output_path, html)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(())
}

fn build_html(dashboard: &Dashboard) -> String {
    let report = dashboard.report();
    let analysis = dashboard.analysis();
    let timestamp = report.generated_at.format("%Y-%m-%d %H:%M:%S UTC");
    let source_dir = escape_xml(&report.source_dir);

    let file_data_js = script_json(&serde_json::Value::Array(
        report.test_files.iter().enumerate().map(file_entry).collect(),
    ));
    // exportedAt is stamped in the browser at click time
    let export_js = script_json(
        &serde_json::to_value(report.export_document(report.generated_at)).unwrap_or_default(),
    );
    let colors_js = script_json(&serde_json::Value::Object(
        Coverage::ALL
            .iter()
            .map(|c| (c.label().to_string(), serde_json::Value::from(c.hex())))
            .collect(),
    ));

    let type_options: String = crate::model::TestType::ALL
        .iter()
        .map(|t| {
            let count = report.test_files.iter().filter(|f| f.test_type == *t).count();
            format!(r#"<option value="{0}">{0} ({1})</option>"#, t.label(), count)
        })
        .collect();

    let file_items: String = report
        .test_files
        .iter()
        .enumerate()
        .map(|(i, f)| build_file_item(i, f))
        .collect();

    let missing_rows: String = report.missing_tests.iter().map(build_missing_row).collect();

    let fallback_note = dashboard
        .tree
        .fallback_reason()
        .map(|e| format!(r#"<p class="note">Diagram unavailable ({}), showing nested boxes.</p>"#, escape_xml(&e.to_string())))
        .unwrap_or_default();

    let tree = tree_svg(&dashboard.tree);
    let flow = flow_svg(&dashboard.flow);
    let heatmap = heatmap_svg(&dashboard.heatmap);
    let (min_zoom, max_zoom) = dashboard.tree_viewport.bounds();

    format!(
        r##"<!DOCTYPE html>
<html lang="tr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hukuk Takip Sistemi - E2E Coverage</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #0f0f1a;
            color: #eee;
            min-height: 100vh;
        }}
        .header {{
            background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);
            padding: 20px 30px;
            border-bottom: 1px solid #2d2d44;
            display: flex;
            justify-content: space-between;
            align-items: center;
            flex-wrap: wrap;
            gap: 15px;
        }}
        .header-left h1 {{ color: #00d4ff; font-size: 28px; margin-bottom: 5px; }}
        .header-left p {{ color: #888; font-size: 14px; }}
        .summary {{
            display: flex;
            gap: 20px;
            padding: 20px 30px;
            background: #1a1a2e;
            border-bottom: 1px solid #2d2d44;
            flex-wrap: wrap;
        }}
        .summary-card {{
            background: #16213e;
            padding: 15px 25px;
            border-radius: 10px;
            text-align: center;
            min-width: 120px;
        }}
        .summary-card.full {{ border-left: 4px solid #26a69a; }}
        .summary-card.partial {{ border-left: 4px solid #ffd700; }}
        .summary-card.none {{ border-left: 4px solid #ef5350; }}
        .summary-card.rate {{ border-left: 4px solid #00d4ff; }}
        .summary-value {{ font-size: 28px; font-weight: bold; }}
        .summary-value.green {{ color: #26a69a; }}
        .summary-value.gold {{ color: #ffd700; }}
        .summary-value.red {{ color: #ef5350; }}
        .summary-value.blue {{ color: #00d4ff; }}
        .summary-label {{ font-size: 12px; color: #888; margin-top: 5px; }}

        .filter-bar {{
            padding: 15px 30px;
            background: #16213e;
            border-bottom: 1px solid #2d2d44;
            display: flex;
            gap: 15px;
            flex-wrap: wrap;
            align-items: center;
        }}
        .filter-bar select, .filter-btn {{
            padding: 10px 20px;
            background: #1a1a2e;
            border: 1px solid #2d2d44;
            color: #aaa;
            cursor: pointer;
            border-radius: 8px;
            font-size: 13px;
        }}
        .filter-btn:hover {{ background: #1f2b47; color: #fff; }}
        .filter-btn.active {{ background: #00d4ff; color: #000; border-color: #00d4ff; }}

        .main-content {{ display: flex; min-height: calc(100vh - 250px); }}
        .sidebar {{
            width: 300px;
            background: #1a1a2e;
            border-right: 1px solid #2d2d44;
            overflow-y: auto;
            max-height: calc(100vh - 250px);
        }}
        .sidebar-item {{
            padding: 12px 20px;
            border-bottom: 1px solid #2d2d44;
            cursor: pointer;
            transition: all 0.2s;
        }}
        .sidebar-item:hover {{ background: #16213e; }}
        .sidebar-item.active {{ background: #16213e; border-left: 3px solid #00d4ff; }}
        .sidebar-item.hidden {{ display: none; }}
        .sidebar-item .name {{ font-size: 14px; }}
        .sidebar-item .meta {{ font-size: 11px; color: #666; margin-top: 4px; }}
        .badge {{
            display: inline-block;
            padding: 2px 8px;
            border-radius: 10px;
            font-size: 10px;
            margin-left: 4px;
            text-transform: uppercase;
        }}
        .badge.full {{ background: #1b4332; color: #26a69a; }}
        .badge.partial {{ background: #4a3f00; color: #ffd700; }}
        .badge.none {{ background: #4a1c1c; color: #ef5350; }}

        .detail-panel {{ flex: 1; padding: 30px; overflow: auto; }}
        .view {{ display: none; }}
        .view.active {{ display: block; }}
        .view-frame {{
            background: #1a1a2e;
            border: 1px solid #2d2d44;
            border-radius: 12px;
            overflow: auto;
            max-height: 70vh;
        }}
        .zoom-bar {{ margin-bottom: 10px; display: flex; gap: 8px; align-items: center; color: #888; }}
        .note {{ color: #ffd700; margin-bottom: 10px; font-size: 13px; }}

        .section-title {{ color: #00d4ff; font-size: 22px; margin: 30px 0 20px; }}
        .matrix-table {{ width: 100%; border-collapse: collapse; }}
        .matrix-table th, .matrix-table td {{ padding: 12px; text-align: left; border: 1px solid #2d2d44; }}
        .matrix-table th {{ background: #16213e; color: #00d4ff; }}
        .matrix-table tr:nth-child(even) {{ background: rgba(22, 33, 62, 0.5); }}
        .priority-high {{ color: #ef5350; font-weight: bold; }}
        .priority-medium {{ color: #ffd700; }}
        .priority-low {{ color: #888; }}
    </style>
</head>
<body>
    <div class="header">
        <div class="header-left">
            <h1>Hukuk Takip Sistemi</h1>
            <p>E2E coverage of {source_dir} - {timestamp}</p>
        </div>
        <button class="filter-btn" onclick="exportReport()">Export JSON</button>
    </div>

    <div class="summary">
        <div class="summary-card rate">
            <div class="summary-value blue">{percentage}%</div>
            <div class="summary-label">Coverage</div>
        </div>
        <div class="summary-card full">
            <div class="summary-value green">{full}</div>
            <div class="summary-label">Fully covered</div>
        </div>
        <div class="summary-card partial">
            <div class="summary-value gold">{partial}</div>
            <div class="summary-label">Partially covered</div>
        </div>
        <div class="summary-card none">
            <div class="summary-value red">{none}</div>
            <div class="summary-label">Not covered</div>
        </div>
        <div class="summary-card">
            <div class="summary-value">{total}</div>
            <div class="summary-label">Components</div>
        </div>
    </div>

    <div class="filter-bar">
        <button class="filter-btn view-btn active" onclick="showView('tree', this)">Tree</button>
        <button class="filter-btn view-btn" onclick="showView('flow', this)">Flow</button>
        <button class="filter-btn view-btn" onclick="showView('heatmap', this)">Heatmap</button>
        <span style="color:#444; margin: 0 10px;">|</span>
        <select id="coverageFilter" onchange="filterFiles()">
            <option value="all">All coverage</option>
            <option value="full">Full</option>
            <option value="partial">Partial</option>
            <option value="none">None</option>
        </select>
        <select id="typeFilter" onchange="filterFiles()">
            <option value="all">All types</option>
            {type_options}
        </select>
    </div>

    <div class="main-content">
        <div class="sidebar" id="fileList">
            {file_items}
        </div>

        <div class="detail-panel">
            <div id="view-tree" class="view active">
                {fallback_note}
                <div class="zoom-bar">
                    <button class="filter-btn" onclick="zoomTree(1)">+</button>
                    <button class="filter-btn" onclick="zoomTree(-1)">-</button>
                    <button class="filter-btn" onclick="zoomTree(0)">Reset</button>
                    <span id="zoomLevel">100%</span>
                </div>
                <div class="view-frame">{tree}</div>
            </div>
            <div id="view-flow" class="view">
                <div class="view-frame">{flow}</div>
            </div>
            <div id="view-heatmap" class="view">
                <div class="view-frame">{heatmap}</div>
            </div>

            <h2 class="section-title">Missing Tests</h2>
            <table class="matrix-table">
                <thead>
                    <tr><th>Component</th><th>Priority</th><th>Description</th></tr>
                </thead>
                <tbody>{missing_rows}</tbody>
            </table>
        </div>
    </div>

    <script>
        const files = {file_data_js};
        const exportDocument = {export_js};
        const COLORS = {colors_js};
        const LEVELS = ['none', 'partial', 'full'];
        const HEATMAP_CELL = {heatmap_cell};
        const MIN_ZOOM = {min_zoom}, MAX_ZOOM = {max_zoom}, ZOOM_STEP = {zoom_step};
        let treeZoom = 1.0;

        function showView(name, btn) {{
            document.querySelectorAll('.view').forEach(v => v.classList.remove('active'));
            document.getElementById('view-' + name).classList.add('active');
            document.querySelectorAll('.view-btn').forEach(b => b.classList.remove('active'));
            btn.classList.add('active');
            if (name !== 'tree') zoomTree(0);
        }}

        function filterFiles() {{
            const coverage = document.getElementById('coverageFilter').value;
            const type = document.getElementById('typeFilter').value;
            const visible = new Set();
            document.querySelectorAll('.sidebar-item[data-id]').forEach(item => {{
                const file = files[parseInt(item.dataset.id)];
                const coverageOk = coverage === 'all' || file.levels.includes(coverage);
                const typeOk = type === 'all' || file.type === type;
                item.classList.toggle('hidden', !(coverageOk && typeOk));
                if (coverageOk && typeOk) {{
                    visible.add(file.name);
                }} else {{
                    item.classList.remove('active');
                }}
            }});
            recolorComponents(files.filter(f => visible.has(f.name)));
            filterHeatmap(visible);
        }}

        // A component takes the highest level any visible file gives it
        function recolorComponents(visibleFiles) {{
            const level = {{}};
            visibleFiles.forEach(f => Object.entries(f.components).forEach(([name, l]) => {{
                level[name] = Math.max(level[name] || 0, LEVELS.indexOf(l));
            }}));
            const colorOf = el => COLORS[LEVELS[level[el.dataset.component] || 0]];
            document.querySelectorAll('#tree-svg circle[data-component], #flow-svg circle[data-component]')
                .forEach(el => el.setAttribute('fill', colorOf(el)));
            document.querySelectorAll('#tree-svg rect[data-component]')
                .forEach(el => el.setAttribute('stroke', colorOf(el)));
        }}

        function filterHeatmap(visible) {{
            let shown = 0;
            document.querySelectorAll('#heatmap-svg .heatmap-row').forEach(row => {{
                const show = visible.has(row.dataset.file);
                row.style.display = show ? '' : 'none';
                if (show) {{
                    const shift = (shown - parseInt(row.dataset.row)) * HEATMAP_CELL;
                    row.setAttribute('transform', `translate(0, ${{shift}})`);
                    shown++;
                }}
            }});
            const empty = document.querySelector('#heatmap-svg .heatmap-empty');
            if (empty) empty.setAttribute('visibility', shown === 0 ? 'visible' : 'hidden');
        }}

        function selectFile(id) {{
            document.querySelectorAll('.sidebar-item').forEach(i => i.classList.remove('active'));
            document.querySelector(`.sidebar-item[data-id="${{id}}"]`).classList.add('active');
        }}

        function zoomTree(direction) {{
            if (direction === 0) {{
                treeZoom = 1.0;
            }} else {{
                treeZoom = Math.round((treeZoom + direction * ZOOM_STEP) * 1000) / 1000;
                treeZoom = Math.min(MAX_ZOOM, Math.max(MIN_ZOOM, treeZoom));
            }}
            const g = document.querySelector('#tree-svg .viewport');
            if (g) g.setAttribute('transform', `scale(${{treeZoom}})`);
            document.getElementById('zoomLevel').textContent = Math.round(treeZoom * 100) + '%';
        }}

        function exportReport() {{
            const doc = Object.assign({{}}, exportDocument, {{ exportedAt: new Date().toISOString() }});
            const blob = new Blob([JSON.stringify(doc, null, 2)], {{ type: 'application/json' }});
            const stamp = new Date().toISOString().replace(/[-:]/g, '').replace('T', '-').slice(0, 15);
            const link = document.createElement('a');
            link.href = URL.createObjectURL(blob);
            link.download = `coverage-export-${{stamp}}.json`;
            link.click();
            URL.revokeObjectURL(link.href);
        }}
    </script>
</body>
</html>"##,
        source_dir = source_dir,
        timestamp = timestamp,
        percentage = analysis.coverage_percentage,
        full = analysis.fully_covered,
        partial = analysis.partially_covered,
        none = analysis.not_covered,
        total = analysis.total_components,
        type_options = type_options,
        file_items = file_items,
        fallback_note = fallback_note,
        tree = tree,
        flow = flow,
        heatmap = heatmap,
        missing_rows = missing_rows,
        file_data_js = file_data_js,
        export_js = export_js,
        colors_js = colors_js,
        heatmap_cell = HEATMAP_CELL,
        min_zoom = min_zoom,
        max_zoom = max_zoom,
        zoom_step = dashboard.viewer().zoom_step,
    )
}

fn file_entry((index, file): (usize, &TestFile)) -> serde_json::Value {
    let levels: Vec<&str> = Coverage::ALL
        .iter()
        .filter(|c| file.has_coverage(**c))
        .map(|c| c.label())
        .collect();

    // Highest level this file gives each component it mentions
    let components: BTreeMap<&str, &str> = file
        .tests
        .iter()
        .flat_map(|t| &t.covered_components)
        .filter_map(|name| {
            file.component_level(name)
                .map(|level| (name.as_str(), level.label()))
        })
        .collect();

    serde_json::json!({
        "id": index,
        "name": file.name,
        "type": file.test_type.label(),
        "levels": levels,
        "components": components,
        "tests": file.tests.len(),
    })
}

/// JSON safe to inline in a script element
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn build_file_item(index: usize, file: &TestFile) -> String {
    let badges: String = Coverage::ALL
        .iter()
        .map(|c| (c, file.tests.iter().filter(|t| t.coverage == *c).count()))
        .filter(|(_, count)| *count > 0)
        .map(|(c, count)| format!(r#"<span class="badge {0}">{0} {1}</span>"#, c.label(), count))
        .collect();

    format!(
        r##"<div class="sidebar-item" data-id="{index}" onclick="selectFile({index})">
                <div class="name">{name}</div>
                <div class="meta">{test_type} - {description}</div>
                <div class="meta">{badges}</div>
            </div>"##,
        index = index,
        name = escape_xml(&file.name),
        test_type = file.test_type.label(),
        description = escape_xml(&file.description),
        badges = badges,
    )
}

fn build_missing_row(entry: &MissingTestEntry) -> String {
    format!(
        r#"<tr><td>{}</td><td class="priority-{1}">{1}</td><td>{2}</td></tr>"#,
        escape_xml(&entry.component),
        entry.priority.label(),
        escape_xml(&entry.description),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::extractor::Extractor;
    use crate::structure::app_structure;
    use crate::tables::Tables;
    use tempfile::TempDir;

    #[test]
    fn test_generate_dashboard() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("user-journey.spec.ts"),
            "test('complete </script> journey', async ({ page }) => { await page.goto('/login'); });",
        )
        .unwrap();

        let extractor = Extractor::new(
            Tables::embedded().unwrap(),
            &["*.spec.ts".to_string()],
            app_structure(),
        )
        .unwrap();
        let mut dashboard = Dashboard::new(extractor.build_report(temp_dir.path()), ViewerConfig::default());

        let output = temp_dir.path().join("dashboard.html");
        generate_dashboard(&mut dashboard, &output).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("id=\"tree-svg\""));
        assert!(html.contains("id=\"flow-svg\""));
        assert!(html.contains("id=\"heatmap-svg\""));
        assert!(html.contains("user-journey.spec.ts"));
        assert!(html.contains("Missing Tests"));
        assert!(html.contains("exportedAt: new Date().toISOString()"));
        assert!(html.contains("function recolorComponents"));
        assert!(html.contains("class=\"heatmap-row\""));
        assert!(html.contains("\"full\":\"#26a69a\""));
        // Only the page's own script element is closed
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_file_entry_component_levels() {
        use crate::model::{TestCase, TestType};

        let case = |coverage, components: &[&str]| TestCase {
            name: "t".to_string(),
            coverage,
            covered_components: components.iter().map(|c| c.to_string()).collect(),
            user_flow: vec![],
        };
        let file = TestFile {
            name: "login.spec.ts".to_string(),
            test_type: TestType::Other,
            description: String::new(),
            tests: vec![
                case(Coverage::Partial, &["Giriş", "Giriş Formu"]),
                case(Coverage::Full, &["Giriş"]),
                case(Coverage::None, &["Şifremi Unuttum"]),
            ],
        };

        let entry = file_entry((3, &file));
        assert_eq!(entry["id"], 3);
        assert_eq!(entry["components"]["Giriş"], "full");
        assert_eq!(entry["components"]["Giriş Formu"], "partial");
        assert_eq!(entry["components"]["Şifremi Unuttum"], "none");
        assert_eq!(entry["levels"], serde_json::json!(["full", "partial", "none"]));
    }
}
