//! HTML report output format.
//!
//! Generates a self-contained HTML report with styling for easy viewing,
//! printing and sharing.

use crate::model::{GradeReport, Status};
use anyhow::Result;

/// Generate and print HTML report output
pub fn print_html(report: &GradeReport) -> Result<()> {
    let html = generate_html_string(report);
    println!("{}", html);
    Ok(())
}

/// Generate HTML as a string (for file output)
pub fn generate_html_string(report: &GradeReport) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>OMR Grade Report - {}</title>
    <style>
        :root {{
            --bg-color: #f7f7fb;
            --card-bg: #ffffff;
            --text-color: #222;
            --text-muted: #666;
            --border-color: #dde1ea;
            --pass: #28a745;
            --fail: #dc3545;
            --accent: #eef1f7;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-color);
            color: var(--text-color);
            line-height: 1.6;
            padding: 2rem;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; }}
        header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border-color);
        }}
        h1 {{ font-size: 1.75rem; font-weight: 600; }}
        .timestamp {{ color: var(--text-muted); font-size: 0.9rem; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat-card {{
            background: var(--card-bg);
            padding: 1.25rem;
            border-radius: 8px;
            border: 1px solid var(--border-color);
        }}
        .stat-value {{ font-size: 2rem; font-weight: 700; }}
        .stat-label {{ color: var(--text-muted); font-size: 0.85rem; }}
        section {{ margin-bottom: 2rem; }}
        h2 {{
            font-size: 1.25rem;
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 1px solid var(--border-color);
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            background: var(--card-bg);
            border-radius: 8px;
            overflow: hidden;
        }}
        th, td {{
            padding: 0.75rem 1rem;
            text-align: left;
            border-bottom: 1px solid var(--border-color);
        }}
        th {{ background: var(--accent); font-weight: 600; }}
        .status {{ padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; color: white; }}
        .status-pass {{ background: var(--pass); }}
        .status-fail {{ background: var(--fail); }}
        .empty {{ text-align: center; padding: 2rem; color: var(--text-muted); }}
        footer {{ text-align: center; color: var(--text-muted); font-size: 0.8rem; margin-top: 2rem; padding-top: 1rem; border-top: 1px solid var(--border-color); }}
        @media print {{ body {{ background: white; padding: 0; }} }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>OMR Grade Report</h1>
            <span class="timestamp">{}</span>
        </header>
"#,
        report.graded_at.format("%Y-%m-%d"),
        report.graded_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html.push_str(&format!(
        r#"        <div class="stats">
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Key Questions</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Sheets Graded</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{} / {}</div>
                <div class="stat-label">Passed / Failed</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{:.2}%</div>
                <div class="stat-label">Average Accuracy</div>
            </div>
        </div>
"#,
        report.key_questions,
        report.results.len(),
        report.pass_count(),
        report.fail_count(),
        report.average_accuracy()
    ));

    html.push_str("        <section>\n            <h2>Results</h2>\n");
    if report.results.is_empty() {
        html.push_str(
            "            <div class=\"empty\">No valid student results.</div>\n",
        );
    } else {
        html.push_str(
            r#"            <table>
                <thead>
                    <tr><th>Student</th><th>Source</th><th>Total Qs</th><th>Correct</th><th>Wrong</th><th>Blank</th><th>Score</th><th>Accuracy (%)</th><th>Status</th></tr>
                </thead>
                <tbody>
"#,
        );
        for r in &report.results {
            let class = match r.status {
                Status::Pass => "status-pass",
                Status::Fail => "status-fail",
            };
            html.push_str(&format!(
                "                    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td><span class=\"status {}\">{}</span></td></tr>\n",
                html_escape(&r.student),
                html_escape(&r.source),
                r.total,
                r.correct,
                r.wrong,
                r.blank,
                r.score,
                r.accuracy,
                class,
                r.status
            ));
        }
        html.push_str("                </tbody>\n            </table>\n");
    }
    html.push_str("        </section>\n");

    if !report.skipped.is_empty() {
        html.push_str(
            r#"        <section>
            <h2>Skipped Sheets</h2>
            <table>
                <thead><tr><th>Student</th><th>Source</th><th>Reason</th></tr></thead>
                <tbody>
"#,
        );
        for s in &report.skipped {
            html.push_str(&format!(
                "                    <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&s.student),
                html_escape(&s.source),
                html_escape(&s.reason)
            ));
        }
        html.push_str("                </tbody>\n            </table>\n        </section>\n");
    }

    html.push_str(&format!(
        r#"        <footer>Generated by omrgrade v{}</footer>
    </div>
</body>
</html>
"#,
        env!("CARGO_PKG_VERSION")
    ));

    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
