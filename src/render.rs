// src/render.rs
//! Static HTML page for a `ScoreReport`. Styling comes only from Pico.css.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::analyze::ScoreReport;

const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";

/// Render the full document. `generated_at` is shown as the last update time.
pub fn render_html(report: &ScoreReport, generated_at: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC");

    // `write!` into a String cannot fail
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Clean-News</title>
    <link rel="stylesheet" href="{PICO_CSS}">
</head>
<body>
    <main class="container">
        <header>
            <hgroup>
                <h1>Clean-News</h1>
                <p>极简 · 稳定 · 全局视野 | 最后更新: {stamp}</p>
            </hgroup>
        </header>
"#
    );

    render_trending(&mut out, report);
    out.push_str("        <hr>\n");
    render_sources(&mut out, report);

    out.push_str(
        r#"        <footer>
            <p><small>Powered by Rust &amp; Pico.css</small></p>
        </footer>
    </main>
</body>
</html>
"#,
    );
    out
}

fn render_trending(out: &mut String, report: &ScoreReport) {
    out.push_str("        <section id=\"trending\">\n");
    out.push_str("            <h2>今日全网热词 Top 20</h2>\n");
    out.push_str("            <div class=\"grid\">\n");
    let words: Vec<String> = report
        .top_vocabulary
        .iter()
        .map(|(word, count)| format!("<kbd>{}</kbd> <small>({count})</small>", encode_text(word)))
        .collect();
    let _ = writeln!(out, "                <p>{}</p>", words.join(" &nbsp; "));
    out.push_str("            </div>\n");
    out.push_str("        </section>\n");
}

fn render_sources(out: &mut String, report: &ScoreReport) {
    out.push_str("        <section id=\"news\">\n");
    for (source, items) in report.ranked.iter() {
        out.push_str("            <article>\n");
        let _ = writeln!(
            out,
            "                <header><strong>{}</strong></header>",
            encode_text(source)
        );
        if items.is_empty() {
            out.push_str("                <p>暂无数据或抓取失败。</p>\n");
        } else {
            out.push_str("                <ul>\n");
            for item in items {
                let href = if item.link.is_empty() { "#" } else { item.link.as_str() };
                let _ = writeln!(
                    out,
                    r#"                    <li><a href="{}" target="_blank" rel="noopener noreferrer">{}</a> <mark><small>分值: {}</small></mark></li>"#,
                    encode_double_quoted_attribute(href),
                    encode_text(&item.title),
                    item.score.unwrap_or(0)
                );
            }
            out.push_str("                </ul>\n");
        }
        out.push_str("            </article>\n");
    }
    out.push_str("        </section>\n");
}

/// Write a rendered page to `path`, creating parent directories as needed.
pub fn write_page(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output dir {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("writing page to {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "page written");
    Ok(())
}
