use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Line-oriented Markdown to LaTeX translation. Headings map to the
/// sectioning commands, `$$` blocks become `equation` environments, pipe
/// tables become `booktabs` tabulars, annotation comments are dropped.
pub fn markdown_to_latex(markdown: &str) -> String {
    let mut out: Vec<String> = vec![
        "\\documentclass{article}".to_string(),
        "\\usepackage[utf8]{inputenc}".to_string(),
        "\\usepackage[russian,english]{babel}".to_string(),
        "\\usepackage{amsmath}".to_string(),
        "\\usepackage{amssymb}".to_string(),
        "\\usepackage{graphicx}".to_string(),
        "\\usepackage{booktabs}".to_string(),
        String::new(),
        "\\begin{document}".to_string(),
        String::new(),
    ];

    let lines: Vec<&str> = markdown.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.starts_with("<!--") {
            i += 1;
            continue;
        }

        if line.starts_with('#') {
            let level = line.chars().take_while(|c| *c == '#').count();
            let text = line.trim_start_matches('#').trim();
            let command = match level {
                1 => "section",
                2 => "subsection",
                _ => "subsubsection",
            };
            out.push(format!("\\{}{{{}}}", command, text));
        } else if line.starts_with("$$") {
            let mut formula = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("$$") {
                formula.push(lines[i]);
                i += 1;
            }
            out.push("\\begin{equation}".to_string());
            out.push(formula.join("\n"));
            out.push("\\end{equation}".to_string());
        } else if line.contains('$') {
            out.push(inline_math_re().replace_all(line, "\\($1\\)").into_owned());
        } else if line.starts_with("- ") || line.starts_with("* ") {
            out.push("\\begin{itemize}".to_string());
            while i < lines.len() {
                let item = lines[i].trim();
                if !(item.starts_with("- ") || item.starts_with("* ")) {
                    break;
                }
                out.push(format!("  \\item {}", &item[2..]));
                i += 1;
            }
            out.push("\\end{itemize}".to_string());
            continue;
        } else if line.starts_with('|') {
            let mut table = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('|') {
                table.push(lines[i].trim());
                i += 1;
            }
            emit_table(&mut out, &table);
            continue;
        } else if !line.is_empty() {
            out.push(line.to_string());
            out.push(String::new());
        }

        i += 1;
    }

    out.push(String::new());
    out.push("\\end{document}".to_string());
    debug!("latex render: {} lines", out.len());
    out.join("\n")
}

fn inline_math_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([^$]+)\$").unwrap())
}

fn emit_table(out: &mut Vec<String>, table_lines: &[&str]) {
    let rows: Vec<Vec<&str>> = table_lines
        .iter()
        .filter(|line| !line.contains("---"))
        .map(|line| {
            let cells: Vec<&str> = line.split('|').map(str::trim).collect();
            // First and last entries are the empty outside of the pipes.
            cells[1..cells.len().saturating_sub(1)].to_vec()
        })
        .collect();

    let Some(header) = rows.first() else {
        return;
    };

    out.push("\\begin{table}[h]".to_string());
    out.push("\\centering".to_string());
    out.push(format!("\\begin{{tabular}}{{{}}}", "c".repeat(header.len())));
    out.push("\\toprule".to_string());
    out.push(format!("{} \\\\", header.join(" & ")));
    out.push("\\midrule".to_string());
    for row in &rows[1..] {
        out.push(format!("{} \\\\", row.join(" & ")));
    }
    out.push("\\bottomrule".to_string());
    out.push("\\end{tabular}".to_string());
    out.push("\\end{table}".to_string());
}
