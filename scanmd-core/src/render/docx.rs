use std::io::{Seek, Write};
use std::sync::OnceLock;

use docx_rs::{
    AlignmentType, Docx, Paragraph, Run, RunFonts, Table, TableCell, TableRow,
};
use regex::Regex;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{DocxWriteSnafu, ScanmdError};

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").unwrap())
}

/// Renders Markdown into a DOCX package on `writer`. Headings become
/// sized bold runs, pipe tables become real tables, `$$` blocks are kept
/// as centered monospace text since OMML equations are out of reach.
pub fn markdown_to_docx<W: Write + Seek>(
    markdown: &str,
    writer: W,
    path: &str,
) -> Result<(), ScanmdError> {
    let mut doc = Docx::new();

    let lines: Vec<&str> = markdown.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() || line.starts_with("<!--") {
            i += 1;
            continue;
        }

        if line.starts_with('#') {
            let level = line.chars().take_while(|c| *c == '#').count();
            let text = line.trim_start_matches('#').trim();
            doc = doc.add_paragraph(heading(text, level));
        } else if line.starts_with("- ") || line.starts_with("* ") {
            let text = format!("\u{2022} {}", line[2..].trim());
            doc = doc.add_paragraph(plain(&text));
        } else if line.starts_with('|') {
            let mut table = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('|') {
                table.push(lines[i].trim());
                i += 1;
            }
            if let Some(table) = build_table(&table) {
                doc = doc.add_table(table);
            }
            continue;
        } else if line.starts_with("$$") {
            let mut formula = vec![line];
            i += 1;
            while i < lines.len() && !lines[i].trim().ends_with("$$") {
                formula.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                formula.push(lines[i]);
            }
            doc = doc.add_paragraph(formula_paragraph(&formula.join("\n")));
        } else if numbered_re().is_match(line) {
            // Numbered items stay literal; real numbering needs an
            // abstract numbering definition per list.
            doc = doc.add_paragraph(plain(line));
        } else {
            doc = doc.add_paragraph(plain(line));
        }

        i += 1;
    }

    debug!("docx render: packing {}", path);
    doc.build().pack(writer).context(DocxWriteSnafu { path })?;
    Ok(())
}

fn plain(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn heading(text: &str, level: usize) -> Paragraph {
    // Half-point sizes, stepping down per level.
    let size = match level {
        1 => 48,
        2 => 36,
        _ => 28,
    };
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
}

fn formula_paragraph(formula: &str) -> Paragraph {
    let text = formula.replace("$$", "");
    Paragraph::new()
        .align(AlignmentType::Center)
        .add_run(
            Run::new()
                .add_text(text.trim())
                .fonts(RunFonts::new().ascii("Courier New"))
                .size(20),
        )
}

fn build_table(table_lines: &[&str]) -> Option<Table> {
    let rows: Vec<Vec<&str>> = table_lines
        .iter()
        .filter(|line| !line.contains("---"))
        .map(|line| {
            let cells: Vec<&str> = line.split('|').map(str::trim).collect();
            cells[1..cells.len().saturating_sub(1)].to_vec()
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            TableRow::new(
                row.iter()
                    .map(|cell| TableCell::new().add_paragraph(plain(cell)))
                    .collect(),
            )
        })
        .collect();

    Some(Table::new(table_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn render(markdown: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        markdown_to_docx(markdown, &mut buffer, "test.docx").unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_produces_zip_container() {
        let bytes = render("# Title\n\nSome text.");
        // Local file header magic of the OOXML zip.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_table_and_formula_accepted() {
        let bytes = render("| a | b |\n| --- | --- |\n| 1 | 2 |\n\n$$\nE = mc^2\n$$\n");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let with_noise = render("<!-- Page 1 -->\n\n\ntext");
        let clean = render("text");
        assert_eq!(with_noise.len(), clean.len());
    }
}
