use pulldown_cmark::{Options, Parser, html};
use tracing::debug;

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Converted Document</title>
    <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
    <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
    <style>
        body {
            font-family: Arial, sans-serif;
            max-width: 900px;
            margin: 50px auto;
            padding: 20px;
            line-height: 1.6;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            margin: 20px 0;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 12px;
            text-align: left;
        }
        th {
            background-color: #f2f2f2;
        }
        code {
            background-color: #f4f4f4;
            padding: 2px 6px;
            border-radius: 3px;
        }
    </style>
</head>
<body>
"#;

const HTML_TAIL: &str = "</body>\n</html>";

/// Renders Markdown to a standalone HTML page. MathJax in the template
/// picks up `$$` and `\(..\)` formulas at view time, so formula text
/// passes through untouched.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::new();
    html::push_html(&mut body, parser);
    debug!("html render: {} bytes of body", body.len());

    let mut page = String::with_capacity(HTML_HEAD.len() + body.len() + HTML_TAIL.len());
    page.push_str(HTML_HEAD);
    page.push_str(&body);
    page.push_str(HTML_TAIL);
    page
}
