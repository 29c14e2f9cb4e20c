/// Backslash-escape `[`, `]`, `(`, `)` so the text can sit inside a Markdown link.
pub(crate) fn escape_link_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Collapse line breaks to spaces so user text cannot split a heading.
pub(crate) fn one_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
