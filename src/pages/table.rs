use terminal_size::{terminal_size, Width};

// Render rows as an ASCII table fitted to the terminal.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    render_table_width(headers, rows, terminal_width())
}

/// Same as [`render_table`] with an explicit total width budget.
pub fn render_table_width(headers: &[&str], rows: &[Vec<String>], max_width: usize) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    // cap each column to keep the table within the budget
    let overhead = 3 * cols.len() + 1;
    let max_col_width = (max_width.saturating_sub(overhead) / cols.len()).max(4);
    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(max_col_width)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(max_col_width); }
        }
    }

    let sep = build_separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&build_row(&cols, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for r in rows {
        out.push_str(&build_row(r, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format!("rows: {}", rows.len()));
    out
}

fn terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) if w > 20 => (w - 4) as usize,
        _ => 120,
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = w.saturating_sub(display_len(&text));
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

// crude detection for right-aligning prices and totals
fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}
