use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Table};
use std::fmt::Display;
use std::io::{self, IsTerminal};

/// Table with the standard look and bold headers
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Marked status line, wrapped in `color` when one is given
fn status_line(marker: &str, message: impl Display, color: Option<&str>) -> String {
    match color {
        Some(color) => format!("{}{} {}{}", color, marker, message, RESET),
        None => format!("{} {}", marker, message),
    }
}

fn stderr_color(color: &'static str) -> Option<&'static str> {
    io::stderr().is_terminal().then_some(color)
}

pub fn success(message: impl Display) {
    println!("{}", status_line("✓", message, None));
}

/// Failure line on stderr, red when stderr is a terminal
pub fn failure(message: impl Display) {
    eprintln!("{}", status_line("✗", message, stderr_color(RED)));
}

pub fn warning(message: impl Display) {
    eprintln!("{}", status_line("!", message, stderr_color(YELLOW)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_headers() {
        let mut table = table(&["NAME", "SIZE"]);
        table.add_row(vec!["nginx", "1.50 KB"]);
        let rendered = table.to_string();
        assert!(rendered.contains("NAME"));
        assert!(rendered.contains("1.50 KB"));
        assert!(rendered.contains('╭'));
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(status_line("✗", "boom", None), "✗ boom");
        assert_eq!(
            status_line("✗", "boom", Some(RED)),
            "\x1b[31m✗ boom\x1b[0m"
        );
        assert_eq!(
            status_line("!", "skipped us-east1", Some(YELLOW)),
            "\x1b[33m! skipped us-east1\x1b[0m"
        );
    }
}
