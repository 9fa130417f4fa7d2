//! Table rendering with comfy-table.
//!
//! | Command          | Table Function          |
//! |------------------|-------------------------|
//! | `emacros list`   | `render_macro_table()`  |
//! | `emacros load`   | `render_load_table()`   |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use emacros_core::{ListEntry, LoadReport, MacroCode};

use super::format::truncate_str;

/// Render bound macros as `NAME  KIND  CODE`.
///
/// The code column is cut to fit `width` columns.
///
/// ```text
/// NAME    KIND     CODE
/// greet   text     "Hello"
/// wrap    events   ( <return> ^A
/// ```
pub fn render_macro_table(entries: &[ListEntry], width: usize) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let name_width = entries
        .iter()
        .map(|e| e.name.as_str().chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let code_width = width.saturating_sub(name_width + 6 + 6).max(10);

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![Cell::new("NAME"), Cell::new("KIND"), Cell::new("CODE")]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(column_width(name_width))),
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ColumnConstraint::UpperBoundary(Width::Fixed(column_width(code_width))),
    ]);

    for entry in entries {
        let kind = match entry.code {
            MacroCode::Text(_) => "text",
            MacroCode::Events(_) => "events",
        };
        table.add_row(vec![
            Cell::new(entry.name.as_str()),
            Cell::new(kind),
            Cell::new(truncate_str(&entry.display, code_width)),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Clamp a width to what comfy-table accepts.
fn column_width(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Render the files a load looked at.
///
/// ```text
/// SCOPE    MACROS   FILE
/// global        2   /home/u/emacros/for-python.el
/// local         -   /work/emacros/for-python.el
/// ```
pub fn render_load_table(report: &LoadReport) -> String {
    if report.files.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec![
        Cell::new("SCOPE"),
        Cell::new("MACROS").set_alignment(CellAlignment::Right),
        Cell::new("FILE"),
    ]);

    for file in &report.files {
        let count = if file.existed {
            file.records.to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(file.scope),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(file.path.display()),
        ]);
    }

    table.trim_fmt().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emacros_core::{KeyEvent, LoadedFile, MacroName, ModeName, Scope};
    use std::path::PathBuf;

    fn entry(name: &str, code: MacroCode) -> ListEntry {
        ListEntry {
            name: MacroName::try_new(name).unwrap(),
            display: code.render(),
            code,
        }
    }

    #[test]
    fn test_macro_table() {
        let entries = vec![
            entry("greet", MacroCode::Text("Hello".into())),
            entry(
                "wrap",
                MacroCode::Events(vec![KeyEvent::Char(40), KeyEvent::Key("return".into())]),
            ),
        ];
        let output = render_macro_table(&entries, 80);
        assert!(output.contains("NAME"));
        assert!(output.contains("greet"));
        assert!(output.contains("\"Hello\""));
        assert!(output.contains("( <return>"));
        assert!(output.contains("events"));
    }

    #[test]
    fn test_column_width_saturates() {
        assert_eq!(column_width(40), 40);
        assert_eq!(column_width(70_000), u16::MAX);
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(render_macro_table(&[], 80), "");
        let report = LoadReport {
            mode: ModeName::new("c"),
            files: Vec::new(),
            cached: vec![Scope::Global, Scope::Local],
        };
        assert_eq!(render_load_table(&report), "");
    }

    #[test]
    fn test_load_table_marks_missing_files() {
        let report = LoadReport {
            mode: ModeName::new("c"),
            files: vec![
                LoadedFile {
                    scope: Scope::Global,
                    path: PathBuf::from("/home/u/.emacros-for-c.el"),
                    existed: true,
                    records: 2,
                    skipped: Vec::new(),
                },
                LoadedFile {
                    scope: Scope::Local,
                    path: PathBuf::from("/w/.emacros-for-c.el"),
                    existed: false,
                    records: 0,
                    skipped: Vec::new(),
                },
            ],
            cached: Vec::new(),
        };
        let output = render_load_table(&report);
        assert!(output.contains("global"));
        assert!(output.contains("/home/u/.emacros-for-c.el"));
        assert!(output.lines().any(|l| l.contains("local") && l.contains('-')));
    }
}
