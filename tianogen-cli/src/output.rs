use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Placeholder for an empty cell.
pub const NONE: &str = "-";

/// Prints `data` as pretty JSON with `--json`, otherwise hands it to `render`.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        render(data);
    }
    Ok(())
}

/// `Module [ARCH]` heading shared by every command, with an optional trailing summary.
pub fn heading(module: &str, arch: &str, summary: Option<&str>) {
    match summary {
        Some(summary) => println!("{module} [{arch}]: {summary}"),
        None => println!("{module} [{arch}]"),
    }
}

/// Cell text for an optional symbol.
pub fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or(NONE)
}

/// Borderless listing of symbols, one row per module, instance or capability.
///
/// A numbered listing gets a leading right-aligned `#` column counted from 1, which is how the
/// constructor order is shown.
pub struct Listing {
    table: Table,
    numbered: bool,
    rows: usize,
    indent: &'static str,
}

impl Listing {
    /// Creates a listing with left-aligned `columns`.
    pub fn new(columns: &[&str]) -> Self {
        Self::build(columns, false)
    }

    /// Creates a listing whose rows are numbered in insertion order.
    pub fn numbered(columns: &[&str]) -> Self {
        Self::build(columns, true)
    }

    fn build(columns: &[&str], numbered: bool) -> Self {
        let mut headers = Vec::with_capacity(columns.len() + 1);
        if numbered {
            headers.push("#");
        }
        headers.extend_from_slice(columns);

        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(headers.clone());

        // Two spaces between columns, none at the outer edges.
        let last = headers.len().saturating_sub(1);
        for index in 0..headers.len() {
            if let Some(column) = table.column_mut(index) {
                if numbered && index == 0 {
                    column.set_cell_alignment(CellAlignment::Right);
                }
                column.set_padding((u16::from(index > 0), u16::from(index < last)));
            }
        }

        Listing {
            table,
            numbered,
            rows: 0,
            indent: "",
        }
    }

    /// Prefixes every printed line with `indent`.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }

    /// Appends a row, values in column order. Empty values print as [`NONE`].
    pub fn row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rows += 1;
        let mut cells = Vec::new();
        if self.numbered {
            cells.push(Cell::new(self.rows));
        }
        cells.extend(values.into_iter().map(|value| {
            let value = value.as_ref();
            Cell::new(if value.is_empty() { NONE } else { value })
        }));
        self.table.add_row(cells);
    }

    /// Renders the listing with trailing whitespace trimmed; an empty listing renders nothing.
    pub fn render(&self) -> String {
        if self.rows == 0 {
            return String::new();
        }
        self.table
            .to_string()
            .lines()
            .map(|line| format!("{}{}\n", self.indent, line.trim_end()))
            .collect()
    }

    /// Prints the listing to stdout.
    pub fn print(&self) {
        print!("{}", self.render());
    }
}
