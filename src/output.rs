//! Column-aligned table output for listings

use tabled::builder::Builder;
use tabled::settings::{Padding, Style};

/// Accumulates rows and prints them as left-aligned columns.
pub struct TabWriter {
    builder: Builder,
    rows: usize,
}

impl TabWriter {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Builder::default();
        builder.push_record(header.into_iter().map(Into::into).collect::<Vec<String>>());
        Self { builder, rows: 0 }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.builder
            .push_record(cells.into_iter().map(|c| c.to_string()).collect::<Vec<String>>());
        self.rows += 1;
    }

    /// Data rows written so far, header excluded
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn render(self) -> String {
        let mut table = self.builder.build();
        table.with(Style::empty()).with(Padding::new(0, 2, 0, 0));
        table
            .to_string()
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print(self) {
        if self.is_empty() {
            tracing::info!("No results");
        }
        println!("{}", self.render());
    }
}

/// First `max` characters of `s`, with `...` appended when cut.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
