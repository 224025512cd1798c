use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// How command results are rendered on stdout.
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Bordered tables
    #[default]
    Table,
    /// Pretty-printed JSON, one document per command
    Json,
    /// One line per record
    Compact,
}

/// Flags shared by every subcommand.
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered as a table or a single line.
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// One row of a list table.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
    fn compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        let rendered = match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(&self.options).to_string(),
            OutputFormat::Compact => data.to_compact(),
        };
        println!("{rendered}");
        Ok(())
    }

    /// Status lines are suppressed in JSON mode so stdout stays parseable.
    fn chatty(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    fn decorate(&self, icon: &str, color: Color, message: &str) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.decorate(ICONS.success, THEME.success, message));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.decorate(ICONS.warning, THEME.warning, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.decorate(ICONS.info, THEME.info, message));
        }
    }

    /// Only shown with `--verbose`; goes to stderr.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.arrow, THEME.muted, message));
        }
    }
}

pub fn new_table(options: &GlobalOptions) -> Table {
    let preset = if options.no_color {
        comfy_table::presets::ASCII_FULL
    } else {
        comfy_table::presets::UTF8_FULL_CONDENSED
    };
    let mut table = Table::new();
    table.load_preset(preset);
    table
}

pub fn set_header(table: &mut Table, headers: &[&str], options: &GlobalOptions) {
    let cells: Vec<Cell> = headers
        .iter()
        .map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(cells);
}

/// Two-column field/value table for a single record.
pub fn record_table(rows: &[(&str, String)], options: &GlobalOptions) -> Table {
    let mut table = new_table(options);
    set_header(&mut table, &["Field", "Value"], options);
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

impl<T> TableDisplay for Vec<T>
where
    T: TableRow,
{
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = new_table(options);
        if self.is_empty() {
            table.add_row(vec![Cell::new("Nothing to show")]);
            return table;
        }
        set_header(&mut table, T::HEADERS, options);
        for item in self {
            table.add_row(item.cells());
        }
        table
    }

    fn to_compact(&self) -> String {
        if self.is_empty() {
            return "Count: 0".to_string();
        }
        self.iter().map(TableRow::compact).collect::<Vec<_>>().join("\n")
    }
}
