//! Colored terminal output

use std::io::Write;

use anyhow::Result;
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, NoColor, WriteColor};

use super::{ComparisonReport, OutputFormatter, TableReport};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
        }
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    fn write_header(&self, report: &ComparisonReport, out: &mut dyn WriteColor) -> Result<()> {
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out, " dataassert: {} ⇔ {}", report.expected, report.actual)?;
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out)?;
        Ok(())
    }

    fn write_status(&self, out: &mut dyn WriteColor, color: Color, text: &str) -> Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{}", text)?;
        out.reset()?;
        Ok(())
    }

    fn write_table(&self, table: &TableReport, out: &mut dyn WriteColor) -> Result<()> {
        if table.is_equal() {
            self.write_status(out, Color::Green, "✓")?;
            writeln!(out, " {}", table.table)?;
            return Ok(());
        }

        self.write_status(out, Color::Red, "✗")?;
        writeln!(out, " {}", table.table)?;

        if let Some(failure) = &table.failure {
            self.write_status(out, Color::Red, "  structural mismatch: ")?;
            writeln!(out, "{}", failure)?;
        }

        if !table.differences.is_empty() {
            let mut data = vec![vec![
                "row".to_string(),
                "column".to_string(),
                "expected".to_string(),
                "actual".to_string(),
            ]];
            for difference in &table.differences {
                data.push(vec![
                    difference.row.to_string(),
                    difference.column.clone(),
                    difference.expected.display().into_owned(),
                    difference.actual_display(),
                ]);
            }
            writeln!(out, "{}", build_table(&data))?;
        }
        Ok(())
    }

    fn write_summary(&self, report: &ComparisonReport, out: &mut dyn WriteColor) -> Result<()> {
        writeln!(out)?;
        if !report.has_discrepancies() {
            self.write_status(out, Color::Green, "No differences found.")?;
            writeln!(out)?;
            return Ok(());
        }

        let failed_tables = report.tables.iter().filter(|t| !t.is_equal()).count();
        self.write_status(out, Color::Red, "Summary:")?;
        writeln!(
            out,
            " {} difference(s) in {} of {} table(s)",
            report.difference_count(),
            failed_tables,
            report.tables.len()
        )?;
        Ok(())
    }

    fn write_report(&self, report: &ComparisonReport, out: &mut dyn WriteColor) -> Result<()> {
        self.write_header(report, out)?;

        if let Some(failure) = &report.failure {
            self.write_status(out, Color::Red, "Error: ")?;
            writeln!(out, "{}", failure)?;
        }

        for table in &report.tables {
            self.write_table(table, out)?;
        }

        self.write_summary(report, out)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &ComparisonReport, writer: &mut dyn Write) -> Result<()> {
        match self.color_choice {
            ColorChoice::Never => self.write_report(report, &mut NoColor::new(writer)),
            _ => self.write_report(report, &mut Ansi::new(writer)),
        }
    }
}

/// Build a boxed, column-aligned table from rows of text; the first row is the header
fn build_table(data: &[Vec<String>]) -> String {
    if data.is_empty() || data[0].is_empty() {
        return String::new();
    }

    let col_count = data[0].len();

    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in data {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in col_widths.iter().enumerate() {
            line.push_str(&"─".repeat(*width + 2));
            if i < col_widths.len() - 1 {
                line.push(mid);
            }
        }
        line.push(right);
        line.push('\n');
        line
    };

    let content = |row: &[String]| {
        let mut line = String::from("│");
        for (i, cell) in row.iter().enumerate() {
            let width = col_widths.get(i).copied().unwrap_or(0);
            line.push_str(&format!(" {:width$} │", cell, width = width));
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&content(&data[0]));
    output.push_str(&border('├', '┼', '┤'));
    for row in data.iter().skip(1) {
        output.push_str(&content(row));
    }
    output.push_str(&border('└', '┴', '┘'));

    output
}
