//! Terminal rendering for command outputs.
//!
//! Turns transport-agnostic [`CommandOutput`] values into styled text on any
//! writer. Colors go through crossterm and can be switched off, which is how
//! tests and non-terminal output get plain text.

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::commands::CommandOutput;

/// Writes command outputs to a terminal (or any writer).
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Creates a renderer that styles its output.
    pub fn new(out: W) -> Self {
        Self { out, color: true }
    }

    /// Creates a renderer that writes plain text.
    pub fn plain(out: W) -> Self {
        Self { out, color: false }
    }

    /// Consumes the renderer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes the input prompt without a trailing newline.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            write!(self.out, "{}", text.bold())?;
        } else {
            write!(self.out, "{text}")?;
        }
        self.out.flush()
    }

    /// Renders every output in order.
    pub fn render_all(&mut self, outputs: &[CommandOutput]) -> io::Result<()> {
        for output in outputs {
            self.render(output)?;
        }
        self.out.flush()
    }

    /// Renders a single output.
    pub fn render(&mut self, output: &CommandOutput) -> io::Result<()> {
        match output {
            CommandOutput::Info(msg) => writeln!(self.out, "{msg}"),
            CommandOutput::Error(msg) => {
                if self.color {
                    writeln!(self.out, "{}", msg.as_str().red())
                } else {
                    writeln!(self.out, "{msg}")
                }
            }
            CommandOutput::Status { connected, text } => self.render_status(*connected, text),
            CommandOutput::Code { language, text } => self.render_code(language, text),
            CommandOutput::Table { headers, rows } => {
                writeln!(self.out, "{}", format_table(headers, rows))
            }
            CommandOutput::Expandable { title, body } => self.render_expandable(title, body),
        }
    }

    fn render_status(&mut self, connected: bool, text: &str) -> io::Result<()> {
        let badge = if connected { "● connected" } else { "● disconnected" };
        if !self.color {
            return writeln!(self.out, "[{badge}] {text}");
        }
        if connected {
            writeln!(self.out, "{} {}", badge.green().bold(), text.green())
        } else {
            writeln!(self.out, "{} {}", badge.red().bold(), text.red())
        }
    }

    fn render_code(&mut self, language: &str, text: &str) -> io::Result<()> {
        let fence = format!("```{language}");
        if self.color {
            writeln!(self.out, "{}", fence.as_str().dark_grey())?;
            for line in text.lines() {
                writeln!(self.out, "{}", line.cyan())?;
            }
            writeln!(self.out, "{}", "```".dark_grey())
        } else {
            writeln!(self.out, "{fence}")?;
            for line in text.lines() {
                writeln!(self.out, "{line}")?;
            }
            writeln!(self.out, "```")
        }
    }

    fn render_expandable(&mut self, title: &str, body: &str) -> io::Result<()> {
        let header = format!("▾ {title}");
        if self.color {
            writeln!(self.out, "{}", header.as_str().bold())?;
        } else {
            writeln!(self.out, "{header}")?;
        }
        for line in body.trim().lines() {
            if self.color {
                writeln!(self.out, "{} {}", "│".dark_grey(), line.italic())?;
            } else {
                writeln!(self.out, "│ {line}")?;
            }
        }
        Ok(())
    }
}

/// Formats a table as aligned text with a header separator.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    output.push_str(header_line.join(" │ ").trim_end());
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    output.push_str(&separator.join("─┼─"));
    output.push('\n');

    for row in rows {
        let row_line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = width)
            })
            .collect();
        output.push_str(row_line.join(" │ ").trim_end());
        output.push('\n');
    }

    let count = rows.len();
    output.push_str(&format!(
        "({count} row{})",
        if count == 1 { "" } else { "s" }
    ));
    output
}
