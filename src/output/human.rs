#![forbid(unsafe_code)]

//! Human-readable output for the `check` command
//!
//! One line per error, `<file>: <field>: <message> (<code>)`, followed by a
//! summary line. Root errors have no field segment.

use crate::output::report::{FileReport, Summary};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Human-readable formatter
pub struct HumanFormatter {
    color: ColorChoice,
}

impl HumanFormatter {
    pub fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    /// Writes the report to stdout
    pub fn print(&self, reports: &[FileReport]) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color);
        self.write(&mut stdout, reports)
    }

    /// Writes the report to any color-capable writer
    pub fn write<W: WriteColor>(&self, out: &mut W, reports: &[FileReport]) -> io::Result<()> {
        for report in reports {
            for error in &report.errors {
                out.set_color(ColorSpec::new().set_bold(true))?;
                write!(out, "{}", report.file.display())?;
                out.reset()?;
                write!(out, ": ")?;
                if let Some(field) = &error.field {
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                    write!(out, "{}", field)?;
                    out.reset()?;
                    write!(out, ": ")?;
                }
                writeln!(out, "{} ({})", error.message, error.code)?;
            }
        }

        let summary = Summary::of(reports);
        if summary.passed() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(out, "Check PASSED")?;
            out.reset()?;
            writeln!(out, ": {} file(s) valid", summary.files_checked)?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "Check FAILED")?;
            out.reset()?;
            writeln!(
                out,
                ": {} error(s) in {} of {} file(s)",
                summary.total_errors, summary.files_invalid, summary.files_checked
            )?;
        }

        Ok(())
    }
}
