//! User-facing output
//!
//! Progress lines go to stdout and disappear under `--quiet`. The summary
//! line `domain<TAB>ip` and error messages are never suppressed. Diagnostic
//! logging is separate and goes through `tracing`.

use crate::domain::DomainName;
use crate::error::{Error, Result};
use colored::{Color, Colorize};
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::net::Ipv4Addr;

/// The palette status lines may be drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Header,
    Info,
    Success,
    Warning,
    Failure,
}

impl From<Colour> for Color {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Header => Color::BrightMagenta,
            Colour::Info => Color::BrightBlue,
            Colour::Success => Color::BrightGreen,
            Colour::Warning => Color::BrightYellow,
            Colour::Failure => Color::BrightRed,
        }
    }
}

/// Writes status lines, the summary line and errors
pub struct Reporter {
    quiet: bool,
    colour_out: bool,
    colour_err: bool,
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Reporter {
    /// Reporter over the process's stdout and stderr
    ///
    /// Colour is used only on streams attached to a terminal.
    pub fn stdio(quiet: bool) -> Self {
        Self {
            quiet,
            colour_out: io::stdout().is_terminal(),
            colour_err: io::stderr().is_terminal(),
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    /// Reporter over arbitrary sinks
    pub fn new(
        quiet: bool,
        colour: bool,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            quiet,
            colour_out: colour,
            colour_err: colour,
            out,
            err,
        }
    }

    /// Print a progress line, unless quiet
    pub fn verbose(&mut self, msg: impl Display, colour: Option<Colour>) {
        if self.quiet {
            return;
        }

        let line = paint(msg.to_string(), colour, self.colour_out);
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::debug!("Failed to write progress line: {}", e);
        }
    }

    /// Print the `domain<TAB>ip` result line
    pub fn summary(&mut self, domain: &DomainName, ip: Ipv4Addr) -> Result<()> {
        writeln!(self.out, "{}\t{}", domain, ip)
            .and_then(|()| self.out.flush())
            .map_err(Error::Output)
    }

    /// Print an error message in the failure colour
    pub fn error(&mut self, msg: impl Display) {
        let line = paint(msg.to_string(), Some(Colour::Failure), self.colour_err);
        if let Err(e) = writeln!(self.err, "{}", line) {
            tracing::debug!("Failed to write error line: {}", e);
        }
    }
}

fn paint(msg: String, colour: Option<Colour>, enabled: bool) -> String {
    match colour {
        Some(colour) if enabled => msg.color(Color::from(colour)).to_string(),
        _ => msg,
    }
}
