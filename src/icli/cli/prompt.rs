//! Terminal implementation of [`Prompter`].
//!
//! Reads through `console` when stdin is a terminal and falls back to plain
//! stdin lines otherwise, so answers can be piped in whatever stdout is. A
//! rejected answer is shown and asked again, up to [`MAX_ATTEMPTS`] times. End
//! of input aborts.

use colored::Colorize;
use console::Term;
use icli::error::{IcliError, Result};
use icli::fields::{FieldKind, FieldRule, FieldValue};
use icli::resolver::Prompter;
use std::io::{self, BufRead, IsTerminal};

pub const MAX_ATTEMPTS: usize = 3;

pub struct TerminalPrompter {
    term: Term,
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            interactive: io::stdin().is_terminal(),
        }
    }

    fn read_line(&self) -> Result<String> {
        if self.interactive {
            return self.term.read_line().map_err(|e| match e.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => IcliError::Aborted,
                _ => IcliError::Io(e),
            });
        }
        let line = read_piped_line(&mut io::stdin().lock())?;
        // Piped input is not echoed; keep the transcript readable.
        self.term.write_line("")?;
        Ok(line)
    }

    /// Prints the question, with `aside` (a default or a hint) dimmed after it.
    fn question(&self, text: &str, aside: Option<&str>) -> Result<()> {
        let mut line = format!("{} {}", "?".green().bold(), text.bold());
        if let Some(aside) = aside {
            line.push_str(&format!(" {}", format!("({})", aside).dimmed()));
        }
        self.term.write_str(&format!("{} ", line))?;
        self.term.flush()?;
        Ok(())
    }

    fn complain(&self, reason: &str) -> Result<()> {
        self.term.write_line(&format!("  {}", reason.red()))?;
        Ok(())
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, rule: &FieldRule, label: &str) -> Result<FieldValue> {
        let hint = match rule.kind {
            FieldKind::Number => Some("number"),
            FieldKind::Text => None,
        };
        for _ in 0..MAX_ATTEMPTS {
            self.question(label, hint)?;
            let raw = self.read_line()?;
            match rule.check(&raw) {
                Ok(value) => return Ok(value),
                Err(IcliError::Validation { reason, .. }) => self.complain(&reason)?,
                Err(e) => return Err(e),
            }
        }
        Err(IcliError::Aborted)
    }

    fn choose(&mut self, message: &str, options: &[String]) -> Result<usize> {
        self.term.write_line(&format!("{} {}", "?".green().bold(), message.bold()))?;
        for (n, option) in options.iter().enumerate() {
            self.term
                .write_line(&format!("  {} {}", format!("{})", n + 1).cyan(), option))?;
        }
        for _ in 0..MAX_ATTEMPTS {
            self.question("Enter a number", None)?;
            let raw = self.read_line()?;
            match raw.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.complain(&format!("Pick a number from 1 to {}", options.len()))?,
            }
        }
        Err(IcliError::Aborted)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        self.question(message, default)?;
        let raw = self.read_line()?;
        match default {
            Some(default) if raw.trim().is_empty() => Ok(default.to_string()),
            _ => Ok(raw),
        }
    }
}

/// One answer from non-terminal input, without its line ending. End of input aborts.
fn read_piped_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(IcliError::Aborted);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_input_source_follows_stdin() {
        assert_eq!(
            TerminalPrompter::new().interactive,
            io::stdin().is_terminal()
        );
    }

    #[test]
    fn test_read_piped_lines() {
        let mut input = Cursor::new("Acme Ltd\r\n\n12-34-56");
        assert_eq!(read_piped_line(&mut input).unwrap(), "Acme Ltd");
        assert_eq!(read_piped_line(&mut input).unwrap(), "");
        assert_eq!(read_piped_line(&mut input).unwrap(), "12-34-56");
        assert!(matches!(
            read_piped_line(&mut input),
            Err(IcliError::Aborted)
        ));
    }
}
