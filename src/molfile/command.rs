//! Logical commands from physical lines.
//!
//! Every CTAB line starts with `M  V30 `. A command whose text ends in `-`
//! continues on the next line; the pieces are joined without the marker.

use std::io;

use crate::molfile::error::MolfileError;

pub const PREFIX: &str = "M  V30";
const CONTINUATION: char = '-';

/// Command text of a V3000 line, or `None` when the line lacks the prefix.
pub fn strip_prefix(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(PREFIX)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Whether `command` is `END <block>`.
pub fn is_block_end(command: &str, block: &str) -> bool {
    let mut words = command.split_whitespace();
    words.next() == Some("END") && words.next() == Some(block) && words.next().is_none()
}

/// Pulls logical commands out of a line source.
pub struct CommandReader<I> {
    lines: I,
    line: usize,
    pending: Option<String>,
}

impl<I> CommandReader<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line: 0,
            pending: None,
        }
    }

    /// Number of the physical line read last, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next physical line without its line terminator.
    pub fn next_line(&mut self) -> Result<Option<String>, MolfileError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        match self.lines.next() {
            None => Ok(None),
            Some(Err(source)) => Err(MolfileError::Io {
                line: self.line + 1,
                source,
            }),
            Some(Ok(mut line)) => {
                self.line += 1;
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                tracing::trace!(line = self.line, text = %line, "read line");
                Ok(Some(line))
            }
        }
    }

    /// Hands the line read last back, so the next read returns it again.
    pub fn unread(&mut self, line: String) {
        self.pending = Some(line);
    }

    /// Next logical command, or `None` at end of input.
    ///
    /// Blank lines are skipped; any other line must carry the V3000 prefix.
    pub fn next_command(&mut self) -> Result<Option<String>, MolfileError> {
        loop {
            let Some(line) = self.next_line()? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            return self.assemble(&line).map(Some);
        }
    }

    /// Like [`next_command`](Self::next_command) but end of input is an error.
    pub fn expect_command(&mut self) -> Result<String, MolfileError> {
        self.next_command()?
            .ok_or_else(|| MolfileError::format(self.line, "unexpected end of file"))
    }

    fn assemble(&mut self, first: &str) -> Result<String, MolfileError> {
        let mut command = String::new();
        let mut current = self.stripped(first)?.trim_end().to_owned();
        while current.ends_with(CONTINUATION) {
            current.pop();
            command.push_str(&current);
            let next = self.next_line()?.ok_or_else(|| {
                MolfileError::format(self.line, "unexpected end of file in continued line")
            })?;
            current = self.stripped(&next)?.trim_end().to_owned();
        }
        command.push_str(&current);
        Ok(command.trim().to_owned())
    }

    fn stripped<'a>(&self, line: &'a str) -> Result<&'a str, MolfileError> {
        strip_prefix(line).ok_or_else(|| {
            MolfileError::format(self.line, format!("unexpected line: {}", line))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> CommandReader<impl Iterator<Item = io::Result<String>> + '_> {
        CommandReader::new(text.lines().map(|l| Ok(l.to_owned())))
    }

    #[test]
    fn prefix_is_stripped() {
        assert_eq!(strip_prefix("M  V30 BEGIN CTAB"), Some("BEGIN CTAB"));
        assert_eq!(strip_prefix("M  V30"), Some(""));
        assert_eq!(strip_prefix("M  V3000"), None);
        assert_eq!(strip_prefix("M  END"), None);
    }

    #[test]
    fn block_end_keywords() {
        assert!(is_block_end("END ATOM", "ATOM"));
        assert!(is_block_end("END  BOND", "BOND"));
        assert!(!is_block_end("END ATOM", "BOND"));
        assert!(!is_block_end("BEGIN ATOM", "ATOM"));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let mut r = reader("M  V30 1 C 0 0 0 0 -\nM  V30 CHG=1 -\nM  V30 MASS=13\nM  V30 END ATOM");
        assert_eq!(
            r.next_command().unwrap().as_deref(),
            Some("1 C 0 0 0 0 CHG=1 MASS=13")
        );
        assert_eq!(r.line(), 3);
        assert_eq!(r.next_command().unwrap().as_deref(), Some("END ATOM"));
        assert_eq!(r.next_command().unwrap(), None);
    }

    #[test]
    fn continuation_can_split_tokens() {
        let mut r = reader("M  V30 1 SUP 0 ATOMS=(3 1 -\nM  V30 2 3)");
        assert_eq!(
            r.next_command().unwrap().as_deref(),
            Some("1 SUP 0 ATOMS=(3 1 2 3)")
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut r = reader("\nM  V30 COUNTS 1 0 0 0 0\r\n");
        assert_eq!(r.next_command().unwrap().as_deref(), Some("COUNTS 1 0 0 0 0"));
        assert_eq!(r.line(), 2);
    }

    #[test]
    fn unprefixed_line_is_fatal() {
        let mut r = reader("M  V30 BEGIN ATOM\nM  END");
        r.next_command().unwrap();
        let err = r.next_command().unwrap_err();
        assert!(matches!(err, MolfileError::Format { line: 2, .. }));
    }

    #[test]
    fn eof_inside_continuation_is_fatal() {
        let mut r = reader("M  V30 1 C 0 0 0 0 -");
        assert!(matches!(
            r.next_command(),
            Err(MolfileError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn expect_command_reports_eof() {
        let mut r = reader("");
        let err = r.expect_command().unwrap_err();
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn unread_line_is_returned_again() {
        let mut r = reader("M  V30 BEGIN CTAB\nM  V30 END CTAB");
        let first = r.next_line().unwrap().unwrap();
        r.unread(first);
        assert_eq!(r.next_command().unwrap().as_deref(), Some("BEGIN CTAB"));
        assert_eq!(r.line(), 1);
    }

    #[test]
    fn io_errors_propagate() {
        let lines = vec![
            Ok("M  V30 BEGIN CTAB".to_owned()),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
        ];
        let mut r = CommandReader::new(lines.into_iter());
        r.next_command().unwrap();
        assert!(matches!(
            r.next_command(),
            Err(MolfileError::Io { line: 2, .. })
        ));
    }
}
