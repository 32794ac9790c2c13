//! Indentation-tracking source writer.
//!
//! Blocks are opened and closed explicitly; [`SourceWriter::finish`] refuses
//! to hand out text whose blocks do not balance.

use crate::error::{GenResult, GenerateError};

pub struct SourceWriter {
    out: String,
    depth: usize,
    indent: String,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::with_indent_spaces(4)
    }
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_spaces(spaces: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            indent: " ".repeat(spaces),
        }
    }

    /// Write one indented line. Empty text writes a bare newline.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `header {` and indent what follows.
    pub fn open(&mut self, header: impl AsRef<str>) {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{header} {{"));
        }
        self.depth += 1;
    }

    /// Close the innermost block with `}`.
    pub fn close(&mut self) -> GenResult<()> {
        self.close_with("")
    }

    /// Close the innermost block with `}` followed by `suffix` (`;`, a comment).
    pub fn close_with(&mut self, suffix: &str) -> GenResult<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| GenerateError::Internal("closing a block that was never opened".into()))?;
        self.line(format!("}}{suffix}"));
        Ok(())
    }

    /// Close the innermost block and open `header` at the same level (`} else {`).
    pub fn reopen(&mut self, header: impl AsRef<str>) -> GenResult<()> {
        self.close_with(&format!(" {} {{", header.as_ref()))?;
        self.depth += 1;
        Ok(())
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The written text, if every block was closed.
    pub fn finish(self) -> GenResult<String> {
        if self.depth != 0 {
            return Err(GenerateError::Internal(format!(
                "{} unclosed block(s) at end of output",
                self.depth
            )));
        }
        Ok(self.out)
    }
}
