//! Output writer with column accounting
//!
//! Every write returns the number of columns it occupied so the printer can thread the running column through its
//! recursion. Columns count Unicode scalar values.

/// Writer that builds formatted output in a `String` buffer
pub struct FormatWriter {
    /// The output buffer
    output: String,
    /// Character repeated by [`FormatWriter::indent`]
    indent_char: char,
}

impl FormatWriter {
    /// Create a new format writer using `indent_char` for indentation
    pub fn new(indent_char: char) -> Self {
        Self {
            output: String::new(),
            indent_char,
        }
    }

    /// Get the formatted output
    pub fn finish(self) -> String {
        self.output
    }

    /// Write a string, returning its width in columns
    pub fn write(&mut self, s: &str) -> usize {
        self.output.push_str(s);
        s.chars().count()
    }

    /// Write one character, returning its width (always 1)
    pub fn write_char(&mut self, c: char) -> usize {
        self.output.push(c);
        1
    }

    /// Write `width` copies of the indent character
    pub fn indent(&mut self, width: usize) {
        self.output.extend(std::iter::repeat_n(self.indent_char, width));
    }

    /// Write just a newline
    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn indent_char(&self) -> char {
        self.indent_char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_returns_char_width() {
        let mut w = FormatWriter::new(' ');
        assert_eq!(w.write("(defn"), 5);
        assert_eq!(w.write("é→"), 2);
        assert_eq!(w.write_char(')'), 1);
        assert_eq!(w.finish(), "(defné→)");
    }

    #[test]
    fn test_indent_uses_configured_char() {
        let mut w = FormatWriter::new('\t');
        w.write("a");
        w.newline();
        w.indent(2);
        w.write("b");
        assert_eq!(w.finish(), "a\n\t\tb");
    }

    #[test]
    fn test_zero_indent_writes_nothing() {
        let mut w = FormatWriter::new(' ');
        w.indent(0);
        assert_eq!(w.finish(), "");
    }
}
