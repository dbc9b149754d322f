//! Rust source synthesis.
//!
//! Everything is rendered into strings first; nothing touches the filesystem
//! here. Output is deterministic: registries are walked in sorted order.

mod decode;
mod dispatch;
mod encode;
mod types;

pub use dispatch::render_connector;
pub use types::render_types;

/// First line of every generated Rust file.
pub const GENERATED_HEADER: &str = "// Code generated by ndc-sdk, DO NOT EDIT.";

/// Line-oriented writer with four-space indentation.
#[derive(Debug, Default)]
pub(crate) struct SourceBuilder {
    buf: String,
    indent: usize,
}

impl SourceBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.buf.push_str("    ");
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes `text` and indents what follows.
    pub(crate) fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.indent += 1;
        self
    }

    /// Dedents, writes `text`, then indents again, e.g. for `) -> T {`.
    pub(crate) fn reopen(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.close(text);
        self.indent += 1;
        self
    }

    /// Dedents, then writes `text`.
    pub(crate) fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(text)
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

/// Renders `s` as a Rust string literal.
pub(crate) fn quote(s: &str) -> String {
    format!("{s:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_builder_indents() {
        let mut sb = SourceBuilder::new();
        sb.open("fn main() {").line("let x = 1;").blank().close("}");
        assert_eq!(sb.finish(), "fn main() {\n    let x = 1;\n\n}\n");
    }

    #[test]
    fn test_reopen_keeps_body_indented() {
        let mut sb = SourceBuilder::new();
        sb.open("fn f(").line("a: u8,").reopen(") -> u8 {").line("a").close("}");
        assert_eq!(sb.finish(), "fn f(\n    a: u8,\n) -> u8 {\n    a\n}\n");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
    }
}
