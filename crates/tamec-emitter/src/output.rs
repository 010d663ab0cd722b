//! Append-only output buffer with indentation control.

use crate::context::EmitOptions;

/// A generated code fragment.
///
/// Lines are stored with the indentation depth they were appended at;
/// rendering applies the configured indent string. A fragment that is a
/// CPS unit also carries the name of the generated function it declares,
/// so callers can wire invocations without inspecting the buffer.
#[derive(Debug, Clone, Default)]
pub struct Output {
    name: Option<String>,
    lines: Vec<Line>,
    depth: u32,
}

#[derive(Debug, Clone)]
struct Line {
    depth: u32,
    text: String,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name of the generated function this fragment declares, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Append text at the current indentation. Embedded newlines split
    /// into multiple lines: merged atoms carry their newline padding in
    /// the text itself.
    pub fn add_line(&mut self, text: impl AsRef<str>) {
        for part in text.as_ref().split('\n') {
            self.lines.push(Line {
                depth: self.depth,
                text: part.to_string(),
            });
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn unindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append another buffer's contents as a unit, offset by the current
    /// indentation. The contents are never inspected or reordered.
    pub fn splice(&mut self, other: Output) {
        for line in other.lines {
            self.lines.push(Line {
                depth: self.depth + line.depth,
                text: line.text,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Materialize the buffer as source text, one trailing newline per
    /// line. Blank lines are not indented.
    pub fn render(&self, options: &EmitOptions) -> String {
        let mut text = String::new();
        for line in &self.lines {
            if !line.text.is_empty() {
                for _ in 0..line.depth {
                    text.push_str(&options.indent);
                }
                text.push_str(&line.text);
            }
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_line_splits_embedded_newlines() {
        let mut out = Output::new();
        out.add_line("a\n\nb");
        assert_eq!(out.line_count(), 3);
        assert_eq!(out.render(&EmitOptions::default()), "a\n\nb\n");
    }

    #[test]
    fn splice_offsets_by_current_indent() {
        let mut inner = Output::with_name("_a");
        inner.add_line("var _a = function (k) {");
        inner.indent();
        inner.add_line("k ();");
        inner.unindent();
        inner.add_line("};");

        let mut out = Output::new();
        out.indent();
        out.splice(inner);
        out.unindent();

        assert_eq!(
            out.render(&EmitOptions::default()),
            "    var _a = function (k) {\n        k ();\n    };\n"
        );
    }

    #[test]
    fn unindent_saturates_at_zero() {
        let mut out = Output::new();
        out.unindent();
        out.add_line("x");
        assert_eq!(out.render(&EmitOptions::default()), "x\n");
    }

    #[test]
    fn render_honors_custom_indent() {
        let mut out = Output::new();
        out.indent();
        out.add_line("x");
        let options = EmitOptions {
            indent: "\t".to_string(),
        };
        assert_eq!(out.render(&options), "\tx\n");
    }
}
