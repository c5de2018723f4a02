use crate::parser::token::{Span, Token};
use std::fmt;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    InvalidToken,
    DuplicateBlock,
    UnknownTopLevel,
    InvalidImport,
    InvalidDirective,
    InvalidModifier,
    InvalidAssignment,
    InvalidInterpolation,
    InvalidStyle,
    NestingTooDeep,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "Unexpected token",
            ErrorKind::UnexpectedEof => "Unexpected end of file",
            ErrorKind::InvalidToken => "Invalid token",
            ErrorKind::DuplicateBlock => "Duplicate block",
            ErrorKind::UnknownTopLevel => "Unknown top-level declaration",
            ErrorKind::InvalidImport => "Invalid import",
            ErrorKind::InvalidDirective => "Invalid directive",
            ErrorKind::InvalidModifier => "Invalid modifier",
            ErrorKind::InvalidAssignment => "Invalid assignment target",
            ErrorKind::InvalidInterpolation => "Invalid interpolation",
            ErrorKind::InvalidStyle => "Invalid style",
            ErrorKind::NestingTooDeep => "Nesting too deep",
        }
    }

    /// Stable error code shown to users and matched by tests
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "P0101",
            ErrorKind::UnexpectedEof => "P0102",
            ErrorKind::InvalidToken => "P0103",
            ErrorKind::DuplicateBlock => "P0201",
            ErrorKind::UnknownTopLevel => "P0202",
            ErrorKind::InvalidImport => "P0203",
            ErrorKind::InvalidDirective => "P0301",
            ErrorKind::InvalidModifier => "P0302",
            ErrorKind::InvalidInterpolation => "P0303",
            ErrorKind::InvalidAssignment => "P0401",
            ErrorKind::InvalidStyle => "P0501",
            ErrorKind::NestingTooDeep => "P0601",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
    pub span: Span,
    pub help: Option<String>,
    /// Anchor into the syntax guide, e.g. `docs/syntax.md#view`
    pub docs: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: u32, column: u32, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
            span,
            help: None,
            docs: None,
        }
    }

    /// Create an error positioned at a token
    pub fn at(kind: ErrorKind, message: impl Into<String>, token: &Token) -> Self {
        Self::new(kind, message, token.line, token.column, token.span)
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a documentation reference
    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let bold = if color { "\x1b[1m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        output.push_str(&format!(
            "{}error[{}]:{} {}{}{}\n",
            red,
            self.code(),
            reset,
            bold,
            self.message,
            reset
        ));
        output.push_str(&format!(
            " {}-->{} {}:{}:{}\n",
            dim, reset, filename, self.line, self.column
        ));

        // Source context
        let line_index = self.line.saturating_sub(1) as usize;
        if let Some(source_line) = source.lines().nth(line_index) {
            let line_num_width = format!("{}", self.line).len().max(2);
            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = line_num_width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}\n",
                dim,
                self.line,
                reset,
                source_line,
                width = line_num_width
            ));

            // Underline in characters, clipped to the error line
            let underline_start = self.column.saturating_sub(1) as usize;
            let line_chars = source_line.chars().count();
            let span_chars = source
                .get(self.span.start..self.span.end)
                .map(|s| s.lines().next().unwrap_or("").chars().count())
                .unwrap_or(1);
            let underline_len = span_chars
                .min(line_chars.saturating_sub(underline_start))
                .max(1);

            let spaces = " ".repeat(underline_start);
            let carets = "^".repeat(underline_len);
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim,
                "",
                reset,
                spaces,
                red,
                carets,
                reset,
                width = line_num_width
            ));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        if let Some(ref docs) = self.docs {
            output.push_str(&format!(" {}docs:{} {}\n", dim, reset, docs));
        }

        output.push('\n');
        output
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}:{}",
            self.message,
            self.code(),
            self.line,
            self.column
        )
    }
}

impl std::error::Error for ParseError {}
