//! Front end of the Pulse component compiler.
//!
//! [`tokenize`] turns `.pulse` source into tokens, [`parse`] turns it into an
//! [`Ast`] whose [`Program`](ast::Program) root is handed to code generators.
//!
//! ```
//! let ast = pulse_compiler::parse("state { count: 0 }\nview { button @click(count++) \"+\" }")?;
//! assert_eq!(ast.program.state.unwrap().properties[0].name, "count");
//! # Ok::<(), pulse_compiler::ParseError>(())
//! ```

pub mod ast;
pub mod error;
pub mod hints;
pub mod parser;

pub use ast::{Ast, Program};
pub use error::{ErrorKind, ParseError};
pub use parser::{PulseParser, SourceParser, Token, TokenKind};

/// Configuration for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep a style block as raw text when its structured parse fails
    /// (default: true). When false the failure is a parse error.
    pub style_fallback: bool,
    /// Maximum nesting of expressions, view nodes and style rules
    /// (default: 128)
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            style_fallback: true,
            max_depth: 128,
        }
    }
}

/// Tokenize source code. Never fails; bad input becomes `ERROR` tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    parser::tokenize(source)
}

/// Parse a component with default options
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    parse_with(source, &ParseOptions::default())
}

/// Parse a component with custom options
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Ast, ParseError> {
    PulseParser::with_options(*options).parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert!(options.style_fallback);
        assert_eq!(options.max_depth, 128);
    }

    #[test]
    fn test_parse_with_depth_limit() {
        let source = format!("state {{ x: {}1{} }}", "(".repeat(20), ")".repeat(20));
        assert!(parse(&source).is_ok());

        let options = ParseOptions {
            max_depth: 8,
            ..ParseOptions::default()
        };
        let err = parse_with(&source, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_interpolated_arrow_block_keeps_its_own_text() {
        use ast::{ArrowBody, Expr, TextPart, ViewNode};

        let source = "actions { go() { alpha() } }\nview { p \"{items.map(i => { return i.name })}\" }";
        let ast = parse(source).unwrap();

        let go = &ast.program.actions.as_ref().unwrap().functions[0];
        assert_eq!(ast.raw_text(go.body), "alpha()");

        let view = ast.program.view.as_ref().unwrap();
        let ViewNode::Element(p) = &view.children[0] else { panic!("expected element") };
        let TextPart::Interpolation { expression, .. } = &p.text_content[0].parts[0] else {
            panic!("expected interpolation")
        };
        let Expr::Call { arguments, .. } = expression else { panic!("expected call") };
        let Expr::Arrow { body, .. } = &arguments[0] else { panic!("expected arrow") };
        assert!(matches!(body, ArrowBody::Inline(text) if text == "return i.name"));
    }

    #[test]
    fn test_tokenize_reexport() {
        let tokens = tokenize("view { }");
        assert_eq!(tokens.first().map(|t| t.kind), Some(TokenKind::View));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
