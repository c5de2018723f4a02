pub mod lexer;
pub mod token;

mod blocks;
mod core;
mod expressions;
mod style;
mod view;

pub use self::core::Parser;
pub use lexer::{Lexer, tokenize};
pub use token::{Span, Token, TokenKind, TokenValue};

use crate::ParseOptions;
use crate::ast::Ast;
use crate::error::ParseError;
use std::sync::Arc;
use tracing::debug;

/// Source parser trait - converts source code to AST
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<Ast, ParseError>;
}

/// `.pulse` component parser
#[derive(Debug, Clone, Default)]
pub struct PulseParser {
    options: ParseOptions,
}

impl PulseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl SourceParser for PulseParser {
    fn parse(&self, source: &str) -> Result<Ast, ParseError> {
        // Tokenize
        let tokens = tokenize(source);

        // Build AST
        let mut parser = Parser::with_options(tokens, self.options);
        let program = parser.parse()?;
        let tokens = parser.into_tokens();
        debug!(tokens = tokens.len(), imports = program.imports.len(), "parsed component");

        Ok(Ast::new(program, tokens, Arc::from(source)))
    }
}
