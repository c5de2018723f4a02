use super::token::{Span, Token, TokenKind, TokenValue};
use crate::ParseOptions;
use crate::ast::{Import, ImportKind, ImportSpecifier, PageDecl, Program, Property, RawSpan, RouteDecl};
use crate::error::{ErrorKind, ParseError};
use crate::hints;
use tracing::debug;

pub(super) type ParseResult<T> = Result<T, ParseError>;

const TOP_LEVEL: &str = "import, @page, @route, props, state, view, actions, style, router, store";

/// Recursive-descent parser over a token sequence.
///
/// The grammar is split across modules with additional `impl Parser`
/// blocks: expressions, view markup, actions/router/store blocks and style.
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) options: ParseOptions,
    /// Source and local spans of a token list lexed from a text
    /// interpolation. Raw spans there cannot index the file's tokens.
    pub(super) detached: Option<(String, Vec<Span>)>,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(mut tokens: Vec<Token>, options: ParseOptions) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.raw.chars().count() as u32))
                .unwrap_or((1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                value: TokenValue::None,
                raw: String::new(),
                line,
                column,
                span: Span::new(end, end),
            });
        }
        Self {
            tokens,
            pos: 0,
            options,
            detached: None,
            depth: 0,
        }
    }

    /// Give back the token list once parsing is done
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    // ========================================================================
    // Program
    // ========================================================================

    /// Parse a whole component file
    pub fn parse(&mut self) -> ParseResult<Program> {
        let start = self.current().span;
        let mut program = Program::default();

        while !self.is(TokenKind::Eof) {
            let kind = self.current().kind;
            debug!(kind = ?kind, line = self.current().line, "top-level declaration");

            match kind {
                TokenKind::Import => {
                    let import = self.parse_import()?;
                    program.imports.push(import);
                }
                TokenKind::At => match self.peek().kind {
                    TokenKind::Page => {
                        self.ensure_unique(program.page.is_some(), "@page")?;
                        program.page = Some(self.parse_page_decl()?);
                    }
                    TokenKind::Route => {
                        self.ensure_unique(program.route.is_some(), "@route")?;
                        program.route = Some(self.parse_route_decl()?);
                    }
                    _ => return Err(self.unknown_top_level()),
                },
                TokenKind::Props => {
                    self.ensure_unique(program.props.is_some(), "props")?;
                    program.props = Some(self.parse_props_block()?);
                }
                TokenKind::State => {
                    self.ensure_unique(program.state.is_some(), "state")?;
                    program.state = Some(self.parse_state_block()?);
                }
                TokenKind::View => {
                    self.ensure_unique(program.view.is_some(), "view")?;
                    program.view = Some(self.parse_view_block()?);
                }
                TokenKind::Actions => {
                    self.ensure_unique(program.actions.is_some(), "actions")?;
                    program.actions = Some(self.parse_actions_block()?);
                }
                TokenKind::Style => {
                    self.ensure_unique(program.style.is_some(), "style")?;
                    program.style = Some(self.parse_style_block()?);
                }
                TokenKind::Router => {
                    self.ensure_unique(program.router.is_some(), "router")?;
                    program.router = Some(self.parse_router_block()?);
                }
                TokenKind::Store => {
                    self.ensure_unique(program.store.is_some(), "store")?;
                    program.store = Some(self.parse_store_block()?);
                }
                TokenKind::Semicolon => {
                    self.advance();
                }
                _ => return Err(self.unknown_top_level()),
            }
        }

        program.span = start.to(self.current().span);
        Ok(program)
    }

    fn ensure_unique(&self, present: bool, name: &str) -> ParseResult<()> {
        if !present {
            return Ok(());
        }
        Err(self.error_with_hint(
            ErrorKind::DuplicateBlock,
            format!("Duplicate '{}' block: a component may declare it only once", name),
        ))
    }

    fn unknown_top_level(&self) -> ParseError {
        let token = self.current();
        if token.kind == TokenKind::Error {
            return self.invalid_token();
        }
        let found = if token.kind == TokenKind::At {
            format!("'@{}'", self.peek().text())
        } else {
            describe_token(token)
        };
        self.error_with_hint(
            ErrorKind::UnknownTopLevel,
            format!("Unexpected {} at top level. Expected one of: {}", found, TOP_LEVEL),
        )
    }

    // ========================================================================
    // Imports, @page, @route
    // ========================================================================

    fn parse_import(&mut self) -> ParseResult<Import> {
        let start = self.expect(TokenKind::Import)?.span;
        let mut specifiers = Vec::new();

        // import "./side-effect"
        if self.is(TokenKind::String) {
            let source = self.advance();
            self.eat(TokenKind::Semicolon);
            return Ok(Import {
                specifiers,
                source: source.text().to_string(),
                span: start.to(source.span),
            });
        }

        if self.is(TokenKind::Ident) {
            let local = self.advance();
            specifiers.push(ImportSpecifier {
                kind: ImportKind::Default,
                imported: "default".to_string(),
                local: local.text().to_string(),
                span: local.span,
            });
            if !self.eat(TokenKind::Comma) {
                return self.finish_import(start, specifiers);
            }
        }

        if self.is(TokenKind::Star) {
            let star = self.advance();
            self.expect(TokenKind::As)?;
            let local = self.expect(TokenKind::Ident)?;
            specifiers.push(ImportSpecifier {
                kind: ImportKind::Namespace,
                imported: "*".to_string(),
                local: local.text().to_string(),
                span: star.span.to(local.span),
            });
        } else if self.is(TokenKind::LBrace) {
            self.advance();
            while !self.is(TokenKind::RBrace) {
                let imported = self.expect_name()?;
                let mut span = imported.span;
                let local = if self.eat(TokenKind::As) {
                    let alias = self.expect(TokenKind::Ident)?;
                    span = span.to(alias.span);
                    alias.text().to_string()
                } else {
                    imported.text().to_string()
                };
                specifiers.push(ImportSpecifier {
                    kind: ImportKind::Named,
                    imported: imported.text().to_string(),
                    local,
                    span,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace)?;
        } else {
            let message = format!("Expected import specifiers, found {}", describe_token(self.current()));
            return Err(self.error_with_hint(ErrorKind::InvalidImport, message));
        }

        self.finish_import(start, specifiers)
    }

    fn finish_import(&mut self, start: Span, specifiers: Vec<ImportSpecifier>) -> ParseResult<Import> {
        self.expect(TokenKind::From)?;
        let source = self.expect(TokenKind::String)?;
        self.eat(TokenKind::Semicolon);
        Ok(Import {
            specifiers,
            source: source.text().to_string(),
            span: start.to(source.span),
        })
    }

    fn parse_page_decl(&mut self) -> ParseResult<PageDecl> {
        let start = self.expect(TokenKind::At)?.span;
        self.expect(TokenKind::Page)?;
        let name = if self.is(TokenKind::String) {
            self.advance()
        } else {
            self.expect(TokenKind::Ident)?
        };
        Ok(PageDecl {
            name: name.text().to_string(),
            span: start.to(name.span),
        })
    }

    fn parse_route_decl(&mut self) -> ParseResult<RouteDecl> {
        let start = self.expect(TokenKind::At)?.span;
        self.expect(TokenKind::Route)?;
        let path = self.expect(TokenKind::String)?;
        Ok(RouteDecl {
            path: path.text().to_string(),
            span: start.to(path.span),
        })
    }

    // ========================================================================
    // Property lists (props, state)
    // ========================================================================

    /// `{ name: expr, other: expr }` with optional `,`/`;` separators
    pub(super) fn parse_property_list(&mut self) -> ParseResult<(Vec<Property>, Span)> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();

        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            let name = if self.is(TokenKind::String) {
                self.advance()
            } else {
                self.expect_name()?
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            properties.push(Property {
                name: name.text().to_string(),
                span: name.span.to(value.span()),
                value,
            });
            self.skip_separators();
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok((properties, open.span.to(close.span)))
    }

    pub(super) fn parse_props_block(&mut self) -> ParseResult<crate::ast::PropsBlock> {
        let start = self.expect(TokenKind::Props)?.span;
        let (properties, span) = self.parse_property_list()?;
        Ok(crate::ast::PropsBlock {
            properties,
            span: start.to(span),
        })
    }

    pub(super) fn parse_state_block(&mut self) -> ParseResult<crate::ast::StateBlock> {
        let start = self.expect(TokenKind::State)?.span;
        let (properties, span) = self.parse_property_list()?;
        Ok(crate::ast::StateBlock {
            properties,
            span: start.to(span),
        })
    }

    // ========================================================================
    // Raw capture
    // ========================================================================

    /// Consume `{ ... }` without parsing it. Returns the token range strictly
    /// between the braces.
    pub(super) fn parse_raw_block(&mut self) -> ParseResult<RawSpan> {
        self.expect(TokenKind::LBrace)?;
        let start = self.pos;
        let mut depth = 1usize;

        loop {
            match self.current().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Eof => {
                    self.expect(TokenKind::RBrace)?;
                }
                _ => {}
            }
            self.advance();
        }

        let end = self.pos;
        self.advance();
        Ok(RawSpan::new(start, end))
    }

    /// Source text of a raw span when parsing a detached interpolation
    pub(super) fn detached_text(&self, raw: RawSpan) -> Option<String> {
        let (source, spans) = self.detached.as_ref()?;
        let first = spans.get(raw.start);
        let last = raw.end.checked_sub(1).and_then(|i| spans.get(i));
        let text = match (first, last) {
            (Some(first), Some(last)) if !raw.is_empty() => source.get(first.start..last.end).unwrap_or(""),
            _ => "",
        };
        Some(text.to_string())
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    pub(super) fn current(&self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(super) fn peek(&self) -> &Token {
        self.peek_at(1)
    }

    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Last consumed token
    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(super) fn is(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(super) fn is_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    /// Consume the current token if it matches
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.is(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.is(kind) {
            return Ok(self.advance());
        }

        let found = self.current();
        if found.kind == TokenKind::Error {
            return Err(self.invalid_token());
        }

        let error_kind = if found.kind == TokenKind::Eof {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::UnexpectedToken
        };
        let message = format!("Expected {}, found {}", kind.describe(), describe_token(found));
        let mut error = ParseError::at(error_kind, message, found);
        if let Some(hint) = hints::for_mismatch(kind, found.kind) {
            error = error.with_help(hint.help).with_docs(hint.docs());
        }
        Err(error)
    }

    /// Identifier or a reserved word usable as a name (`route`, `mode`, ...)
    pub(super) fn expect_name(&mut self) -> ParseResult<Token> {
        if self.is_name() {
            return Ok(self.advance());
        }
        self.expect(TokenKind::Ident)
    }

    pub(super) fn is_name(&self) -> bool {
        let kind = self.current().kind;
        kind == TokenKind::Ident || kind.is_contextual_keyword()
    }

    /// Skip optional `,` and `;` between entries
    pub(super) fn skip_separators(&mut self) {
        while self.is_any(&[TokenKind::Comma, TokenKind::Semicolon]) {
            self.advance();
        }
    }

    /// Save the cursor for a speculative scan
    pub(super) fn checkpoint(&self) -> usize {
        self.pos
    }

    pub(super) fn restore(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    /// Run `f` one nesting level deeper, failing past `max_depth`
    pub(super) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.options.max_depth {
            let message = format!("Nesting is too deep (maximum {} levels)", self.options.max_depth);
            return Err(self.error_with_hint(ErrorKind::NestingTooDeep, message));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub(super) fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::at(kind, message, self.current())
    }

    /// Error at the current token with the kind's documentation hint
    pub(super) fn error_with_hint(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        let mut error = self.error(kind, message);
        if let Some(hint) = hints::for_kind(kind) {
            error = error.with_help(hint.help).with_docs(hint.docs());
        }
        error
    }

    /// Error for a token the caller cannot use, phrased as "Expected X, found Y"
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.current();
        if found.kind == TokenKind::Error {
            return self.invalid_token();
        }
        let kind = if found.kind == TokenKind::Eof {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::UnexpectedToken
        };
        self.error(kind, format!("Expected {}, found {}", expected, describe_token(found)))
    }

    /// Error for a lexer `ERROR` token; the lexer stored its message as the value
    pub(super) fn invalid_token(&self) -> ParseError {
        let token = self.current();
        let message = match &token.value {
            TokenValue::Str(message) => message.clone(),
            _ => format!("Invalid token '{}'", token.raw),
        };
        self.error_with_hint(ErrorKind::InvalidToken, message)
    }
}

/// `identifier 'count'`, `string "hi"`, `'{'`
pub(super) fn describe_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident | TokenKind::Selector | TokenKind::DirectiveMod => {
            format!("{} '{}'", token.kind.describe(), token.raw)
        }
        TokenKind::String | TokenKind::Number | TokenKind::BigInt | TokenKind::HexColor => {
            format!("{} {}", token.kind.describe(), token.raw)
        }
        _ => token.kind.describe().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ImportKind;
    use crate::parser::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Program> {
        Parser::new(tokenize(source)).parse()
    }

    #[test]
    fn test_empty_program() {
        let program = parse("").unwrap();
        assert!(program.imports.is_empty());
        assert!(program.view.is_none());
    }

    #[test]
    fn test_duplicate_state_block() {
        let err = parse("state { a: 1 }\nstate { b: 2 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBlock);
        assert_eq!(err.line, 2);
        assert!(err.message.contains("'state'"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_unknown_top_level() {
        let err = parse("count: 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTopLevel);
        assert!(err.message.contains("identifier 'count'"));
        assert!(err.message.contains("props, state, view"));
    }

    #[test]
    fn test_unknown_at_rule_at_top_level() {
        let err = parse("@component Foo").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTopLevel);
        assert!(err.message.contains("'@component'"));
    }

    #[test]
    fn test_imports_in_declaration_order() {
        let program = parse(
            r#"
            import Header from "./Header.pulse"
            state { open: false }
            import { formatDate, clamp as limit } from "./utils.js"
            import * as api from "./api.js"
            import Card, { CardBody } from "./Card.pulse"
            import "./reset.css"
            "#,
        )
        .unwrap();

        assert_eq!(program.imports.len(), 5);
        let first = &program.imports[0];
        assert_eq!(first.source, "./Header.pulse");
        assert_eq!(first.specifiers[0].kind, ImportKind::Default);
        assert_eq!(first.specifiers[0].local, "Header");

        let named = &program.imports[1].specifiers;
        assert_eq!(named.len(), 2);
        assert_eq!(named[1].imported, "clamp");
        assert_eq!(named[1].local, "limit");

        assert_eq!(program.imports[2].specifiers[0].kind, ImportKind::Namespace);
        assert_eq!(program.imports[2].specifiers[0].local, "api");

        let mixed = &program.imports[3].specifiers;
        assert_eq!(mixed[0].kind, ImportKind::Default);
        assert_eq!(mixed[1].kind, ImportKind::Named);

        assert!(program.imports[4].specifiers.is_empty());
        assert_eq!(program.imports[4].source, "./reset.css");
    }

    #[test]
    fn test_import_missing_from() {
        let err = parse(r#"import { a } "./a.js""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.message.contains("Expected 'from'"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_page_and_route() {
        let program = parse("@page UserProfile\n@route \"/users/:id\"").unwrap();
        assert_eq!(program.page.unwrap().name, "UserProfile");
        assert_eq!(program.route.unwrap().path, "/users/:id");
    }

    #[test]
    fn test_state_properties() {
        let program = parse("state {\n  count: 0,\n  name: \"Ada\";\n  items: []\n}").unwrap();
        let state = program.state.unwrap();
        let names: Vec<_> = state.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["count", "name", "items"]);
    }

    #[test]
    fn test_unclosed_block_hint() {
        let err = parse("state { count: 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert!(err.help.unwrap().contains("never closed"));
        assert_eq!(err.docs.as_deref(), Some("docs/syntax.md#blocks"));
    }

    #[test]
    fn test_lexer_error_token_is_reported() {
        let err = parse("state { a: 1 ^ 2 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
        assert!(err.message.contains("Unexpected character '^'"));
    }

    #[test]
    fn test_missing_eof_is_appended() {
        let mut tokens = tokenize("state { }");
        tokens.pop();
        let program = Parser::new(tokens).parse().unwrap();
        assert!(program.state.is_some());
    }
}
