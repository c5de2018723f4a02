//! Style blocks.
//!
//! The tokens between the braces are first joined back into CSS text, kept
//! as `raw`. A structured parse into rules follows from the same position.
//! When it fails (preprocessor syntax such as `@mixin` or `$var: ...`) the
//! block keeps only the raw text and the error message, unless
//! [`ParseOptions::style_fallback`](crate::ParseOptions) is off.

use super::core::{ParseResult, Parser, describe_token};
use super::token::{Token, TokenKind};
use crate::ast::{AtRule, StyleBlock, StyleDeclaration, StyleNode, StyleRule};
use crate::error::ErrorKind;
use crate::hints;
use tracing::debug;

/// At-rules understood by the structured parse
const AT_RULES: &[&str] = &[
    "media",
    "supports",
    "keyframes",
    "font-face",
    "import",
    "layer",
    "container",
    "page",
    "charset",
    "namespace",
    "font-feature-values",
    "property",
    "counter-style",
    "viewport",
    "document",
];

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Units that glue to a preceding number
const CSS_UNITS: &[&str] = &[
    "%", "px", "em", "rem", "ex", "ch", "vh", "vw", "vmin", "vmax", "svh", "lvh", "dvh", "cm", "mm",
    "q", "in", "pt", "pc", "s", "ms", "deg", "rad", "grad", "turn", "fr", "dpi", "dpcm", "dppx", "x",
];

/// Functions whose name glues to `(`
const CSS_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color", "color-mix",
    "calc", "min", "max", "clamp", "var", "env", "attr", "url", "image-set", "linear-gradient",
    "radial-gradient", "conic-gradient", "repeating-linear-gradient", "repeating-radial-gradient",
    "repeating-conic-gradient", "translate", "translatex", "translatey", "translatez", "translate3d",
    "rotate", "rotatex", "rotatey", "rotatez", "rotate3d", "scale", "scalex", "scaley", "scalez",
    "scale3d", "skew", "skewx", "skewy", "matrix", "matrix3d", "perspective", "blur", "brightness",
    "contrast", "drop-shadow", "grayscale", "hue-rotate", "invert", "opacity", "saturate", "sepia",
    "cubic-bezier", "steps", "repeat", "minmax", "fit-content", "format", "local", "counter",
    "counters", "nth-child", "nth-of-type", "nth-last-child", "nth-last-of-type", "is", "where",
    "has", "lang", "dir",
];

/// Which part of a rule a token run forms. Selectors glue pseudo-classes
/// to their `:`; values and preludes keep `name: value` spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CssPart {
    Selector,
    Value,
}

impl Parser {
    pub(super) fn parse_style_block(&mut self) -> ParseResult<StyleBlock> {
        let start = self.expect(TokenKind::Style)?.span;
        self.expect(TokenKind::LBrace)?;

        let body_start = self.pos;
        let body_end = self.find_style_end()?;
        let raw = format_css(&self.tokens[body_start..body_end]);

        let checkpoint = self.checkpoint();
        let (rules, parse_error) = match self.parse_style_rules(body_end) {
            Ok(rules) => (rules, None),
            Err(error) if self.options.style_fallback => {
                debug!(
                    line = error.line,
                    column = error.column,
                    message = %error.message,
                    "style block kept as raw text"
                );
                self.restore(checkpoint);
                (Vec::new(), Some(error.to_string()))
            }
            Err(error) => return Err(error),
        };

        self.pos = body_end;
        let close = self.expect(TokenKind::RBrace)?;
        Ok(StyleBlock {
            raw,
            rules,
            parse_error,
            span: start.to(close.span),
        })
    }

    /// Index of the `}` closing the style block, without moving the cursor
    fn find_style_end(&mut self) -> ParseResult<usize> {
        let mut depth = 1usize;
        let mut first_error = None;

        for index in self.pos..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(index);
                    }
                }
                TokenKind::Error => {
                    first_error.get_or_insert(index);
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }

        // An unterminated string or comment swallowed the closing brace
        if let Some(index) = first_error {
            self.pos = index;
            return Err(self.invalid_token());
        }

        self.pos = self.tokens.len() - 1;
        let mut error = self.unexpected("'}' to close the style block");
        if let Some(hint) = hints::for_mismatch(TokenKind::RBrace, TokenKind::Eof) {
            error = error.with_help(hint.help).with_docs(hint.docs());
        }
        Err(error)
    }

    // ========================================================================
    // Structured parse
    // ========================================================================

    fn parse_style_rules(&mut self, end: usize) -> ParseResult<Vec<StyleNode>> {
        let mut rules = Vec::new();

        while self.pos < end {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::At => rules.push(self.parse_at_rule()?),
                _ if self.style_item_terminator() == TokenKind::LBrace => {
                    rules.push(StyleNode::Rule(self.parse_style_rule()?));
                }
                _ => {
                    let message = format!(
                        "Declarations must be inside a rule, found {}",
                        describe_token(self.current())
                    );
                    return Err(self.error_with_hint(ErrorKind::InvalidStyle, message));
                }
            }
        }

        Ok(rules)
    }

    /// `selector { declarations and nested rules }`
    fn parse_style_rule(&mut self) -> ParseResult<StyleRule> {
        self.nested(|p| {
            let start = p.current().span;
            let selector = css_text(p.take_style_tokens(), CssPart::Selector);
            if selector.is_empty() {
                return Err(p.error_with_hint(ErrorKind::InvalidStyle, "Expected a selector before '{'"));
            }

            p.expect(TokenKind::LBrace)?;
            let (declarations, rules) = p.parse_style_body()?;
            let close = p.expect(TokenKind::RBrace)?;

            Ok(StyleRule {
                selector,
                declarations,
                rules,
                span: start.to(close.span),
            })
        })
    }

    fn parse_style_body(&mut self) -> ParseResult<(Vec<StyleDeclaration>, Vec<StyleNode>)> {
        let mut declarations = Vec::new();
        let mut rules = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::At => rules.push(self.parse_at_rule()?),
                // `&:hover { ... }` or `.child { ... }`
                _ if self.style_item_terminator() == TokenKind::LBrace => {
                    rules.push(StyleNode::Rule(self.parse_style_rule()?));
                }
                _ => declarations.push(self.parse_declaration()?),
            }
        }

        Ok((declarations, rules))
    }

    /// `property: value [!important];`
    fn parse_declaration(&mut self) -> ParseResult<StyleDeclaration> {
        let start = self.current().span;

        let property_start = self.pos;
        while !self.is_any(&[
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]) {
            self.advance();
        }
        let property = css_text(&self.tokens[property_start..self.pos], CssPart::Value);
        if property.is_empty() {
            return Err(self.error_with_hint(ErrorKind::InvalidStyle, "Expected a property name"));
        }
        if !self.is(TokenKind::Colon) {
            let message = format!(
                "Expected ':' after property '{}', found {}",
                property,
                describe_token(self.current())
            );
            return Err(self.error_with_hint(ErrorKind::InvalidStyle, message));
        }
        self.advance();

        let mut value_tokens = self.take_style_tokens();
        let important = match value_tokens {
            [.., bang, word] => {
                bang.kind == TokenKind::Not && word.raw.eq_ignore_ascii_case("important")
            }
            _ => false,
        };
        if important {
            value_tokens = &value_tokens[..value_tokens.len() - 2];
        }
        let value = css_text(value_tokens, CssPart::Value);
        if value.is_empty() {
            let message = format!("Missing value for property '{}'", property);
            return Err(self.error_with_hint(ErrorKind::InvalidStyle, message));
        }

        let end = self.previous().span;
        self.eat(TokenKind::Semicolon);

        Ok(StyleDeclaration {
            property,
            value,
            important,
            span: start.to(end),
        })
    }

    /// `@media (...) { ... }`, `@import url(...);`
    fn parse_at_rule(&mut self) -> ParseResult<StyleNode> {
        self.nested(|p| {
            let at = p.expect(TokenKind::At)?;
            let name_token = p.current().clone();
            if name_token.kind != TokenKind::Ident || name_token.span.start != at.span.end {
                return Err(p.error_with_hint(ErrorKind::InvalidStyle, "Expected an at-rule name after '@'"));
            }

            let name = name_token.raw.to_ascii_lowercase();
            let base = VENDOR_PREFIXES
                .iter()
                .find_map(|prefix| name.strip_prefix(prefix))
                .unwrap_or(&name);
            if !AT_RULES.contains(&base) {
                let message = format!("Unknown at-rule '@{}'", name_token.raw);
                return Err(p.error_with_hint(ErrorKind::InvalidStyle, message));
            }
            p.advance();

            let prelude = css_text(p.take_style_tokens(), CssPart::Value);

            if !p.is(TokenKind::LBrace) {
                let end = p.previous().span;
                p.eat(TokenKind::Semicolon);
                return Ok(StyleNode::AtRule(AtRule {
                    name,
                    prelude,
                    has_block: false,
                    declarations: Vec::new(),
                    rules: Vec::new(),
                    span: at.span.to(end),
                }));
            }

            p.advance();
            let (declarations, rules) = p.parse_style_body()?;
            let close = p.expect(TokenKind::RBrace)?;

            Ok(StyleNode::AtRule(AtRule {
                name,
                prelude,
                has_block: true,
                declarations,
                rules,
                span: at.span.to(close.span),
            }))
        })
    }

    /// Consume tokens up to the next `;`, `{` or `}` outside parentheses and
    /// brackets
    fn take_style_tokens(&mut self) -> &[Token] {
        let start = self.pos;
        let mut depth = 0usize;

        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }

        &self.tokens[start..self.pos]
    }

    /// Which of `;`, `{`, `}` ends the item at the cursor. Decides between a
    /// declaration and a nested rule.
    fn style_item_terminator(&self) -> TokenKind {
        let mut depth = 0usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace if depth == 0 => {
                    return token.kind;
                }
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Eof => break,
                _ => {}
            }
        }
        TokenKind::Eof
    }
}

// ============================================================================
// Text reconstruction
// ============================================================================

/// Join tokens into single-line CSS text
fn css_text(tokens: &[Token], part: CssPart) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;

    for token in tokens {
        if previous.is_some_and(|prev| needs_space(prev, token, part)) {
            out.push(' ');
        }
        out.push_str(&token.raw);
        previous = Some(token);
    }

    out
}

/// Join tokens into CSS text, keeping line breaks and indenting by brace depth
fn format_css(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut previous: Option<&Token> = None;

    for token in tokens {
        if token.kind == TokenKind::RBrace {
            depth = depth.saturating_sub(1);
        }

        if let Some(prev) = previous {
            if token.line > prev.line {
                out.push('\n');
                out.push_str(&"  ".repeat(depth));
            } else if needs_space(prev, token, CssPart::Value) {
                out.push(' ');
            }
        }

        out.push_str(&token.raw);
        if token.kind == TokenKind::LBrace {
            depth += 1;
        }
        previous = Some(token);
    }

    out
}

/// Tokens touching in the source stay glued (`16px`, `#fff`, `&:hover`).
/// Units glue to numbers and known functions to `(` even when spaced apart.
/// Otherwise a single space, except inside brackets and before closing
/// punctuation.
fn needs_space(prev: &Token, next: &Token, part: CssPart) -> bool {
    if prev.span.end == next.span.start {
        return false;
    }
    if prev.kind == TokenKind::Number && is_unit(next) {
        return false;
    }
    if next.kind == TokenKind::LParen && is_css_function(prev) {
        return false;
    }
    if part == CssPart::Selector && prev.kind == TokenKind::Colon {
        return false;
    }
    let after_opener = matches!(
        prev.kind,
        TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot | TokenKind::Hash | TokenKind::At
    );
    let before_closer = matches!(
        next.kind,
        TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::Semicolon
    );
    !after_opener && !before_closer
}

fn is_unit(token: &Token) -> bool {
    CSS_UNITS.iter().any(|unit| token.raw.eq_ignore_ascii_case(unit))
}

fn is_css_function(token: &Token) -> bool {
    if token.kind != TokenKind::Ident {
        return false;
    }
    // `-webkit-x` lexes as `-` followed by `webkit-x`
    let name = token.raw.to_ascii_lowercase();
    let name = name.trim_start_matches('-');
    let base = VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix.trim_start_matches('-')))
        .unwrap_or(name);
    CSS_FUNCTIONS.contains(&base)
}
