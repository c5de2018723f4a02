//! View markup: elements, text, structural and inline directives.

use super::core::{ParseResult, Parser};
use super::lexer::tokenize;
use super::token::{Span, Token, TokenKind};
use crate::ast::{
    A11yAttribute, A11yDirective, BackDirective, BoundaryDirective, BoundaryTarget, Directive,
    Element, ElementProp, ElseIfBranch, EventDirective, Expr, FocusTrapDirective, ForDirective,
    ForwardDirective, IfDirective, IterationKind, LinkDirective, LiteralValue, LiveDirective,
    LoopKeyword, ModelDirective, ModelModifier, NavigateDirective, OutletDirective, SlotNode,
    SrOnlyDirective, Text, TextPart, ViewBlock, ViewNode,
};
use crate::error::{ErrorKind, ParseError};
use tracing::trace;

impl Parser {
    pub(super) fn parse_view_block(&mut self) -> ParseResult<ViewBlock> {
        let start = self.expect(TokenKind::View)?.span;
        let (children, span) = self.parse_children()?;
        Ok(ViewBlock {
            children,
            span: start.to(span),
        })
    }

    /// `{ node* }`
    fn parse_children(&mut self) -> ParseResult<(Vec<ViewNode>, Span)> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut children = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            children.push(self.parse_view_node()?);
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok((children, open.span.to(close.span)))
    }

    fn parse_view_node(&mut self) -> ParseResult<ViewNode> {
        self.nested(|p| p.parse_view_node_inner())
    }

    fn parse_view_node_inner(&mut self) -> ParseResult<ViewNode> {
        match self.current().kind {
            TokenKind::Selector | TokenKind::Ident => Ok(ViewNode::Element(self.parse_element()?)),
            TokenKind::String | TokenKind::Template => {
                let token = self.advance();
                Ok(ViewNode::Text(self.parse_text(&token)?))
            }
            TokenKind::Number | TokenKind::BigInt | TokenKind::True | TokenKind::False | TokenKind::Null => {
                let token = self.advance();
                Ok(ViewNode::Text(literal_text(&token)))
            }
            TokenKind::Slot => Ok(ViewNode::Slot(self.parse_slot()?)),
            TokenKind::At => self.parse_view_directive(),
            TokenKind::Error => Err(self.invalid_token()),
            _ => Err(self.unexpected("element, text or directive")),
        }
    }

    /// Directive in child position: structural, router or standalone
    fn parse_view_directive(&mut self) -> ParseResult<ViewNode> {
        let name = self.peek().clone();
        trace!(directive = %name.raw, line = name.line, "view directive");

        match name.kind {
            TokenKind::If => Ok(ViewNode::If(self.parse_if()?)),
            TokenKind::For | TokenKind::Each => Ok(ViewNode::For(self.parse_for()?)),
            TokenKind::Link => Ok(ViewNode::Link(self.parse_link()?)),
            TokenKind::Outlet => Ok(ViewNode::Outlet(self.parse_outlet()?)),
            TokenKind::Navigate => Ok(ViewNode::Navigate(self.parse_navigate()?)),
            TokenKind::Back => {
                let span = self.parse_bare_router_directive()?;
                Ok(ViewNode::Back(BackDirective { span }))
            }
            TokenKind::Forward => {
                let span = self.parse_bare_router_directive()?;
                Ok(ViewNode::Forward(ForwardDirective { span }))
            }
            TokenKind::Else => Err(self.error_with_hint(
                ErrorKind::InvalidDirective,
                "'@else' without a preceding '@if'",
            )),
            TokenKind::Ident => match name.text() {
                "else-if" => Err(self.error_with_hint(
                    ErrorKind::InvalidDirective,
                    "'@else-if' without a preceding '@if'",
                )),
                "client" | "server" => {
                    let directive = self.parse_boundary(true)?;
                    Ok(ViewNode::Boundary(directive))
                }
                "model" | "a11y" | "live" | "focusTrap" | "srOnly" => Err(self.error_with_hint(
                    ErrorKind::InvalidDirective,
                    format!("'@{}' must follow an element", name.text()),
                )),
                _ => {
                    let mut event = self.parse_event()?;
                    if self.is(TokenKind::LBrace) {
                        let (children, span) = self.parse_children()?;
                        event.children = children;
                        event.span = event.span.to(span);
                    }
                    Ok(ViewNode::Event(event))
                }
            },
            _ => {
                self.advance();
                Err(self.unexpected("directive name"))
            }
        }
    }

    // ========================================================================
    // Elements
    // ========================================================================

    fn parse_element(&mut self) -> ParseResult<Element> {
        let head = self.advance();
        let mut element = Element {
            selector: head.text().to_string(),
            props: Vec::new(),
            directives: Vec::new(),
            text_content: Vec::new(),
            children: Vec::new(),
            span: head.span,
        };

        if self.is(TokenKind::LParen) {
            element.props = self.parse_element_props()?;
            element.span = element.span.to(self.previous().span);
        }

        loop {
            match self.current().kind {
                TokenKind::At if self.is_inline_directive() => {
                    let directive = self.parse_inline_directive()?;
                    element.span = element.span.to(directive.span());
                    element.directives.push(directive);
                }
                TokenKind::String | TokenKind::Template => {
                    let token = self.advance();
                    let text = self.parse_text(&token)?;
                    element.span = element.span.to(text.span);
                    element.text_content.push(text);
                }
                _ => break,
            }
        }

        if self.is(TokenKind::LBrace) {
            let (children, span) = self.parse_children()?;
            element.children = children;
            element.span = element.span.to(span);
        }

        Ok(element)
    }

    /// `@name` after an element that attaches to it rather than starting a sibling
    fn is_inline_directive(&self) -> bool {
        let name = self.peek();
        if name.kind != TokenKind::Ident {
            return false;
        }
        match name.text() {
            "else-if" => false,
            // `@client { ... }` wraps siblings
            "client" | "server" => self.peek_at(2).kind != TokenKind::LBrace,
            _ => true,
        }
    }

    /// `(name=expr, name={expr}, flag, ...spread)`
    fn parse_element_props(&mut self) -> ParseResult<Vec<ElementProp>> {
        self.expect(TokenKind::LParen)?;
        let mut props = Vec::new();

        while !self.is(TokenKind::RParen) {
            if self.is(TokenKind::Spread) {
                let start = self.advance().span;
                let argument = self.parse_expression()?;
                props.push(ElementProp::Spread {
                    span: start.to(argument.span()),
                    argument,
                });
            } else {
                props.push(self.parse_named_prop()?);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(props)
    }

    fn parse_named_prop(&mut self) -> ParseResult<ElementProp> {
        let (name, name_span) = self.parse_attribute_name()?;

        if !self.eat(TokenKind::Eq) {
            return Ok(ElementProp::Named {
                name,
                value: Expr::Literal {
                    value: LiteralValue::Bool(true),
                    raw: "true".to_string(),
                    span: name_span,
                },
                shorthand: true,
                span: name_span,
            });
        }

        let value = if self.is(TokenKind::LBrace) {
            self.advance();
            let value = self.parse_expression()?;
            self.expect(TokenKind::RBrace)?;
            value
        } else {
            self.parse_expression()?
        };

        Ok(ElementProp::Named {
            span: name_span.to(value.span()),
            name,
            value,
            shorthand: false,
        })
    }

    /// Name that may contain hyphens: `aria-label`, `data-id`
    fn parse_attribute_name(&mut self) -> ParseResult<(String, Span)> {
        let first = self.expect_name()?;
        let mut name = first.raw.clone();
        let mut span = first.span;

        while self.is(TokenKind::Minus) && self.current().span.start == span.end {
            let next = self.peek();
            let adjacent = next.span.start == self.current().span.end;
            if !(adjacent && (next.kind == TokenKind::Ident || next.kind.is_keyword())) {
                break;
            }
            self.advance();
            let part = self.advance();
            name.push('-');
            name.push_str(&part.raw);
            span = span.to(part.span);
        }

        Ok((name, span))
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Re-scan a string or template for `{expr}` (or `${expr}`) interpolation
    pub(super) fn parse_text(&self, token: &Token) -> ParseResult<Text> {
        let value = token.text();
        let template = token.kind == TokenKind::Template;
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = value.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            let opens = if template {
                ch == '$' && chars.peek().map(|&(_, c)| c) == Some('{')
            } else {
                ch == '{'
            };

            if ch == '\\' && !template {
                if let Some(&(_, next)) = chars.peek() {
                    if next == '{' || next == '}' {
                        literal.push(next);
                        chars.next();
                        continue;
                    }
                }
                literal.push(ch);
                continue;
            }

            if !opens {
                literal.push(ch);
                continue;
            }

            if template {
                chars.next();
            }
            let expr_start = if template { i + 2 } else { i + 1 };

            let mut depth = 1usize;
            let mut expr_end = None;
            for (j, c) in chars.by_ref() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            expr_end = Some(j);
                            break;
                        }
                    }
                    _ => {}
                }
            }

            let Some(expr_end) = expr_end else {
                return Err(self
                    .text_error(token, "Unclosed '{' in text interpolation")
                    .with_docs(interpolation_docs()));
            };

            let source = &value[expr_start..expr_end];
            if source.trim().is_empty() {
                return Err(self.text_error(token, "Empty interpolation '{}' in text"));
            }

            if !literal.is_empty() {
                parts.push(TextPart::Literal {
                    value: std::mem::take(&mut literal),
                });
            }

            let expression = self.parse_interpolation(token, source, expr_start)?;
            parts.push(TextPart::Interpolation {
                source: source.trim().to_string(),
                expression,
            });
        }

        if !literal.is_empty() {
            parts.push(TextPart::Literal { value: literal });
        }

        Ok(Text {
            parts,
            raw: value.to_string(),
            span: token.span,
        })
    }

    /// Lex and parse one interpolated expression, positioned inside the
    /// enclosing string token
    fn parse_interpolation(&self, token: &Token, source: &str, offset: usize) -> ParseResult<Expr> {
        let mut tokens = tokenize(source);
        let local_spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();

        // Offsets inside the value map onto the source only when no escape
        // sequence changed its length
        let exact = token.raw.len() == token.text().len() + 2;
        for t in &mut tokens {
            if exact {
                let prefix = &token.text()[..offset];
                let newlines = prefix.matches('\n').count() as u32;
                let column = match prefix.rfind('\n') {
                    Some(nl) => prefix[nl + 1..].chars().count() as u32 + 1,
                    None => token.column + 1 + prefix.chars().count() as u32,
                };
                let base = token.span.start + 1 + offset;
                if t.line == 1 {
                    t.column += column - 1;
                }
                t.line += token.line - 1 + newlines;
                t.span = Span::new(t.span.start + base, t.span.end + base);
            } else {
                t.line = token.line;
                t.column = token.column;
                t.span = token.span;
            }
        }

        let mut parser = Parser::with_options(tokens, self.options);
        parser.detached = Some((source.to_string(), local_spans));
        let expression = parser.parse_expression()?;
        if !parser.is(TokenKind::Eof) {
            let found = parser.current().raw.clone();
            return Err(parser
                .error(
                    ErrorKind::InvalidInterpolation,
                    format!("Unexpected '{}' in interpolation '{}'", found, source.trim()),
                )
                .with_docs(interpolation_docs()));
        }
        Ok(expression)
    }

    fn text_error(&self, token: &Token, message: &str) -> ParseError {
        let mut error = ParseError::at(ErrorKind::InvalidInterpolation, message, token);
        if let Some(hint) = crate::hints::for_kind(ErrorKind::InvalidInterpolation) {
            error = error.with_help(hint.help);
        }
        error
    }

    // ========================================================================
    // Structural directives
    // ========================================================================

    /// `( expr )`
    fn parse_condition(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult<IfDirective> {
        let start = self.expect(TokenKind::At)?.span;
        self.expect(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let (consequent, mut span) = self.parse_children()?;

        let mut else_if_branches = Vec::new();
        let mut alternate = None;

        loop {
            if !self.is(TokenKind::At) {
                break;
            }
            let branch_start = self.current().span;

            let is_else_if = match self.peek().kind {
                TokenKind::Ident if self.peek().text() == "else-if" => {
                    self.advance();
                    self.advance();
                    true
                }
                TokenKind::Else => {
                    self.advance();
                    self.advance();
                    // `@else @if` and `@else if`
                    if self.is(TokenKind::At) && self.peek().kind == TokenKind::If {
                        self.advance();
                        self.advance();
                        true
                    } else {
                        self.eat(TokenKind::If)
                    }
                }
                _ => break,
            };

            if is_else_if {
                let condition = self.parse_condition()?;
                let (consequent, branch_span) = self.parse_children()?;
                span = span.to(branch_span);
                else_if_branches.push(ElseIfBranch {
                    condition,
                    consequent,
                    span: branch_start.to(branch_span),
                });
            } else {
                let (children, branch_span) = self.parse_children()?;
                span = span.to(branch_span);
                alternate = Some(children);
                break;
            }
        }

        Ok(IfDirective {
            condition,
            consequent,
            else_if_branches,
            alternate,
            span: start.to(span),
        })
    }

    /// `@for (item[, index] in|of iterable) [key(expr)] { body }`
    fn parse_for(&mut self) -> ParseResult<ForDirective> {
        let start = self.expect(TokenKind::At)?.span;
        let keyword = match self.advance().kind {
            TokenKind::Each => LoopKeyword::Each,
            _ => LoopKeyword::For,
        };

        self.expect(TokenKind::LParen)?;
        let item = self.expect(TokenKind::Ident)?.raw;
        let index = if self.eat(TokenKind::Comma) {
            Some(self.expect(TokenKind::Ident)?.raw)
        } else {
            None
        };

        let iteration = match self.current().kind {
            TokenKind::In => IterationKind::In,
            TokenKind::Of => IterationKind::Of,
            _ => {
                self.expect(TokenKind::Of)?;
                IterationKind::Of
            }
        };
        self.advance();

        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        let key = if self.is_key_clause() {
            self.advance();
            Some(self.parse_condition()?)
        } else {
            None
        };

        let (body, span) = self.parse_children()?;
        Ok(ForDirective {
            keyword,
            item,
            index,
            iteration,
            iterable,
            key,
            body,
            span: start.to(span),
        })
    }

    /// `key(...)` reads as an identifier, or as a selector when followed by a space
    fn is_key_clause(&self) -> bool {
        let token = self.current();
        matches!(token.kind, TokenKind::Ident | TokenKind::Selector)
            && token.text() == "key"
            && self.peek().kind == TokenKind::LParen
    }

    /// `slot`, `slot "name"`, `slot "name" { fallback }`
    fn parse_slot(&mut self) -> ParseResult<SlotNode> {
        let mut span = self.expect(TokenKind::Slot)?.span;

        let name = if self.is(TokenKind::String) {
            let token = self.advance();
            span = span.to(token.span);
            Some(token.text().to_string())
        } else {
            None
        };

        let fallback = if self.is(TokenKind::LBrace) {
            let (children, children_span) = self.parse_children()?;
            span = span.to(children_span);
            children
        } else {
            Vec::new()
        };

        Ok(SlotNode { name, fallback, span })
    }

    // ========================================================================
    // Inline directives
    // ========================================================================

    fn parse_inline_directive(&mut self) -> ParseResult<Directive> {
        let name = self.peek().text().to_string();
        let directive = match name.as_str() {
            "model" => Directive::Model(self.parse_model()?),
            "a11y" => Directive::A11y(self.parse_a11y()?),
            "live" => Directive::Live(self.parse_live()?),
            "focusTrap" => Directive::FocusTrap(self.parse_focus_trap()?),
            "srOnly" => {
                let (_, span) = self.parse_directive_head(false)?;
                Directive::SrOnly(SrOnlyDirective { span })
            }
            "client" | "server" => Directive::Boundary(self.parse_boundary(false)?),
            _ => Directive::Event(self.parse_event()?),
        };
        Ok(directive)
    }

    /// `@name.mod.mod`, returning the modifier tokens and the head span
    fn parse_directive_head(&mut self, allow_modifiers: bool) -> ParseResult<(Vec<Token>, Span)> {
        let at = self.expect(TokenKind::At)?;
        let name = self.advance();
        let mut span = at.span.to(name.span);
        let mut modifiers = Vec::new();

        while self.is(TokenKind::DirectiveMod) {
            let modifier = self.current().clone();
            if !allow_modifiers {
                return Err(self.error_with_hint(
                    ErrorKind::InvalidModifier,
                    format!("'@{}' does not accept modifiers", name.text()),
                ));
            }
            span = span.to(modifier.span);
            modifiers.push(modifier);
            self.advance();
        }

        Ok((modifiers, span))
    }

    /// `@click.prevent(handler)`
    fn parse_event(&mut self) -> ParseResult<EventDirective> {
        let event = self.peek().text().to_string();
        let (modifiers, mut span) = self.parse_directive_head(true)?;

        let handler = if self.is(TokenKind::LParen) {
            let (mut arguments, close) = self.parse_arguments()?;
            span = span.to(close);
            if arguments.len() > 1 {
                return Err(ParseError::new(
                    ErrorKind::InvalidDirective,
                    format!("'@{}' takes a single handler expression", event),
                    self.previous().line,
                    self.previous().column,
                    span,
                ));
            }
            arguments.pop()
        } else {
            None
        };

        Ok(EventDirective {
            event,
            modifiers: modifiers.iter().map(|m| m.text().to_string()).collect(),
            handler,
            children: Vec::new(),
            span,
        })
    }

    /// `@model.lazy.trim(binding)`
    fn parse_model(&mut self) -> ParseResult<ModelDirective> {
        let (modifier_tokens, span) = self.parse_directive_head(true)?;

        let mut modifiers = Vec::new();
        for token in &modifier_tokens {
            match ModelModifier::from_name(token.text()) {
                Some(modifier) => modifiers.push(modifier),
                None => {
                    let mut error = ParseError::at(
                        ErrorKind::InvalidModifier,
                        format!("Unknown @model modifier '.{}'", token.text()),
                        token,
                    );
                    if let Some(hint) = crate::hints::for_kind(ErrorKind::InvalidModifier) {
                        error = error.with_help(hint.help).with_docs(hint.docs());
                    }
                    return Err(error);
                }
            }
        }

        let binding = self.parse_condition()?;
        if !binding.is_assignable() {
            return Err(ParseError::new(
                ErrorKind::InvalidDirective,
                "@model must bind to a name or member expression",
                self.previous().line,
                self.previous().column,
                binding.span(),
            ));
        }

        Ok(ModelDirective {
            modifiers,
            span: span.to(self.previous().span),
            binding,
        })
    }

    /// `@a11y(role=dialog, label="Close", aria-modal=true)`
    fn parse_a11y(&mut self) -> ParseResult<A11yDirective> {
        let (_, span) = self.parse_directive_head(false)?;
        self.expect(TokenKind::LParen)?;

        let mut attributes = Vec::new();
        while !self.is(TokenKind::RParen) {
            let (name, name_span) = self.parse_attribute_name()?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expression()?;
            attributes.push(A11yAttribute {
                name,
                span: name_span.to(value.span()),
                value,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let close = self.expect(TokenKind::RParen)?;
        Ok(A11yDirective {
            attributes,
            span: span.to(close.span),
        })
    }

    /// `@live` / `@live(assertive)` / `@live("polite")`
    fn parse_live(&mut self) -> ParseResult<LiveDirective> {
        let (_, mut span) = self.parse_directive_head(false)?;
        let mut priority = "polite".to_string();

        if self.eat(TokenKind::LParen) {
            if !self.is(TokenKind::RParen) {
                let token = if self.is(TokenKind::String) {
                    self.advance()
                } else {
                    self.expect(TokenKind::Ident)?
                };
                priority = token.text().to_string();
            }
            span = span.to(self.expect(TokenKind::RParen)?.span);
        }

        Ok(LiveDirective { priority, span })
    }

    /// `@focusTrap` / `@focusTrap({ returnFocus: true })`
    fn parse_focus_trap(&mut self) -> ParseResult<FocusTrapDirective> {
        let (_, mut span) = self.parse_directive_head(false)?;
        let mut options = None;

        if self.eat(TokenKind::LParen) {
            if !self.is(TokenKind::RParen) {
                options = Some(self.parse_expression()?);
            }
            span = span.to(self.expect(TokenKind::RParen)?.span);
        }

        Ok(FocusTrapDirective { options, span })
    }

    /// `@client` / `@server`, optionally wrapping `{ children }`
    fn parse_boundary(&mut self, standalone: bool) -> ParseResult<BoundaryDirective> {
        let target = match self.peek().text() {
            "server" => BoundaryTarget::Server,
            _ => BoundaryTarget::Client,
        };
        let (_, mut span) = self.parse_directive_head(false)?;

        if self.is(TokenKind::LParen) {
            return Err(self.error_with_hint(
                ErrorKind::InvalidDirective,
                format!("'@{}' takes no arguments", self.previous().text()),
            ));
        }

        let mut children = Vec::new();
        if standalone && self.is(TokenKind::LBrace) {
            let (nodes, children_span) = self.parse_children()?;
            children = nodes;
            span = span.to(children_span);
        }

        Ok(BoundaryDirective {
            target,
            children,
            span,
        })
    }

    // ========================================================================
    // Router directives
    // ========================================================================

    /// `(path[, options])`
    fn parse_path_arguments(&mut self, directive: &str) -> ParseResult<(Expr, Option<Expr>, Span)> {
        let (mut arguments, close) = self.parse_arguments()?;
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(ParseError::new(
                ErrorKind::InvalidDirective,
                format!("'@{}' expects a path and optional options: @{}(path[, options])", directive, directive),
                self.previous().line,
                self.previous().column,
                close,
            ));
        }
        let options = if arguments.len() == 2 { arguments.pop() } else { None };
        let path = arguments.remove(0);
        Ok((path, options, close))
    }

    /// `@link("/about") "About"` or `@link("/about") { children }`
    fn parse_link(&mut self) -> ParseResult<LinkDirective> {
        let (_, head) = self.parse_directive_head(false)?;
        let (path, options, close) = self.parse_path_arguments("link")?;
        let mut span = head.to(close);

        let text = if self.is_any(&[TokenKind::String, TokenKind::Template]) {
            let token = self.advance();
            span = span.to(token.span);
            Some(self.parse_text(&token)?)
        } else {
            None
        };

        let children = if self.is(TokenKind::LBrace) {
            let (children, children_span) = self.parse_children()?;
            span = span.to(children_span);
            children
        } else {
            Vec::new()
        };

        Ok(LinkDirective {
            path,
            options,
            text,
            children,
            span,
        })
    }

    /// `@outlet` / `@outlet(sidebar)`
    fn parse_outlet(&mut self) -> ParseResult<OutletDirective> {
        let (_, mut span) = self.parse_directive_head(false)?;
        let mut container = None;

        if self.is(TokenKind::LParen) {
            let (mut arguments, close) = self.parse_arguments()?;
            if arguments.len() > 1 {
                return Err(self.error(ErrorKind::InvalidDirective, "'@outlet' takes at most one container name"));
            }
            container = arguments.pop();
            span = span.to(close);
        }

        Ok(OutletDirective { container, span })
    }

    fn parse_navigate(&mut self) -> ParseResult<NavigateDirective> {
        let (_, head) = self.parse_directive_head(false)?;
        let (path, options, close) = self.parse_path_arguments("navigate")?;
        Ok(NavigateDirective {
            path,
            options,
            span: head.to(close),
        })
    }

    /// `@back` / `@forward`, with optional empty parentheses
    fn parse_bare_router_directive(&mut self) -> ParseResult<Span> {
        let (_, mut span) = self.parse_directive_head(false)?;
        if self.eat(TokenKind::LParen) {
            span = span.to(self.expect(TokenKind::RParen)?.span);
        }
        Ok(span)
    }
}

fn interpolation_docs() -> String {
    crate::hints::for_kind(ErrorKind::InvalidInterpolation)
        .map(|hint| hint.docs())
        .unwrap_or_default()
}

/// Bare number or keyword literal in child position, rendered as its source text
fn literal_text(token: &Token) -> Text {
    Text {
        parts: vec![TextPart::Literal {
            value: token.raw.clone(),
        }],
        raw: token.raw.clone(),
        span: token.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Program;

    fn parse(source: &str) -> ParseResult<Program> {
        Parser::new(tokenize(source)).parse()
    }

    fn view(source: &str) -> Vec<ViewNode> {
        let program = parse(&format!("view {{\n{}\n}}", source)).unwrap();
        program.view.unwrap().children
    }

    fn view_err(source: &str) -> ParseError {
        parse(&format!("view {{\n{}\n}}", source)).unwrap_err()
    }

    fn element(node: &ViewNode) -> &Element {
        match node {
            ViewNode::Element(e) => e,
            other => panic!("expected element, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_element_with_text_and_children() {
        let nodes = view(r#"div.card { h1.title "Hello" p "World" }"#);
        let card = element(&nodes[0]);
        assert_eq!(card.selector, "div.card");
        assert_eq!(card.children.len(), 2);
        let title = element(&card.children[0]);
        assert_eq!(title.selector, "h1.title");
        assert_eq!(title.text_content[0].raw, "Hello");
    }

    #[test]
    fn test_interpolation_parts() {
        let nodes = view(r#"p "Count: {count + 1}""#);
        let text = &element(&nodes[0]).text_content[0];
        assert_eq!(text.parts.len(), 2);
        assert!(matches!(&text.parts[0], TextPart::Literal { value } if value == "Count: "));
        let TextPart::Interpolation { source, expression } = &text.parts[1] else {
            panic!("expected interpolation")
        };
        assert_eq!(source, "count + 1");
        assert!(matches!(expression, Expr::Binary { .. }));
    }

    #[test]
    fn test_interpolation_with_nested_braces() {
        let nodes = view(r#"p "Total: {format({ value: total })}!""#);
        let text = &element(&nodes[0]).text_content[0];
        assert_eq!(text.parts.len(), 3);
        assert!(matches!(&text.parts[2], TextPart::Literal { value } if value == "!"));
    }

    #[test]
    fn test_escaped_brace_is_literal() {
        let nodes = view(r#"p "Use \{name\} for names""#);
        let text = &element(&nodes[0]).text_content[0];
        assert!(!text.has_interpolation());
        assert!(matches!(&text.parts[0], TextPart::Literal { value } if value == "Use {name} for names"));
    }

    #[test]
    fn test_unclosed_interpolation() {
        let err = view_err(r#"p "Count: {count""#);
        assert_eq!(err.kind, ErrorKind::InvalidInterpolation);
    }

    #[test]
    fn test_interpolation_error_position() {
        let err = view_err(r#"p "Count: {count +}""#);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 19);
    }

    #[test]
    fn test_template_text_interpolation() {
        let nodes = view("p `Hi ${name}`");
        let text = &element(&nodes[0]).text_content[0];
        assert!(matches!(&text.parts[1], TextPart::Interpolation { source, .. } if source == "name"));
    }

    #[test]
    fn test_if_else_if_else_chain() {
        for source in [
            "@if (a) { p \"1\" } @else-if (b) { p \"2\" } @else { p \"3\" }",
            "@if (a) { p \"1\" } @else @if (b) { p \"2\" } @else { p \"3\" }",
            "@if (a) { p \"1\" } @else if (b) { p \"2\" } @else { p \"3\" }",
        ] {
            let nodes = view(source);
            assert_eq!(nodes.len(), 1, "{}", source);
            let ViewNode::If(directive) = &nodes[0] else { panic!("expected if") };
            assert_eq!(directive.else_if_branches.len(), 1);
            assert!(directive.alternate.is_some());
        }
    }

    #[test]
    fn test_if_chain_with_literal_bodies() {
        for source in [
            "@if (a) {1} @else-if (b) {2} @else {3}",
            "@if (a) {1} @else @if (b) {2} @else {3}",
        ] {
            let nodes = view(source);
            assert_eq!(nodes.len(), 1, "{}", source);
            let ViewNode::If(directive) = &nodes[0] else { panic!("expected if") };
            assert_eq!(directive.else_if_branches.len(), 1);
            assert!(directive.alternate.is_some());
            let ViewNode::Text(text) = &directive.consequent[0] else { panic!("expected text") };
            assert_eq!(text.raw, "1");
        }
    }

    #[test]
    fn test_literal_children() {
        let nodes = view("div { 42 10n true null }");
        let div = element(&nodes[0]);
        let raws: Vec<&str> = div
            .children
            .iter()
            .map(|node| match node {
                ViewNode::Text(text) => text.raw.as_str(),
                other => panic!("expected text, got {:?}", other.kind()),
            })
            .collect();
        assert_eq!(raws, ["42", "10n", "true", "null"]);
    }

    #[test]
    fn test_dangling_else() {
        let err = view_err("@else { p \"x\" }");
        assert_eq!(err.kind, ErrorKind::InvalidDirective);
    }

    #[test]
    fn test_for_with_index_and_key() {
        let nodes = view("@for (todo, i of todos) key(todo.id) { li \"{todo.text}\" }");
        let ViewNode::For(directive) = &nodes[0] else { panic!("expected for") };
        assert_eq!(directive.keyword, LoopKeyword::For);
        assert_eq!(directive.item, "todo");
        assert_eq!(directive.index.as_deref(), Some("i"));
        assert_eq!(directive.iteration, IterationKind::Of);
        assert!(directive.key.is_some());
        assert_eq!(directive.body.len(), 1);
    }

    #[test]
    fn test_each_in() {
        let nodes = view("@each (name in names) { span \"{name}\" }");
        let ViewNode::For(directive) = &nodes[0] else { panic!("expected each") };
        assert_eq!(directive.keyword, LoopKeyword::Each);
        assert_eq!(directive.iteration, IterationKind::In);
        assert!(directive.key.is_none());
    }

    #[test]
    fn test_for_missing_of() {
        let err = view_err("@for (item items) { }");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.help.is_some());
    }

    #[test]
    fn test_event_directive_with_modifiers() {
        let nodes = view("form @submit.prevent(save()) { button \"Save\" }");
        let form = element(&nodes[0]);
        let Directive::Event(event) = &form.directives[0] else { panic!("expected event") };
        assert_eq!(event.event, "submit");
        assert_eq!(event.modifiers, vec!["prevent"]);
        assert!(matches!(event.handler, Some(Expr::Call { .. })));
        assert_eq!(form.children.len(), 1);
    }

    #[test]
    fn test_model_modifiers() {
        let nodes = view("input @model.lazy.trim(form.name)");
        let Directive::Model(model) = &element(&nodes[0]).directives[0] else {
            panic!("expected model")
        };
        assert_eq!(model.modifiers, vec![ModelModifier::Lazy, ModelModifier::Trim]);
    }

    #[test]
    fn test_model_rejects_unknown_modifier() {
        let err = view_err("input @model.debounce(name)");
        assert_eq!(err.kind, ErrorKind::InvalidModifier);
        assert!(err.message.contains(".debounce"));
    }

    #[test]
    fn test_accessibility_directives() {
        let nodes = view(r#"div.modal @a11y(role="dialog", aria-modal=true) @focusTrap @live(assertive) { span @srOnly "Closed" }"#);
        let modal = element(&nodes[0]);
        assert_eq!(modal.directives.len(), 3);
        let Directive::A11y(a11y) = &modal.directives[0] else { panic!("expected a11y") };
        assert_eq!(a11y.attributes[1].name, "aria-modal");
        let Directive::Live(live) = &modal.directives[2] else { panic!("expected live") };
        assert_eq!(live.priority, "assertive");
        let span = element(&modal.children[0]);
        assert!(matches!(span.directives[0], Directive::SrOnly(_)));
    }

    #[test]
    fn test_boundaries() {
        let nodes = view("@client { Chart(data=points) }\ndiv @server \"static\"");
        let ViewNode::Boundary(client) = &nodes[0] else { panic!("expected boundary") };
        assert_eq!(client.target, BoundaryTarget::Client);
        assert_eq!(client.children.len(), 1);
        let div = element(&nodes[1]);
        assert!(matches!(&div.directives[0], Directive::Boundary(b) if b.target == BoundaryTarget::Server));
    }

    #[test]
    fn test_component_props() {
        let nodes = view(r#"Modal(title="Edit", open, onClose={() => close()}, ...rest, data-id=5)"#);
        let modal = element(&nodes[0]);
        assert_eq!(modal.selector, "Modal");
        assert_eq!(modal.props.len(), 5);
        assert!(matches!(&modal.props[1], ElementProp::Named { shorthand: true, name, .. } if name == "open"));
        assert!(matches!(&modal.props[2], ElementProp::Named { value: Expr::Arrow { .. }, .. }));
        assert!(matches!(&modal.props[3], ElementProp::Spread { .. }));
        assert!(matches!(&modal.props[4], ElementProp::Named { name, .. } if name == "data-id"));
    }

    #[test]
    fn test_slots() {
        let nodes = view("slot\nslot \"header\"\nslot \"footer\" { p \"Default footer\" }");
        assert_eq!(nodes.len(), 3);
        let ViewNode::Slot(default) = &nodes[0] else { panic!("expected slot") };
        assert!(default.name.is_none());
        let ViewNode::Slot(footer) = &nodes[2] else { panic!("expected slot") };
        assert_eq!(footer.name.as_deref(), Some("footer"));
        assert_eq!(footer.fallback.len(), 1);
    }

    #[test]
    fn test_router_directives() {
        let nodes = view(
            "nav { @link(\"/\") \"Home\" @link(\"/users\", { replace: true }) { span \"Users\" } }\n@outlet\n@outlet(sidebar)\n@navigate(\"/login\")\n@back\n@forward",
        );
        let nav = element(&nodes[0]);
        let ViewNode::Link(home) = &nav.children[0] else { panic!("expected link") };
        assert!(home.text.is_some());
        let ViewNode::Link(users) = &nav.children[1] else { panic!("expected link") };
        assert!(users.options.is_some());
        assert_eq!(users.children.len(), 1);
        assert!(matches!(&nodes[1], ViewNode::Outlet(o) if o.container.is_none()));
        assert!(matches!(&nodes[2], ViewNode::Outlet(o) if o.container.is_some()));
        assert!(matches!(nodes[3], ViewNode::Navigate(_)));
        assert!(matches!(nodes[4], ViewNode::Back(_)));
        assert!(matches!(nodes[5], ViewNode::Forward(_)));
    }

    #[test]
    fn test_navigate_requires_path() {
        let err = view_err("@navigate()");
        assert_eq!(err.kind, ErrorKind::InvalidDirective);
    }

    #[test]
    fn test_standalone_event_with_children() {
        let nodes = view("@click(toggle()) { span \"Toggle\" }");
        let ViewNode::Event(event) = &nodes[0] else { panic!("expected event") };
        assert_eq!(event.children.len(), 1);
    }

    #[test]
    fn test_model_outside_element() {
        let err = view_err("@model(name)");
        assert_eq!(err.kind, ErrorKind::InvalidDirective);
    }

    #[test]
    fn test_bare_text_child() {
        let nodes = view(r#"p { "Hello " strong "world" }"#);
        let p = element(&nodes[0]);
        assert!(matches!(p.children[0], ViewNode::Text(_)));
        assert!(matches!(p.children[1], ViewNode::Element(_)));
    }

    #[test]
    fn test_deep_view_nesting_is_limited() {
        let source = format!("view {{ {} }}", "div { ".repeat(300) + &"} ".repeat(300));
        let err = parse(&source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);
    }
}
