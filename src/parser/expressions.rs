//! Expression parsing.
//!
//! Precedence, lowest to highest:
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | assignment | `=` `+=` `-=` `*=` `/=` `&&=` `\|\|=` `??=` | Right |
//! | conditional | `? :` | Right |
//! | logical-or | `\|\|` `??` | Left |
//! | logical-and | `&&` | Left |
//! | comparison | `==` `===` `!=` `!==` `<` `>` `<=` `>=` | Left |
//! | additive | `+` `-` | Left |
//! | multiplicative | `*` `/` `%` `**` | Left |
//! | unary | `!` `-` `+` prefix `++` `--` | Prefix |
//! | postfix | `++` `--` | Postfix |
//!
//! Member access, calls and optional chaining bind tighter than all of them.

use super::core::{ParseResult, Parser};
use super::token::{Span, Token, TokenKind, TokenValue};
use crate::ast::{
    ArrowBody, AssignOp, BinaryOp, Expr, LiteralValue, ObjectMember, PropertyKey, UnaryOp, UpdateOp,
};
use crate::error::ErrorKind;

impl Parser {
    /// Parse a full expression, assignment included
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(|p| p.parse_assignment())
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_conditional()?;

        let Some(operator) = assign_op(self.current().kind) else {
            return Ok(target);
        };

        if !target.is_assignable() {
            return Err(self.error_with_hint(
                ErrorKind::InvalidAssignment,
                format!("Cannot assign to this expression with '{}'", self.current().raw),
            ));
        }

        self.advance();
        let value = self.nested(|p| p.parse_assignment())?;
        Ok(Expr::Assignment {
            span: target.span().to(value.span()),
            operator,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let test = self.parse_logical_or()?;
        if !self.eat(TokenKind::Question) {
            return Ok(test);
        }

        let consequent = self.nested(|p| p.parse_assignment())?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.nested(|p| p.parse_assignment())?;
        Ok(Expr::Conditional {
            span: test.span().to(alternate.span()),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_logical_and()?;
        loop {
            let operator = match self.current().kind {
                TokenKind::Or => BinaryOp::Or,
                TokenKind::Nullish => BinaryOp::Nullish,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_logical_and()?;
            left = binary(operator, left, right);
        }
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_comparison()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let operator = match self.current().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::EqEqEq => BinaryOp::StrictEq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::NotEqEq => BinaryOp::StrictNotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(operator, left, right);
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let operator = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(operator, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                TokenKind::StarStar => BinaryOp::Pow,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(operator, left, right);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.current().span;

        let operator = match self.current().kind {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let argument = self.nested(|p| p.parse_unary())?;
            return Ok(Expr::Unary {
                span: start.to(argument.span()),
                operator,
                argument: Box::new(argument),
            });
        }

        let update = match self.current().kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(operator) = update {
            self.advance();
            let argument = self.nested(|p| p.parse_unary())?;
            if !argument.is_assignable() {
                return Err(self.error_with_hint(
                    ErrorKind::InvalidAssignment,
                    "Invalid operand for prefix increment/decrement",
                ));
            }
            return Ok(Expr::Update {
                span: start.to(argument.span()),
                operator,
                prefix: true,
                argument: Box::new(argument),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let argument = self.parse_call_member()?;

        let operator = match self.current().kind {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(argument),
        };
        // `a\n++b` is two statements
        if self.current().line != self.previous().line {
            return Ok(argument);
        }
        if !argument.is_assignable() {
            return Err(self.error_with_hint(
                ErrorKind::InvalidAssignment,
                "Invalid operand for postfix increment/decrement",
            ));
        }

        let op_token = self.advance();
        Ok(Expr::Update {
            span: argument.span().to(op_token.span),
            operator,
            prefix: false,
            argument: Box::new(argument),
        })
    }

    /// Primary expression followed by `.name`, `?.name`, `[expr]`, `(args)`
    fn parse_call_member(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    expr = member(expr, property, false, false);
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    match self.current().kind {
                        TokenKind::LBracket => {
                            self.advance();
                            let property = self.parse_expression()?;
                            let close = self.expect(TokenKind::RBracket)?;
                            expr = member_span(expr, property, true, true, close.span);
                        }
                        TokenKind::LParen => {
                            let (arguments, close) = self.parse_arguments()?;
                            expr = call(expr, arguments, true, close);
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            expr = member(expr, property, false, true);
                        }
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let close = self.expect(TokenKind::RBracket)?;
                    expr = member_span(expr, property, true, false, close.span);
                }
                TokenKind::LParen => {
                    let (arguments, close) = self.parse_arguments()?;
                    expr = call(expr, arguments, false, close);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Property name after `.`: any identifier, reserved words included
    fn parse_member_name(&mut self) -> ParseResult<Expr> {
        let token = self.current();
        if token.kind == TokenKind::Ident || token.kind.is_keyword() {
            let token = self.advance();
            return Ok(identifier(&token));
        }
        Err(self.unexpected("property name"))
    }

    /// `( arg, ...spread, )` returning the closing paren span
    pub(super) fn parse_arguments(&mut self) -> ParseResult<(Vec<Expr>, Span)> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.is(TokenKind::RParen) {
            arguments.push(self.parse_spread_or_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok((arguments, close.span))
    }

    pub(super) fn parse_spread_or_expression(&mut self) -> ParseResult<Expr> {
        if self.is(TokenKind::Spread) {
            let start = self.advance().span;
            let argument = self.parse_expression()?;
            return Ok(Expr::Spread {
                span: start.to(argument.span()),
                argument: Box::new(argument),
            });
        }
        self.parse_expression()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token.number().unwrap_or_default();
                Ok(literal(LiteralValue::Number(value), &token))
            }
            TokenKind::BigInt => {
                self.advance();
                Ok(literal(LiteralValue::BigInt(token.text().to_string()), &token))
            }
            TokenKind::String => {
                self.advance();
                Ok(literal(LiteralValue::String(token.text().to_string()), &token))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                let value = matches!(token.value, TokenValue::Bool(true));
                Ok(literal(LiteralValue::Bool(value), &token))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(LiteralValue::Null, &token))
            }
            TokenKind::Template => {
                self.advance();
                Ok(Expr::TemplateLiteral {
                    text: token.text().to_string(),
                    raw: token.raw.clone(),
                    span: token.span,
                })
            }
            TokenKind::Ident if token.raw == "async" && self.is_async_arrow() => {
                self.advance();
                self.parse_arrow(token.span, true)
            }
            TokenKind::Ident if self.peek().kind == TokenKind::Arrow => self.parse_arrow(token.span, false),
            TokenKind::LParen if self.is_paren_arrow(self.pos) => self.parse_arrow(token.span, false),
            TokenKind::Ident => {
                self.advance();
                Ok(identifier(&token))
            }
            kind if kind.is_contextual_keyword() => {
                self.advance();
                Ok(identifier(&token))
            }
            // Dynamic `import("./Page.pulse")` for lazy routes
            TokenKind::Import if self.peek().kind == TokenKind::LParen => {
                self.advance();
                Ok(identifier(&token))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Error => Err(self.invalid_token()),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `async x => ...` or `async (...) => ...`
    fn is_async_arrow(&self) -> bool {
        match self.peek().kind {
            TokenKind::Ident => self.peek_at(2).kind == TokenKind::Arrow,
            TokenKind::LParen => self.is_paren_arrow(self.pos + 1),
            _ => false,
        }
    }

    /// Non-consuming scan: does the `(` at `index` close with `) =>`?
    fn is_paren_arrow(&self, index: usize) -> bool {
        let mut depth = 0usize;
        let mut i = index;
        while let Some(token) = self.tokens.get(i) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return token.kind == TokenKind::RParen
                            && self.tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Arrow);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn parse_arrow(&mut self, start: Span, is_async: bool) -> ParseResult<Expr> {
        let params = if self.is(TokenKind::LParen) {
            self.parse_arguments()?.0
        } else {
            let token = self.expect(TokenKind::Ident)?;
            vec![identifier(&token)]
        };

        if !params.iter().all(is_valid_param) {
            return Err(self.error(ErrorKind::UnexpectedToken, "Invalid arrow function parameter"));
        }

        self.expect(TokenKind::Arrow)?;

        let (body, end) = if self.is(TokenKind::LBrace) {
            let raw = self.parse_raw_block()?;
            let body = match self.detached_text(raw) {
                Some(text) => ArrowBody::Inline(text),
                None => ArrowBody::Block(raw),
            };
            (body, self.previous().span)
        } else {
            let expr = self.nested(|p| p.parse_assignment())?;
            let span = expr.span();
            (ArrowBody::Expression(Box::new(expr)), span)
        };

        Ok(Expr::Arrow {
            params,
            body,
            is_async,
            span: start.to(end),
        })
    }

    fn parse_array(&mut self) -> ParseResult<Expr> {
        let open = self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.is(TokenKind::RBracket) {
            elements.push(self.parse_spread_or_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RBracket)?;
        Ok(Expr::Array {
            elements,
            span: open.span.to(close.span),
        })
    }

    fn parse_object(&mut self) -> ParseResult<Expr> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();

        while !self.is(TokenKind::RBrace) {
            properties.push(self.parse_object_member()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok(Expr::Object {
            properties,
            span: open.span.to(close.span),
        })
    }

    fn parse_object_member(&mut self) -> ParseResult<ObjectMember> {
        let token = self.current().clone();

        if token.kind == TokenKind::Spread {
            self.advance();
            let argument = self.parse_expression()?;
            return Ok(ObjectMember::Spread {
                span: token.span.to(argument.span()),
                argument,
            });
        }

        let key = match token.kind {
            TokenKind::Ident => PropertyKey::Identifier(token.raw.clone()),
            kind if kind.is_keyword() => PropertyKey::Identifier(token.raw.clone()),
            TokenKind::String => PropertyKey::String(token.text().to_string()),
            TokenKind::Number => PropertyKey::Number(token.number().unwrap_or_default()),
            TokenKind::LBracket => {
                self.advance();
                let key = self.parse_expression()?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_expression()?;
                return Ok(ObjectMember::Property {
                    span: token.span.to(value.span()),
                    key: PropertyKey::Computed(Box::new(key)),
                    value,
                    shorthand: false,
                });
            }
            _ => return Err(self.unexpected("property name")),
        };
        self.advance();

        // { count } is { count: count }
        let shorthand = token.kind == TokenKind::Ident
            && self.is_any(&[TokenKind::Comma, TokenKind::RBrace]);
        if shorthand {
            return Ok(ObjectMember::Property {
                key,
                value: identifier(&token),
                shorthand: true,
                span: token.span,
            });
        }

        self.expect(TokenKind::Colon)?;
        let value = self.parse_expression()?;
        Ok(ObjectMember::Property {
            span: token.span.to(value.span()),
            key,
            value,
            shorthand: false,
        })
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        TokenKind::AndEq => AssignOp::AndAssign,
        TokenKind::OrEq => AssignOp::OrAssign,
        TokenKind::NullishEq => AssignOp::NullishAssign,
        _ => return None,
    };
    Some(op)
}

/// Names, `x = default`, `...rest` and destructuring patterns
fn is_valid_param(param: &Expr) -> bool {
    match param {
        Expr::Identifier { .. } | Expr::Object { .. } | Expr::Array { .. } => true,
        Expr::Assignment {
            operator: AssignOp::Assign,
            target,
            ..
        } => matches!(**target, Expr::Identifier { .. }),
        Expr::Spread { argument, .. } => matches!(**argument, Expr::Identifier { .. }),
        _ => false,
    }
}

fn binary(operator: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        span: left.span().to(right.span()),
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn member(object: Expr, property: Expr, computed: bool, optional: bool) -> Expr {
    let end = property.span();
    member_span(object, property, computed, optional, end)
}

fn member_span(object: Expr, property: Expr, computed: bool, optional: bool, end: Span) -> Expr {
    Expr::Member {
        span: object.span().to(end),
        object: Box::new(object),
        property: Box::new(property),
        computed,
        optional,
    }
}

fn call(callee: Expr, arguments: Vec<Expr>, optional: bool, end: Span) -> Expr {
    Expr::Call {
        span: callee.span().to(end),
        callee: Box::new(callee),
        arguments,
        optional,
    }
}

pub(super) fn identifier(token: &Token) -> Expr {
    Expr::Identifier {
        name: token.raw.clone(),
        span: token.span,
    }
}

fn literal(value: LiteralValue, token: &Token) -> Expr {
    Expr::Literal {
        value,
        raw: token.raw.clone(),
        span: token.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use crate::error::ParseError;
    use crate::parser::lexer::tokenize;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(tokenize(source));
        let expr = parser.parse_expression().unwrap();
        assert!(parser.is(TokenKind::Eof), "trailing tokens after {:?}", source);
        expr
    }

    fn expr_err(source: &str) -> ParseError {
        Parser::new(tokenize(source)).parse_expression().unwrap_err()
    }

    fn num(e: &Expr) -> f64 {
        match e {
            Expr::Literal { value: LiteralValue::Number(n), .. } => *n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let e = expr("1 + 2 * 3");
        let Expr::Binary { operator, left, right, .. } = e else { panic!("expected binary") };
        assert_eq!(operator, BinaryOp::Add);
        assert_eq!(num(&left), 1.0);
        let Expr::Binary { operator, left, right, .. } = *right else { panic!("expected binary") };
        assert_eq!(operator, BinaryOp::Mul);
        assert_eq!(num(&left), 2.0);
        assert_eq!(num(&right), 3.0);
    }

    #[test]
    fn test_left_associative() {
        let e = expr("10 - 4 - 3");
        let Expr::Binary { left, right, .. } = e else { panic!("expected binary") };
        assert!(matches!(*left, Expr::Binary { operator: BinaryOp::Sub, .. }));
        assert_eq!(num(&right), 3.0);
    }

    #[test]
    fn test_logical_and_binds_tighter_than_or() {
        let e = expr("a || b && c");
        assert!(matches!(
            e,
            Expr::Binary { operator: BinaryOp::Or, ref right, .. }
                if matches!(**right, Expr::Binary { operator: BinaryOp::And, .. })
        ));
    }

    #[test]
    fn test_nullish_coalescing() {
        let e = expr("user?.name ?? \"Anonymous\"");
        let Expr::Binary { operator, left, .. } = e else { panic!("expected binary") };
        assert_eq!(operator, BinaryOp::Nullish);
        assert!(matches!(*left, Expr::Member { optional: true, .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let e = expr("a = b = 1");
        let Expr::Assignment { value, .. } = e else { panic!("expected assignment") };
        assert!(matches!(*value, Expr::Assignment { .. }));
    }

    #[test]
    fn test_compound_assignment() {
        let e = expr("count += step * 2");
        assert!(matches!(e, Expr::Assignment { operator: AssignOp::AddAssign, .. }));
        let e = expr("cache ??= {}");
        assert!(matches!(e, Expr::Assignment { operator: AssignOp::NullishAssign, .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = expr_err("1 = 2");
        assert_eq!(err.kind, ErrorKind::InvalidAssignment);
    }

    #[test]
    fn test_ternary() {
        let e = expr("done ? \"yes\" : count > 0 ? \"some\" : \"none\"");
        let Expr::Conditional { alternate, .. } = e else { panic!("expected conditional") };
        assert!(matches!(*alternate, Expr::Conditional { .. }));
    }

    #[test]
    fn test_unary_and_update() {
        assert!(matches!(expr("!visible"), Expr::Unary { operator: UnaryOp::Not, .. }));
        assert!(matches!(expr("-x"), Expr::Unary { operator: UnaryOp::Neg, .. }));
        assert!(matches!(expr("count++"), Expr::Update { prefix: false, operator: UpdateOp::Increment, .. }));
        assert!(matches!(expr("--count"), Expr::Update { prefix: true, operator: UpdateOp::Decrement, .. }));
    }

    #[test]
    fn test_member_call_chain() {
        let e = expr("items.filter(i => i.done).length");
        let Expr::Member { object, property, .. } = e else { panic!("expected member") };
        assert_eq!(property.as_identifier(), Some("length"));
        let Expr::Call { callee, arguments, .. } = *object else { panic!("expected call") };
        assert_eq!(arguments.len(), 1);
        assert!(matches!(arguments[0], Expr::Arrow { .. }));
        assert!(matches!(*callee, Expr::Member { .. }));
    }

    #[test]
    fn test_computed_member() {
        let e = expr("rows[i][\"name\"]");
        assert!(matches!(e, Expr::Member { computed: true, .. }));
    }

    #[test]
    fn test_keyword_as_member_name() {
        let e = expr("route.params.id");
        let Expr::Member { object, .. } = e else { panic!("expected member") };
        let Expr::Member { object, .. } = *object else { panic!("expected member") };
        assert_eq!(object.as_identifier(), Some("route"));
    }

    #[test]
    fn test_paren_arrow_vs_group() {
        assert!(matches!(expr("(a, b) => a + b"), Expr::Arrow { ref params, .. } if params.len() == 2));
        assert!(matches!(expr("(a + b) * 2"), Expr::Binary { operator: BinaryOp::Mul, .. }));
        assert!(matches!(expr("() => save()"), Expr::Arrow { ref params, .. } if params.is_empty()));
    }

    #[test]
    fn test_arrow_with_default_and_rest() {
        let e = expr("(a = 1, ...rest) => a");
        let Expr::Arrow { params, .. } = e else { panic!("expected arrow") };
        assert!(matches!(params[0], Expr::Assignment { .. }));
        assert!(matches!(params[1], Expr::Spread { .. }));
    }

    #[test]
    fn test_arrow_block_body_is_raw() {
        let e = expr("(e) => { e.preventDefault(); submit() }");
        let Expr::Arrow { body: ArrowBody::Block(raw), .. } = e else { panic!("expected block arrow") };
        assert_eq!(raw.len(), 9);
    }

    #[test]
    fn test_async_arrow() {
        assert!(matches!(expr("async (id) => fetchUser(id)"), Expr::Arrow { is_async: true, .. }));
        assert!(matches!(expr("async id => fetchUser(id)"), Expr::Arrow { is_async: true, .. }));
    }

    #[test]
    fn test_invalid_arrow_param() {
        let err = expr_err("(1) => x");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.message.contains("arrow function parameter"));
    }

    #[test]
    fn test_object_literal() {
        let e = expr("{ count, label: \"x\", ...rest, [key]: 1, \"data-id\": 2, if: true }");
        let Expr::Object { properties, .. } = e else { panic!("expected object") };
        assert_eq!(properties.len(), 6);
        assert!(matches!(properties[0], ObjectMember::Property { shorthand: true, .. }));
        assert!(matches!(properties[2], ObjectMember::Spread { .. }));
        assert!(matches!(properties[3], ObjectMember::Property { key: PropertyKey::Computed(_), .. }));
        assert!(matches!(properties[4], ObjectMember::Property { key: PropertyKey::String(_), .. }));
    }

    #[test]
    fn test_array_with_spread_and_trailing_comma() {
        let e = expr("[...items, next,]");
        let Expr::Array { elements, .. } = e else { panic!("expected array") };
        assert_eq!(elements.len(), 2);
        assert!(matches!(elements[0], Expr::Spread { .. }));
    }

    #[test]
    fn test_template_literal_is_opaque() {
        let e = expr("`Hello ${name}!`");
        let Expr::TemplateLiteral { text, raw, .. } = e else { panic!("expected template") };
        assert_eq!(text, "Hello ${name}!");
        assert_eq!(raw, "`Hello ${name}!`");
    }

    #[test]
    fn test_bigint_literal() {
        let e = expr("9007199254740993n");
        assert!(matches!(e, Expr::Literal { value: LiteralValue::BigInt(ref s), .. } if s == "9007199254740993n"));
    }

    #[test]
    fn test_optional_call() {
        let e = expr("onClose?.()");
        assert!(matches!(e, Expr::Call { optional: true, .. }));
    }

    #[test]
    fn test_exponent_operator() {
        assert!(matches!(expr("2 ** 8"), Expr::Binary { operator: BinaryOp::Pow, .. }));
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        let options = ParseOptions {
            max_depth: 32,
            ..ParseOptions::default()
        };
        let err = Parser::with_options(tokenize(&source), options)
            .parse_expression()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_missing_expression() {
        let err = expr_err("1 +");
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert!(err.message.contains("Expected expression"));
    }
}
