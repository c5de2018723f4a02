use super::token::{Span, Token, TokenKind, TokenValue};
use tracing::{debug, trace};

/// Words that stay plain identifiers inside a style block, where CSS
/// property and value text reuses them (`transform-style`, `ease-in-out`).
const STYLE_IDENTIFIERS: &[&str] = &[
    "style", "in", "from", "to", "if", "else", "for", "as", "of", "true", "false", "null",
    "export", "import",
];

/// Start of a token: byte offset plus 1-based line/column
#[derive(Debug, Clone, Copy)]
struct Mark {
    byte: usize,
    line: u32,
    column: u32,
}

/// Single-pass lexer for `.pulse` source.
///
/// Context (view block, style block, inside parentheses) is tracked with an
/// explicit stack: every `{` pushes the kind of block it belongs to, every
/// `}` pops it. A `{` that directly follows a top-level block keyword pushes
/// that keyword; nested braces inherit their parent's kind.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    blocks: Vec<Option<TokenKind>>,
    paren_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            blocks: Vec::new(),
            paren_depth: 0,
        }
    }

    /// Tokenize the entire source. The result always ends with `EOF`.
    pub fn tokenize(mut self) -> Vec<Token> {
        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            self.next_token();
        }

        let end = self.mark();
        self.push(TokenKind::Eof, TokenValue::None, end);

        let errors = self.tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
        debug!(tokens = self.tokens.len(), errors, "tokenized source");
        self.tokens
    }

    // === Context queries ===

    fn current_block(&self) -> Option<TokenKind> {
        self.blocks.last().copied().flatten()
    }

    fn is_style_context(&self) -> bool {
        self.current_block() == Some(TokenKind::Style)
    }

    /// Inside a view block, outside parentheses, and not right after `@`
    fn is_view_context(&self) -> bool {
        self.current_block() == Some(TokenKind::View)
            && self.paren_depth == 0
            && self.tokens.last().map(|t| t.kind) != Some(TokenKind::At)
    }

    // === Dispatch ===

    fn next_token(&mut self) {
        let start = self.mark();
        let Some(ch) = self.peek_char() else { return };

        if is_ident_start(ch) {
            self.lex_word(start);
            return;
        }

        if ch.is_ascii_digit()
            || (ch == '.' && self.peek_next_char().is_some_and(|c| c.is_ascii_digit()))
        {
            self.lex_number(start);
            return;
        }

        match ch {
            '"' | '\'' => self.lex_string(start, ch),
            '`' => self.lex_template(start),
            '@' => self.lex_at(start),
            '#' => self.lex_hash(start),
            '.' => self.lex_dot(start),
            '-' if self.is_style_context() && self.starts_style_identifier() => {
                self.lex_word(start)
            }
            _ => self.lex_punctuation(start, ch),
        }
    }

    /// `-webkit-box` or `--main-color` inside a style block
    fn starts_style_identifier(&self) -> bool {
        match self.peek_next_char() {
            Some('-') => self.peek_nth_char(2).is_some_and(|c| is_ident_start(c) || c == '-'),
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn lex_word(&mut self, start: Mark) {
        let style = self.is_style_context();
        let view = self.is_view_context();

        self.advance();
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) || (style && ch == '-') {
                self.advance();
            } else {
                break;
            }
        }

        let word = &self.source[start.byte..self.pos];

        if style {
            if word == "url" && self.peek_char() == Some('(') {
                self.push_word(start, word.to_string());
                self.lex_url_argument();
                return;
            }
            if STYLE_IDENTIFIERS.contains(&word) {
                self.push_word(start, word.to_string());
                return;
            }
        }

        if let Some(kind) = TokenKind::keyword(word) {
            let value = match kind {
                TokenKind::True => TokenValue::Bool(true),
                TokenKind::False => TokenValue::Bool(false),
                TokenKind::Null => TokenValue::Null,
                _ => TokenValue::Str(word.to_string()),
            };
            self.push(kind, value, start);
            return;
        }

        if view && self.continues_selector() {
            self.lex_selector(start);
            return;
        }

        let word = word.to_string();
        self.push_word(start, word);
    }

    /// In a view block a name followed by `.`, `#`, `[`, `{`, a space, or a
    /// hyphenated tag continuation reads as a selector.
    fn continues_selector(&self) -> bool {
        match self.peek_char() {
            Some('.') | Some('#') => self.peek_next_char().is_some_and(is_selector_name_start),
            Some('[') | Some('{') | Some(' ') | Some('\t') => true,
            Some('-') => self.peek_next_char().is_some_and(|c| c.is_alphabetic()),
            _ => false,
        }
    }

    /// Continue a selector that began at `start`: tag, `.class`, `#id`, `[attr=value]`
    fn lex_selector(&mut self, start: Mark) {
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) || ch == '-' {
                self.advance();
            } else if (ch == '.' || ch == '#')
                && self.peek_next_char().is_some_and(is_selector_name_start)
            {
                self.advance();
            } else if ch == '[' {
                self.consume_attribute_selector();
            } else {
                break;
            }
        }

        let text = self.source[start.byte..self.pos].to_string();
        self.push(TokenKind::Selector, TokenValue::Str(text), start);
    }

    fn consume_attribute_selector(&mut self) {
        self.advance(); // [
        let mut quote: Option<char> = None;
        while let Some(ch) = self.peek_char() {
            self.advance();
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None if ch == '"' || ch == '\'' => quote = Some(ch),
                None if ch == ']' => return,
                None => {}
            }
        }
    }

    /// Unquoted `url(...)` argument inside a style block, kept as one token
    fn lex_url_argument(&mut self) {
        let open = self.mark();
        self.advance();
        self.push(TokenKind::LParen, TokenValue::None, open);

        self.skip_inline_whitespace();
        if matches!(self.peek_char(), Some('"') | Some('\'')) {
            return;
        }

        let start = self.mark();
        while let Some(ch) = self.peek_char() {
            if ch == ')' || ch == '\n' {
                break;
            }
            self.advance();
        }
        let text = self.source[start.byte..self.pos].trim_end().to_string();
        if !text.is_empty() {
            self.push(TokenKind::Ident, TokenValue::Str(text), start);
        }
    }

    fn lex_at(&mut self, start: Mark) {
        self.advance();
        self.push(TokenKind::At, TokenValue::None, start);

        if !self.peek_char().is_some_and(is_ident_start) {
            return;
        }

        let style = self.is_style_context();
        let name_start = self.mark();
        while let Some(ch) = self.peek_char() {
            let hyphenated =
                ch == '-' && self.peek_next_char().is_some_and(|c| c.is_alphabetic());
            if is_ident_continue(ch) || hyphenated {
                self.advance();
            } else {
                break;
            }
        }

        let name = self.source[name_start.byte..self.pos].to_string();
        let kind = if style {
            TokenKind::Ident
        } else {
            TokenKind::keyword(&name).unwrap_or(TokenKind::Ident)
        };
        self.push(kind, TokenValue::Str(name), name_start);

        if style {
            return;
        }

        // @click.prevent.stop
        while self.peek_char() == Some('.') && self.peek_next_char().is_some_and(is_ident_start) {
            let mod_start = self.mark();
            self.advance();
            let name_start = self.pos;
            while self.peek_char().is_some_and(is_ident_continue) {
                self.advance();
            }
            let modifier = self.source[name_start..self.pos].to_string();
            self.push(TokenKind::DirectiveMod, TokenValue::Str(modifier), mod_start);
        }
    }

    fn lex_hash(&mut self, start: Mark) {
        if self.is_style_context() {
            let digits = self.bytes[self.pos + 1..]
                .iter()
                .take_while(|b| b.is_ascii_hexdigit())
                .count();
            let after = self.source[self.pos + 1 + digits..].chars().next();
            let terminated = !after.is_some_and(|c| is_ident_continue(c) || c == '-');
            if (3..=8).contains(&digits) && terminated {
                for _ in 0..=digits {
                    self.advance();
                }
                let text = self.source[start.byte..self.pos].to_string();
                self.push(TokenKind::HexColor, TokenValue::Str(text), start);
                return;
            }
        }

        if self.is_view_context() && self.peek_next_char().is_some_and(is_selector_name_start) {
            self.advance();
            self.lex_selector(start);
            return;
        }

        self.advance();
        self.push(TokenKind::Hash, TokenValue::None, start);
    }

    fn lex_dot(&mut self, start: Mark) {
        if self.peek_next_char() == Some('.') && self.peek_nth_char(2) == Some('.') {
            self.advance();
            self.advance();
            self.advance();
            self.push(TokenKind::Spread, TokenValue::None, start);
            return;
        }

        if self.is_view_context() && self.peek_next_char().is_some_and(is_selector_name_start) {
            self.advance();
            self.lex_selector(start);
            return;
        }

        self.advance();
        self.push(TokenKind::Dot, TokenValue::None, start);
    }

    fn lex_punctuation(&mut self, start: Mark, ch: char) {
        let next = self.peek_next_char();
        let third = self.peek_nth_char(2);

        let (kind, len) = match ch {
            '{' => (TokenKind::LBrace, 1),
            '}' => (TokenKind::RBrace, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '[' => (TokenKind::LBracket, 1),
            ']' => (TokenKind::RBracket, 1),
            ':' => (TokenKind::Colon, 1),
            ';' => (TokenKind::Semicolon, 1),
            ',' => (TokenKind::Comma, 1),
            '~' => (TokenKind::Tilde, 1),
            '%' => (TokenKind::Percent, 1),
            '?' => match (next, third) {
                (Some('?'), Some('=')) => (TokenKind::NullishEq, 3),
                (Some('?'), _) => (TokenKind::Nullish, 2),
                // `a?.5:b` is a conditional, not optional chaining
                (Some('.'), Some(c)) if !c.is_ascii_digit() => (TokenKind::QuestionDot, 2),
                (Some('.'), None) => (TokenKind::QuestionDot, 2),
                _ => (TokenKind::Question, 1),
            },
            '=' => match (next, third) {
                (Some('='), Some('=')) => (TokenKind::EqEqEq, 3),
                (Some('='), _) => (TokenKind::EqEq, 2),
                (Some('>'), _) => (TokenKind::Arrow, 2),
                _ => (TokenKind::Eq, 1),
            },
            '!' => match (next, third) {
                (Some('='), Some('=')) => (TokenKind::NotEqEq, 3),
                (Some('='), _) => (TokenKind::NotEq, 2),
                _ => (TokenKind::Not, 1),
            },
            '<' => match next {
                Some('=') => (TokenKind::LtEq, 2),
                _ => (TokenKind::Lt, 1),
            },
            '>' => match next {
                Some('=') => (TokenKind::GtEq, 2),
                _ => (TokenKind::Gt, 1),
            },
            '&' => match (next, third) {
                (Some('&'), Some('=')) => (TokenKind::AndEq, 3),
                (Some('&'), _) => (TokenKind::And, 2),
                _ => (TokenKind::Ampersand, 1),
            },
            '|' => match (next, third) {
                (Some('|'), Some('=')) => (TokenKind::OrEq, 3),
                (Some('|'), _) => (TokenKind::Or, 2),
                _ => (TokenKind::Error, 1),
            },
            '+' => match next {
                Some('+') => (TokenKind::PlusPlus, 2),
                Some('=') => (TokenKind::PlusEq, 2),
                _ => (TokenKind::Plus, 1),
            },
            '-' => match next {
                Some('-') => (TokenKind::MinusMinus, 2),
                Some('=') => (TokenKind::MinusEq, 2),
                _ => (TokenKind::Minus, 1),
            },
            '*' => match next {
                Some('*') => (TokenKind::StarStar, 2),
                Some('=') => (TokenKind::StarEq, 2),
                _ => (TokenKind::Star, 1),
            },
            '/' => match next {
                Some('=') => (TokenKind::SlashEq, 2),
                _ => (TokenKind::Slash, 1),
            },
            _ => (TokenKind::Error, 1),
        };

        for _ in 0..len {
            self.advance();
        }

        let value = if kind == TokenKind::Error {
            TokenValue::Str(format!("Unexpected character '{}'", ch))
        } else {
            TokenValue::None
        };
        self.push(kind, value, start);
    }

    // === Literals ===

    fn lex_number(&mut self, start: Mark) {
        let radix = match (self.peek_char(), self.peek_next_char()) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('b' | 'B')) => Some(2),
            (Some('0'), Some('o' | 'O')) => Some(8),
            _ => None,
        };

        let digits = if let Some(radix) = radix {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while self.peek_char().is_some_and(|c| c.is_digit(radix) || c == '_') {
                self.advance();
            }
            self.source[digits_start..self.pos].replace('_', "")
        } else {
            self.consume_decimal_digits();
            if self.peek_char() == Some('.') && self.peek_next_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                self.consume_decimal_digits();
            }
            // Only an exponent when a digit or sign follows: `1.5em` keeps `em` as a unit
            if matches!(self.peek_char(), Some('e' | 'E')) {
                let exponent = match self.peek_next_char() {
                    Some(c) if c.is_ascii_digit() => true,
                    Some('+' | '-') => self.peek_nth_char(2).is_some_and(|c| c.is_ascii_digit()),
                    _ => false,
                };
                if exponent {
                    self.advance();
                    if matches!(self.peek_char(), Some('+' | '-')) {
                        self.advance();
                    }
                    self.consume_decimal_digits();
                }
            }
            self.source[start.byte..self.pos].replace('_', "")
        };

        let is_bigint = self.peek_char() == Some('n')
            && !self.peek_next_char().is_some_and(is_ident_continue)
            && (radix.is_some() || !digits.contains(['.', 'e', 'E']));
        if is_bigint {
            self.advance();
            let value = match radix {
                Some(radix) => u128::from_str_radix(&digits, radix)
                    .map(|n| format!("{}n", n))
                    .unwrap_or_else(|_| format!("{}n", digits)),
                None => format!("{}n", digits),
            };
            self.push(TokenKind::BigInt, TokenValue::BigInt(value), start);
            return;
        }

        let parsed = match radix {
            Some(radix) => u64::from_str_radix(&digits, radix).ok().map(|n| n as f64),
            None => digits.parse::<f64>().ok(),
        };

        match parsed {
            Some(n) => self.push(TokenKind::Number, TokenValue::Number(n), start),
            None => {
                let raw = &self.source[start.byte..self.pos];
                let message = format!("Invalid number literal '{}'", raw);
                self.push(TokenKind::Error, TokenValue::Str(message), start);
            }
        }
    }

    fn consume_decimal_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    fn lex_string(&mut self, start: Mark, quote: char) {
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek_char() {
                None => {
                    let message = "Unterminated string literal".to_string();
                    self.push(TokenKind::Error, TokenValue::Str(message), start);
                    return;
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut value);
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.push(TokenKind::String, TokenValue::Str(value), start);
    }

    fn read_escape(&mut self, value: &mut String) {
        let Some(ch) = self.peek_char() else { return };
        self.advance();
        match ch {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' => value.push('\0'),
            // Line continuation
            '\n' => {}
            // Braces keep their backslash so text interpolation can tell them apart
            '{' | '}' => {
                value.push('\\');
                value.push(ch);
            }
            'x' => {
                let code = self.take_hex_digits(2);
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(c) => value.push(c),
                    None => value.push_str(&code),
                }
            }
            'u' => {
                let code = if self.peek_char() == Some('{') {
                    self.advance();
                    let mut code = String::new();
                    while let Some(c) = self.peek_char() {
                        self.advance();
                        if c == '}' {
                            break;
                        }
                        code.push(c);
                    }
                    code
                } else {
                    self.take_hex_digits(4)
                };
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(c) => value.push(c),
                    None => value.push_str(&code),
                }
            }
            other => value.push(other),
        }
    }

    fn take_hex_digits(&mut self, count: usize) -> String {
        let mut code = String::new();
        for _ in 0..count {
            match self.peek_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    code.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        code
    }

    /// Back-tick template. The value is the text between the back-ticks,
    /// `${...}` expressions included verbatim.
    fn lex_template(&mut self, start: Mark) {
        self.advance();
        let content_start = self.pos;
        let mut depth = 0usize;

        loop {
            match self.peek_char() {
                None => {
                    let message = "Unterminated template literal".to_string();
                    self.push(TokenKind::Error, TokenValue::Str(message), start);
                    return;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('$') if self.peek_next_char() == Some('{') => {
                    depth += 1;
                    self.advance();
                    self.advance();
                }
                Some('{') if depth > 0 => {
                    depth += 1;
                    self.advance();
                }
                Some('}') if depth > 0 => {
                    depth -= 1;
                    self.advance();
                }
                Some('`') if depth == 0 => break,
                Some(_) => self.advance(),
            }
        }

        let content = self.source[content_start..self.pos].to_string();
        self.advance(); // closing back-tick
        self.push(TokenKind::Template, TokenValue::Str(content), start);
    }

    // === Trivia ===

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek_next_char() == Some('/') && self.line_comment_allowed() => {
                    while !self.at_eof() && self.peek_char() != Some('\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next_char() == Some('*') => {
                    let start = self.mark();
                    self.advance();
                    self.advance();
                    loop {
                        if self.at_eof() {
                            let message = "Unterminated block comment".to_string();
                            self.push(TokenKind::Error, TokenValue::Str(message), start);
                            return;
                        }
                        if self.peek_char() == Some('*') && self.peek_next_char() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    /// `//` starts a comment everywhere except glued to text inside a style
    /// block, where it is part of a value such as `http://`.
    fn line_comment_allowed(&self) -> bool {
        if !self.is_style_context() || self.pos == 0 {
            return true;
        }
        self.source[..self.pos]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || c == ';' || c == '{' || c == '}')
    }

    // === Low-level helpers ===

    fn push(&mut self, kind: TokenKind, value: TokenValue, start: Mark) {
        match kind {
            TokenKind::LBrace => {
                let block = if self.blocks.is_empty() {
                    let opener = self.tokens.last().map(|t| t.kind);
                    match opener {
                        Some(k) if k.is_block_keyword() => {
                            self.paren_depth = 0;
                            Some(k)
                        }
                        _ => None,
                    }
                } else {
                    self.current_block()
                };
                self.blocks.push(block);
            }
            TokenKind::RBrace => {
                self.blocks.pop();
            }
            TokenKind::LParen => self.paren_depth += 1,
            TokenKind::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }

        let token = Token {
            kind,
            value,
            raw: self.source[start.byte..self.pos].to_string(),
            line: start.line,
            column: start.column,
            span: Span::new(start.byte, self.pos),
        };
        trace!(kind = ?token.kind, raw = %token.raw, line = token.line, "token");
        self.tokens.push(token);
    }

    fn push_word(&mut self, start: Mark, word: String) {
        self.push(TokenKind::Ident, TokenValue::Str(word), start);
    }

    fn mark(&self) -> Mark {
        Mark {
            byte: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek_char(&self) -> Option<char> {
        if self.at_eof() {
            return None;
        }
        let b = self.bytes[self.pos];
        if b < 128 {
            Some(b as char)
        } else {
            self.source[self.pos..].chars().next()
        }
    }

    fn peek_next_char(&self) -> Option<char> {
        self.peek_nth_char(1)
    }

    fn peek_nth_char(&self, n: usize) -> Option<char> {
        self.source.get(self.pos..)?.chars().nth(n)
    }

    fn advance(&mut self) {
        let Some(ch) = self.peek_char() else { return };
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn is_selector_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-'
}

/// Tokenize source code
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_ends_with_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_block_keywords() {
        assert_eq!(
            kinds("state { }"),
            vec![TokenKind::State, TokenKind::LBrace, TokenKind::RBrace, TokenKind::Eof]
        );
    }

    #[test]
    fn test_style_words_are_identifiers() {
        let tokens = tokenize("style { .card { transform-style: preserve-3d; transition: all 1s ease-in-out } }");
        let styles: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::Style).collect();
        assert_eq!(styles.len(), 1, "only the block keyword is STYLE");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ident && t.raw == "transform-style"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ident && t.raw == "ease-in-out"));
    }

    #[test]
    fn test_style_keyword_list_forced_to_identifier() {
        let tokens = tokenize("style { @keyframes fade { from { opacity: 0 } to { opacity: 1 } } }");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ident && t.raw == "from"));
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::From));
    }

    #[test]
    fn test_selector_in_view() {
        let tokens = tokenize("view { div.container { } }");
        assert_eq!(tokens[2].kind, TokenKind::Selector);
        assert_eq!(tokens[2].text(), "div.container");
    }

    #[test]
    fn test_selector_not_in_parens() {
        let tokens = tokenize("view { @if (div.container) { } }");
        let idx = tokens.iter().position(|t| t.raw == "div").unwrap();
        assert_eq!(tokens[idx].kind, TokenKind::Ident);
        assert_eq!(tokens[idx + 1].kind, TokenKind::Dot);
        assert_eq!(tokens[idx + 2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_selector_not_outside_view() {
        assert_eq!(
            kinds("div.container"),
            vec![TokenKind::Ident, TokenKind::Dot, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_selector_with_id_and_attribute() {
        let tokens = tokenize(r#"view { input#name.field[type="text"] }"#);
        assert_eq!(tokens[2].kind, TokenKind::Selector);
        assert_eq!(tokens[2].text(), r#"input#name.field[type="text"]"#);
    }

    #[test]
    fn test_bare_class_selector_in_view() {
        let tokens = tokenize("view { .card-body { } }");
        assert_eq!(tokens[2].kind, TokenKind::Selector);
        assert_eq!(tokens[2].text(), ".card-body");
    }

    #[test]
    fn test_tag_followed_by_space_is_selector() {
        let tokens = tokenize(r#"view { h1 "Hello" }"#);
        assert_eq!(tokens[2].kind, TokenKind::Selector);
        assert_eq!(tokens[3].kind, TokenKind::String);
    }

    #[test]
    fn test_component_call_is_identifier() {
        let tokens = tokenize("view { Button(label=\"Go\") }");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::LParen);
    }

    #[test]
    fn test_numeric_separators() {
        let tokens = tokenize("1_000_000");
        assert_eq!(tokens[0].number(), Some(1_000_000.0));
        assert_eq!(tokens[0].raw, "1_000_000");
    }

    #[test]
    fn test_hex_number() {
        let tokens = tokenize("0xFF_FF 0b1010 0o17");
        assert_eq!(tokens[0].number(), Some(65535.0));
        assert_eq!(tokens[1].number(), Some(10.0));
        assert_eq!(tokens[2].number(), Some(15.0));
    }

    #[test]
    fn test_bigint() {
        let tokens = tokenize("123n");
        assert_eq!(tokens[0].kind, TokenKind::BigInt);
        assert_eq!(tokens[0].value, TokenValue::BigInt("123n".to_string()));
    }

    #[test]
    fn test_exponent() {
        let tokens = tokenize("1e3 2.5E-2");
        assert_eq!(tokens[0].number(), Some(1000.0));
        assert_eq!(tokens[1].number(), Some(0.025));
    }

    #[test]
    fn test_em_unit_is_not_exponent() {
        let tokens = tokenize("style { .a { font-size: 1.5em } }");
        let idx = tokens.iter().position(|t| t.kind == TokenKind::Number).unwrap();
        assert_eq!(tokens[idx].number(), Some(1.5));
        assert_eq!(tokens[idx + 1].kind, TokenKind::Ident);
        assert_eq!(tokens[idx + 1].raw, "em");
    }

    #[test]
    fn test_directive_with_modifiers() {
        let tokens = tokenize("view { button @click.prevent.stop(save()) }");
        let at = tokens.iter().position(|t| t.kind == TokenKind::At).unwrap();
        assert_eq!(tokens[at + 1].kind, TokenKind::Ident);
        assert_eq!(tokens[at + 1].text(), "click");
        assert_eq!(tokens[at + 2].kind, TokenKind::DirectiveMod);
        assert_eq!(tokens[at + 2].text(), "prevent");
        assert_eq!(tokens[at + 3].kind, TokenKind::DirectiveMod);
        assert_eq!(tokens[at + 3].text(), "stop");
        assert_eq!(tokens[at + 4].kind, TokenKind::LParen);
    }

    #[test]
    fn test_directive_keywords() {
        let tokens = tokenize("view { @if (a) { } @else-if (b) { } }");
        assert_eq!(tokens[3].kind, TokenKind::If);
        let else_if = tokens.iter().find(|t| t.raw == "else-if").unwrap();
        assert_eq!(else_if.kind, TokenKind::Ident);
    }

    #[test]
    fn test_hex_color_only_in_style() {
        let tokens = tokenize("style { .a { color: #ff0000 } }");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::HexColor && t.raw == "#ff0000"));

        let tokens = tokenize("#fff");
        assert_eq!(tokens[0].kind, TokenKind::Hash);
    }

    #[test]
    fn test_optional_chaining_before_digit() {
        assert_eq!(
            kinds("a?.5:b"),
            vec![
                TokenKind::Ident,
                TokenKind::Question,
                TokenKind::Number,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("a?.b"),
            vec![TokenKind::Ident, TokenKind::QuestionDot, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_ampersand_is_parent_selector() {
        assert_eq!(
            kinds("& && &&="),
            vec![TokenKind::Ampersand, TokenKind::And, TokenKind::AndEq, TokenKind::Eof]
        );
    }

    #[test]
    fn test_logical_assignment_operators() {
        assert_eq!(
            kinds("a ||= b ??= c ?? d"),
            vec![
                TokenKind::Ident,
                TokenKind::OrEq,
                TokenKind::Ident,
                TokenKind::NullishEq,
                TokenKind::Ident,
                TokenKind::Nullish,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\nb\"c" 'd\'e'"#);
        assert_eq!(tokens[0].text(), "a\nb\"c");
        assert_eq!(tokens[1].text(), "d'e");
        assert_eq!(tokens[0].raw, r#""a\nb\"c""#);
    }

    #[test]
    fn test_template_with_nested_braces() {
        let tokens = tokenize("`total: ${items.map(i => { return i }).length}` x");
        assert_eq!(tokens[0].kind, TokenKind::Template);
        assert_eq!(tokens[0].text(), "total: ${items.map(i => { return i }).length}");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn test_unknown_character_is_error_token() {
        let tokens = tokenize("a ^ b");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string_is_error_token() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("// line\nstate /* block */ { }"),
            vec![TokenKind::State, TokenKind::LBrace, TokenKind::RBrace, TokenKind::Eof]
        );
    }

    #[test]
    fn test_url_in_style() {
        let tokens = tokenize("style { .a { background: url(http://x.com/a.png) } }");
        let url = tokens.iter().position(|t| t.raw == "url").unwrap();
        assert_eq!(tokens[url + 1].kind, TokenKind::LParen);
        assert_eq!(tokens[url + 2].raw, "http://x.com/a.png");
        assert_eq!(tokens[url + 3].kind, TokenKind::RParen);
    }

    #[test]
    fn test_line_and_column() {
        let tokens = tokenize("state {\n  count: 0\n}");
        let count = tokens.iter().find(|t| t.raw == "count").unwrap();
        assert_eq!((count.line, count.column), (2, 3));
        assert_eq!(count.span, Span::new(10, 15));
    }

    #[test]
    fn test_store_state_keyword_does_not_leak_context() {
        // `style` nested inside a store is not a style block
        let tokens = tokenize("store { state { style: 1 } } view { div.a }");
        let div = tokens.iter().find(|t| t.raw == "div.a").unwrap();
        assert_eq!(div.kind, TokenKind::Selector);
    }
}
