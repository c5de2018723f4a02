use serde::Serialize;
use std::fmt;

/// Byte range in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Every kind of token the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // === Block keywords ===
    State,
    Props,
    View,
    Actions,
    Style,
    Router,
    Store,

    // === Router / store keywords ===
    Routes,
    Getters,
    BeforeEach,
    AfterEach,
    Persist,
    StorageKey,
    Plugins,
    Mode,
    Base,

    // === View keywords ===
    Slot,
    Page,
    Route,
    If,
    Else,
    Each,
    For,
    In,
    Of,
    Link,
    Outlet,
    Navigate,
    Back,
    Forward,

    // === Module keywords ===
    Import,
    From,
    As,
    Export,

    // === Literals ===
    String,
    Template,
    Number,
    BigInt,
    True,
    False,
    Null,
    Ident,

    // === Context-specific ===
    /// CSS-like tag/class/id chain inside a view block: `div.card#main`
    Selector,
    /// `#fff` inside a style block
    HexColor,
    /// `.prevent` after a directive name
    DirectiveMod,

    // === Punctuation ===
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Hash,
    At,
    /// `&` on its own: CSS parent selector
    Ampersand,
    Tilde,
    Spread,
    Arrow,
    Question,
    QuestionDot,

    // === Operators ===
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    Not,
    Nullish,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    AndEq,
    OrEq,
    NullishEq,

    // === Structural ===
    Eof,
    Error,
}

impl TokenKind {
    /// Look up a reserved word
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "state" => TokenKind::State,
            "props" => TokenKind::Props,
            "view" => TokenKind::View,
            "actions" => TokenKind::Actions,
            "style" => TokenKind::Style,
            "router" => TokenKind::Router,
            "store" => TokenKind::Store,
            "routes" => TokenKind::Routes,
            "getters" => TokenKind::Getters,
            "beforeEach" => TokenKind::BeforeEach,
            "afterEach" => TokenKind::AfterEach,
            "persist" => TokenKind::Persist,
            "storageKey" => TokenKind::StorageKey,
            "plugins" => TokenKind::Plugins,
            "mode" => TokenKind::Mode,
            "base" => TokenKind::Base,
            "slot" => TokenKind::Slot,
            "page" => TokenKind::Page,
            "route" => TokenKind::Route,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "each" => TokenKind::Each,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "of" => TokenKind::Of,
            "link" => TokenKind::Link,
            "outlet" => TokenKind::Outlet,
            "navigate" => TokenKind::Navigate,
            "back" => TokenKind::Back,
            "forward" => TokenKind::Forward,
            "import" => TokenKind::Import,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "export" => TokenKind::Export,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// Keywords that open a top-level block
    pub fn is_block_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::State
                | TokenKind::Props
                | TokenKind::View
                | TokenKind::Actions
                | TokenKind::Style
                | TokenKind::Router
                | TokenKind::Store
        )
    }

    /// Any reserved word, including the literal keywords
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::State
                | TokenKind::Props
                | TokenKind::View
                | TokenKind::Actions
                | TokenKind::Style
                | TokenKind::Router
                | TokenKind::Store
                | TokenKind::Routes
                | TokenKind::Getters
                | TokenKind::BeforeEach
                | TokenKind::AfterEach
                | TokenKind::Persist
                | TokenKind::StorageKey
                | TokenKind::Plugins
                | TokenKind::Mode
                | TokenKind::Base
                | TokenKind::Slot
                | TokenKind::Page
                | TokenKind::Route
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Each
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Of
                | TokenKind::Link
                | TokenKind::Outlet
                | TokenKind::Navigate
                | TokenKind::Back
                | TokenKind::Forward
                | TokenKind::Import
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Export
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Reserved words that still read as plain names inside expressions
    /// (`route.params`, `store.state`, `item.from`)
    pub fn is_contextual_keyword(self) -> bool {
        self.is_keyword()
            && !matches!(
                self,
                TokenKind::If
                    | TokenKind::Else
                    | TokenKind::For
                    | TokenKind::Each
                    | TokenKind::In
                    | TokenKind::Of
                    | TokenKind::Import
                    | TokenKind::Export
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Null
            )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::AndEq
                | TokenKind::OrEq
                | TokenKind::NullishEq
        )
    }

    /// Human-readable description used in error messages
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::State => "'state'",
            TokenKind::Props => "'props'",
            TokenKind::View => "'view'",
            TokenKind::Actions => "'actions'",
            TokenKind::Style => "'style'",
            TokenKind::Router => "'router'",
            TokenKind::Store => "'store'",
            TokenKind::Routes => "'routes'",
            TokenKind::Getters => "'getters'",
            TokenKind::BeforeEach => "'beforeEach'",
            TokenKind::AfterEach => "'afterEach'",
            TokenKind::Persist => "'persist'",
            TokenKind::StorageKey => "'storageKey'",
            TokenKind::Plugins => "'plugins'",
            TokenKind::Mode => "'mode'",
            TokenKind::Base => "'base'",
            TokenKind::Slot => "'slot'",
            TokenKind::Page => "'page'",
            TokenKind::Route => "'route'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Each => "'each'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Of => "'of'",
            TokenKind::Link => "'link'",
            TokenKind::Outlet => "'outlet'",
            TokenKind::Navigate => "'navigate'",
            TokenKind::Back => "'back'",
            TokenKind::Forward => "'forward'",
            TokenKind::Import => "'import'",
            TokenKind::From => "'from'",
            TokenKind::As => "'as'",
            TokenKind::Export => "'export'",
            TokenKind::String => "string",
            TokenKind::Template => "template literal",
            TokenKind::Number => "number",
            TokenKind::BigInt => "bigint",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Ident => "identifier",
            TokenKind::Selector => "selector",
            TokenKind::HexColor => "hex color",
            TokenKind::DirectiveMod => "directive modifier",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Hash => "'#'",
            TokenKind::At => "'@'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Tilde => "'~'",
            TokenKind::Spread => "'...'",
            TokenKind::Arrow => "'=>'",
            TokenKind::Question => "'?'",
            TokenKind::QuestionDot => "'?.'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::StarStar => "'**'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::EqEqEq => "'==='",
            TokenKind::NotEq => "'!='",
            TokenKind::NotEqEq => "'!=='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::Nullish => "'??'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::AndEq => "'&&='",
            TokenKind::OrEq => "'||='",
            TokenKind::NullishEq => "'??='",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Semantic value carried by a token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    None,
    Str(String),
    Number(f64),
    /// Digits plus the trailing `n`, e.g. `"123n"`
    BigInt(String),
    Bool(bool),
    Null,
}

/// A lexical unit. Immutable once produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// Exact source text of the token
    pub raw: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column (in characters)
    pub column: u32,
    pub span: Span,
}

impl Token {
    /// Text used when the token stands for a name or a string:
    /// the unescaped string value, or the raw text otherwise.
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Str(s) => s,
            TokenValue::BigInt(s) => s,
            _ => &self.raw,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
