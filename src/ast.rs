use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// Re-export Span from the token model so every node uses the same type
pub use crate::parser::token::{Span, Token};

/// Result of parsing one `.pulse` file.
///
/// The token list is kept alongside the tree: raw spans (function bodies,
/// guard hooks, getter bodies, arrow block bodies) index into it.
#[derive(Debug, Clone)]
pub struct Ast {
    pub program: Program,
    pub tokens: Vec<Token>,
    pub source: Arc<str>,
}

impl Ast {
    pub fn new(program: Program, tokens: Vec<Token>, source: Arc<str>) -> Self {
        Self {
            program,
            tokens,
            source,
        }
    }

    /// Exact source text covered by a raw span
    pub fn raw_text(&self, span: RawSpan) -> &str {
        if span.is_empty() || span.end > self.tokens.len() {
            return "";
        }
        let start = self.tokens[span.start].span.start;
        let end = self.tokens[span.end - 1].span.end;
        self.source.get(start..end).unwrap_or("")
    }

    /// Tokens covered by a raw span
    pub fn raw_tokens(&self, span: RawSpan) -> &[Token] {
        let end = span.end.min(self.tokens.len());
        let start = span.start.min(end);
        &self.tokens[start..end]
    }
}

/// Half-open range of token indices captured without parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RawSpan {
    pub start: usize,
    pub end: usize,
}

impl RawSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every node kind in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Top level
    Program,
    Import,
    ImportSpecifier,
    PageDecl,
    RouteDecl,
    PropsBlock,
    StateBlock,
    Property,
    ViewBlock,
    ActionsBlock,
    StyleBlock,
    RouterBlock,
    StoreBlock,

    // View
    Element,
    ElementProp,
    Text,
    IfDirective,
    ElseIfBranch,
    ForDirective,
    EventDirective,
    ModelDirective,
    A11yDirective,
    LiveDirective,
    FocusTrapDirective,
    SrOnlyDirective,
    BoundaryDirective,
    SlotNode,
    LinkDirective,
    OutletDirective,
    NavigateDirective,
    BackDirective,
    ForwardDirective,

    // Blocks
    FunctionDecl,
    Param,
    RouteEntry,
    GuardHook,
    Getter,

    // Style
    StyleRule,
    AtRule,
    StyleDeclaration,

    // Expressions
    Identifier,
    Literal,
    TemplateLiteral,
    ArrayExpression,
    ObjectExpression,
    ObjectProperty,
    SpreadElement,
    BinaryExpression,
    LogicalExpression,
    UnaryExpression,
    UpdateExpression,
    AssignmentExpression,
    ConditionalExpression,
    ArrowFunction,
    MemberExpression,
    CallExpression,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Import => "Import",
            NodeKind::ImportSpecifier => "ImportSpecifier",
            NodeKind::PageDecl => "PageDecl",
            NodeKind::RouteDecl => "RouteDecl",
            NodeKind::PropsBlock => "PropsBlock",
            NodeKind::StateBlock => "StateBlock",
            NodeKind::Property => "Property",
            NodeKind::ViewBlock => "ViewBlock",
            NodeKind::ActionsBlock => "ActionsBlock",
            NodeKind::StyleBlock => "StyleBlock",
            NodeKind::RouterBlock => "RouterBlock",
            NodeKind::StoreBlock => "StoreBlock",
            NodeKind::Element => "Element",
            NodeKind::ElementProp => "ElementProp",
            NodeKind::Text => "Text",
            NodeKind::IfDirective => "IfDirective",
            NodeKind::ElseIfBranch => "ElseIfBranch",
            NodeKind::ForDirective => "ForDirective",
            NodeKind::EventDirective => "EventDirective",
            NodeKind::ModelDirective => "ModelDirective",
            NodeKind::A11yDirective => "A11yDirective",
            NodeKind::LiveDirective => "LiveDirective",
            NodeKind::FocusTrapDirective => "FocusTrapDirective",
            NodeKind::SrOnlyDirective => "SrOnlyDirective",
            NodeKind::BoundaryDirective => "BoundaryDirective",
            NodeKind::SlotNode => "SlotNode",
            NodeKind::LinkDirective => "LinkDirective",
            NodeKind::OutletDirective => "OutletDirective",
            NodeKind::NavigateDirective => "NavigateDirective",
            NodeKind::BackDirective => "BackDirective",
            NodeKind::ForwardDirective => "ForwardDirective",
            NodeKind::FunctionDecl => "FunctionDecl",
            NodeKind::Param => "Param",
            NodeKind::RouteEntry => "RouteEntry",
            NodeKind::GuardHook => "GuardHook",
            NodeKind::Getter => "Getter",
            NodeKind::StyleRule => "StyleRule",
            NodeKind::AtRule => "AtRule",
            NodeKind::StyleDeclaration => "StyleDeclaration",
            NodeKind::Identifier => "Identifier",
            NodeKind::Literal => "Literal",
            NodeKind::TemplateLiteral => "TemplateLiteral",
            NodeKind::ArrayExpression => "ArrayExpression",
            NodeKind::ObjectExpression => "ObjectExpression",
            NodeKind::ObjectProperty => "ObjectProperty",
            NodeKind::SpreadElement => "SpreadElement",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::LogicalExpression => "LogicalExpression",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::UpdateExpression => "UpdateExpression",
            NodeKind::AssignmentExpression => "AssignmentExpression",
            NodeKind::ConditionalExpression => "ConditionalExpression",
            NodeKind::ArrowFunction => "ArrowFunction",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::CallExpression => "CallExpression",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common accessors shared by every node
pub trait Node {
    fn kind(&self) -> NodeKind;
    fn span(&self) -> Span;
}

macro_rules! impl_node {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Node for $ty {
                fn kind(&self) -> NodeKind {
                    NodeKind::$kind
                }

                fn span(&self) -> Span {
                    self.span
                }
            }
        )*
    };
}

// ============================================================================
// Top level
// ============================================================================

/// Root node. Each block slot is filled at most once.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub imports: Vec<Import>,
    pub page: Option<PageDecl>,
    pub route: Option<RouteDecl>,
    pub props: Option<PropsBlock>,
    pub state: Option<StateBlock>,
    pub view: Option<ViewBlock>,
    pub actions: Option<ActionsBlock>,
    pub style: Option<StyleBlock>,
    pub router: Option<RouterBlock>,
    pub store: Option<StoreBlock>,
    pub span: Span,
}

/// `import Default, { a as b } from "./x.pulse"`
#[derive(Debug, Clone, Serialize)]
pub struct Import {
    /// Empty for side-effect imports (`import "./reset.css"`)
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSpecifier {
    pub kind: ImportKind,
    /// Exported name (`default` or `*` for the default/namespace forms)
    pub imported: String,
    pub local: String,
    pub span: Span,
}

/// `@page Dashboard`
#[derive(Debug, Clone, Serialize)]
pub struct PageDecl {
    pub name: String,
    pub span: Span,
}

/// `@route "/users/:id"`
#[derive(Debug, Clone, Serialize)]
pub struct RouteDecl {
    pub path: String,
    pub span: Span,
}

/// `name: expr` inside props/state blocks
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropsBlock {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateBlock {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewBlock {
    pub children: Vec<ViewNode>,
    pub span: Span,
}

// ============================================================================
// View
// ============================================================================

/// Child of a view block or of an element
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ViewNode {
    Element(Element),
    Text(Text),
    If(IfDirective),
    For(ForDirective),
    Event(EventDirective),
    Boundary(BoundaryDirective),
    Slot(SlotNode),
    Link(LinkDirective),
    Outlet(OutletDirective),
    Navigate(NavigateDirective),
    Back(BackDirective),
    Forward(ForwardDirective),
}

impl ViewNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ViewNode::Element(n) => n.kind(),
            ViewNode::Text(n) => n.kind(),
            ViewNode::If(n) => n.kind(),
            ViewNode::For(n) => n.kind(),
            ViewNode::Event(n) => n.kind(),
            ViewNode::Boundary(n) => n.kind(),
            ViewNode::Slot(n) => n.kind(),
            ViewNode::Link(n) => n.kind(),
            ViewNode::Outlet(n) => n.kind(),
            ViewNode::Navigate(n) => n.kind(),
            ViewNode::Back(n) => n.kind(),
            ViewNode::Forward(n) => n.kind(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ViewNode::Element(n) => n.span,
            ViewNode::Text(n) => n.span,
            ViewNode::If(n) => n.span,
            ViewNode::For(n) => n.span,
            ViewNode::Event(n) => n.span,
            ViewNode::Boundary(n) => n.span,
            ViewNode::Slot(n) => n.span,
            ViewNode::Link(n) => n.span,
            ViewNode::Outlet(n) => n.span,
            ViewNode::Navigate(n) => n.span,
            ViewNode::Back(n) => n.span,
            ViewNode::Forward(n) => n.span,
        }
    }
}

/// `div.card#main(prop=value) @click(handler) "text" { children }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Tag/class/id chain or component name
    pub selector: String,
    pub props: Vec<ElementProp>,
    pub directives: Vec<Directive>,
    pub text_content: Vec<Text>,
    pub children: Vec<ViewNode>,
    pub span: Span,
}

/// Component-call argument: `name=expr`, `name={expr}`, `name`, `...expr`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ElementProp {
    Named {
        name: String,
        value: Expr,
        /// `Modal(open)` without a value
        shorthand: bool,
        span: Span,
    },
    Spread {
        argument: Expr,
        span: Span,
    },
}

impl Node for ElementProp {
    fn kind(&self) -> NodeKind {
        NodeKind::ElementProp
    }

    fn span(&self) -> Span {
        match self {
            ElementProp::Named { span, .. } | ElementProp::Spread { span, .. } => *span,
        }
    }
}

/// String literal re-scanned for `{expr}` interpolation
#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub parts: Vec<TextPart>,
    /// The string value before interpolation scanning
    pub raw: String,
    pub span: Span,
}

impl Text {
    pub fn has_interpolation(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, TextPart::Interpolation { .. }))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TextPart {
    Literal { value: String },
    Interpolation { source: String, expression: Expr },
}

/// `@if (cond) { } @else-if (cond) { } @else { }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfDirective {
    pub condition: Expr,
    pub consequent: Vec<ViewNode>,
    pub else_if_branches: Vec<ElseIfBranch>,
    pub alternate: Option<Vec<ViewNode>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElseIfBranch {
    pub condition: Expr,
    pub consequent: Vec<ViewNode>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopKeyword {
    For,
    Each,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationKind {
    In,
    Of,
}

/// `@for (item, index of items) key(item.id) { }`
#[derive(Debug, Clone, Serialize)]
pub struct ForDirective {
    pub keyword: LoopKeyword,
    pub item: String,
    pub index: Option<String>,
    pub iteration: IterationKind,
    pub iterable: Expr,
    /// Identity function for keyed list diffing
    pub key: Option<Expr>,
    pub body: Vec<ViewNode>,
    pub span: Span,
}

/// Inline directive attached to an element
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Directive {
    Event(EventDirective),
    Model(ModelDirective),
    A11y(A11yDirective),
    Live(LiveDirective),
    FocusTrap(FocusTrapDirective),
    SrOnly(SrOnlyDirective),
    Boundary(BoundaryDirective),
}

impl Directive {
    pub fn kind(&self) -> NodeKind {
        match self {
            Directive::Event(d) => d.kind(),
            Directive::Model(d) => d.kind(),
            Directive::A11y(d) => d.kind(),
            Directive::Live(d) => d.kind(),
            Directive::FocusTrap(d) => d.kind(),
            Directive::SrOnly(d) => d.kind(),
            Directive::Boundary(d) => d.kind(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Directive::Event(d) => d.span,
            Directive::Model(d) => d.span,
            Directive::A11y(d) => d.span,
            Directive::Live(d) => d.span,
            Directive::FocusTrap(d) => d.span,
            Directive::SrOnly(d) => d.span,
            Directive::Boundary(d) => d.span,
        }
    }
}

/// `@click.prevent(handler)`
#[derive(Debug, Clone, Serialize)]
pub struct EventDirective {
    pub event: String,
    pub modifiers: Vec<String>,
    pub handler: Option<Expr>,
    /// Only filled when the directive stands alone as a view child
    pub children: Vec<ViewNode>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelModifier {
    Lazy,
    Trim,
    Number,
}

impl ModelModifier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lazy" => Some(ModelModifier::Lazy),
            "trim" => Some(ModelModifier::Trim),
            "number" => Some(ModelModifier::Number),
            _ => None,
        }
    }
}

/// `@model.trim(name)`
#[derive(Debug, Clone, Serialize)]
pub struct ModelDirective {
    pub modifiers: Vec<ModelModifier>,
    pub binding: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct A11yAttribute {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `@a11y(role=dialog, label="Close")`
#[derive(Debug, Clone, Serialize)]
pub struct A11yDirective {
    pub attributes: Vec<A11yAttribute>,
    pub span: Span,
}

/// `@live(assertive)`
#[derive(Debug, Clone, Serialize)]
pub struct LiveDirective {
    pub priority: String,
    pub span: Span,
}

/// `@focusTrap` / `@focusTrap({ initialFocus: "#ok" })`
#[derive(Debug, Clone, Serialize)]
pub struct FocusTrapDirective {
    pub options: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct SrOnlyDirective {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryTarget {
    Client,
    Server,
}

/// `@client` / `@server` rendering boundary
#[derive(Debug, Clone, Serialize)]
pub struct BoundaryDirective {
    pub target: BoundaryTarget,
    pub children: Vec<ViewNode>,
    pub span: Span,
}

/// `slot`, `slot "name"`, `slot "name" { fallback }`
#[derive(Debug, Clone, Serialize)]
pub struct SlotNode {
    pub name: Option<String>,
    pub fallback: Vec<ViewNode>,
    pub span: Span,
}

/// `@link("/about") "About"`
#[derive(Debug, Clone, Serialize)]
pub struct LinkDirective {
    pub path: Expr,
    pub options: Option<Expr>,
    pub text: Option<Text>,
    pub children: Vec<ViewNode>,
    pub span: Span,
}

/// `@outlet` / `@outlet(sidebar)`
#[derive(Debug, Clone, Serialize)]
pub struct OutletDirective {
    pub container: Option<Expr>,
    pub span: Span,
}

/// `@navigate("/home", { replace: true })`
#[derive(Debug, Clone, Serialize)]
pub struct NavigateDirective {
    pub path: Expr,
    pub options: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackDirective {
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForwardDirective {
    pub span: Span,
}

// ============================================================================
// Actions, router, store
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ActionsBlock {
    pub functions: Vec<FunctionDecl>,
    pub span: Span,
}

/// `[async] name(params) { body }`; the body is kept as raw tokens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: RawSpan,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    /// `...rest`
    pub rest: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterBlock {
    pub mode: Option<String>,
    pub base: Option<String>,
    pub routes: Vec<RouteEntry>,
    pub before_each: Option<GuardHook>,
    pub after_each: Option<GuardHook>,
    pub span: Span,
}

/// `"/users/:id": UserPage`
#[derive(Debug, Clone, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub handler: Expr,
    pub span: Span,
}

/// `beforeEach(to, from) { body }`
#[derive(Debug, Clone, Serialize)]
pub struct GuardHook {
    pub name: String,
    pub params: Vec<Param>,
    pub body: RawSpan,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreBlock {
    pub state: Option<StateBlock>,
    pub getters: Vec<Getter>,
    pub actions: Option<ActionsBlock>,
    pub persist: Option<bool>,
    pub storage_key: Option<String>,
    pub plugins: Option<Expr>,
    pub span: Span,
}

/// Zero-argument computed accessor with a raw body
#[derive(Debug, Clone, Serialize)]
pub struct Getter {
    pub name: String,
    pub body: RawSpan,
    pub span: Span,
}

// ============================================================================
// Style
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleBlock {
    /// Reconstructed CSS text, always available
    pub raw: String,
    /// Empty when the structured parse failed
    pub rules: Vec<StyleNode>,
    /// Message from the failed structured parse, if any
    pub parse_error: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StyleNode {
    Rule(StyleRule),
    AtRule(AtRule),
}

impl StyleNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            StyleNode::Rule(r) => r.kind(),
            StyleNode::AtRule(r) => r.kind(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<StyleDeclaration>,
    /// Nested rules (`&:hover { }`, `.child { }`, nested `@media`)
    pub rules: Vec<StyleNode>,
    pub span: Span,
}

/// `@media (max-width: 600px) { ... }`, `@import "x.css";`
#[derive(Debug, Clone, Serialize)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    /// False for statement at-rules ending in `;`
    pub has_block: bool,
    pub declarations: Vec<StyleDeclaration>,
    pub rules: Vec<StyleNode>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    Nullish,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::StrictEq => "===",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOp {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "&&=")]
    AndAssign,
    #[serde(rename = "||=")]
    OrAssign,
    #[serde(rename = "??=")]
    NullishAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    BigInt(String),
    Bool(bool),
    Null,
}

/// Object literal key
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Number(f64),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property {
        key: PropertyKey,
        value: Expr,
        /// `{ x }` standing for `{ x: x }`
        shorthand: bool,
        span: Span,
    },
    Spread {
        argument: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ArrowBody {
    Expression(Box<Expr>),
    /// Block body kept as raw tokens between the braces
    Block(RawSpan),
    /// Block body of an arrow inside text interpolation, whose tokens are
    /// not part of the file's token list
    Inline(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Identifier {
        name: String,
        span: Span,
    },
    Literal {
        value: LiteralValue,
        raw: String,
        span: Span,
    },
    /// Back-tick template kept as opaque text
    TemplateLiteral {
        text: String,
        raw: String,
        span: Span,
    },
    Array {
        elements: Vec<Expr>,
        span: Span,
    },
    Object {
        properties: Vec<ObjectMember>,
        span: Span,
    },
    Spread {
        argument: Box<Expr>,
        span: Span,
    },
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        argument: Box<Expr>,
        span: Span,
    },
    Update {
        operator: UpdateOp,
        prefix: bool,
        argument: Box<Expr>,
        span: Span,
    },
    Assignment {
        operator: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
        span: Span,
    },
    Arrow {
        params: Vec<Expr>,
        body: ArrowBody,
        #[serde(rename = "async")]
        is_async: bool,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        optional: bool,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier { span, .. }
            | Expr::Literal { span, .. }
            | Expr::TemplateLiteral { span, .. }
            | Expr::Array { span, .. }
            | Expr::Object { span, .. }
            | Expr::Spread { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Update { span, .. }
            | Expr::Assignment { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Arrow { span, .. }
            | Expr::Member { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Identifier { .. } => NodeKind::Identifier,
            Expr::Literal { .. } => NodeKind::Literal,
            Expr::TemplateLiteral { .. } => NodeKind::TemplateLiteral,
            Expr::Array { .. } => NodeKind::ArrayExpression,
            Expr::Object { .. } => NodeKind::ObjectExpression,
            Expr::Spread { .. } => NodeKind::SpreadElement,
            Expr::Binary { operator, .. } if operator.is_logical() => NodeKind::LogicalExpression,
            Expr::Binary { .. } => NodeKind::BinaryExpression,
            Expr::Unary { .. } => NodeKind::UnaryExpression,
            Expr::Update { .. } => NodeKind::UpdateExpression,
            Expr::Assignment { .. } => NodeKind::AssignmentExpression,
            Expr::Conditional { .. } => NodeKind::ConditionalExpression,
            Expr::Arrow { .. } => NodeKind::ArrowFunction,
            Expr::Member { .. } => NodeKind::MemberExpression,
            Expr::Call { .. } => NodeKind::CallExpression,
        }
    }

    /// Name of a plain identifier expression
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the expression can appear on the left of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expr::Identifier { .. } | Expr::Member { optional: false, .. }
        )
    }
}

impl Node for Expr {
    fn kind(&self) -> NodeKind {
        Expr::kind(self)
    }

    fn span(&self) -> Span {
        Expr::span(self)
    }
}

impl_node! {
    Program => Program,
    Import => Import,
    ImportSpecifier => ImportSpecifier,
    PageDecl => PageDecl,
    RouteDecl => RouteDecl,
    Property => Property,
    PropsBlock => PropsBlock,
    StateBlock => StateBlock,
    ViewBlock => ViewBlock,
    Element => Element,
    Text => Text,
    IfDirective => IfDirective,
    ElseIfBranch => ElseIfBranch,
    ForDirective => ForDirective,
    EventDirective => EventDirective,
    ModelDirective => ModelDirective,
    A11yDirective => A11yDirective,
    LiveDirective => LiveDirective,
    FocusTrapDirective => FocusTrapDirective,
    SrOnlyDirective => SrOnlyDirective,
    BoundaryDirective => BoundaryDirective,
    SlotNode => SlotNode,
    LinkDirective => LinkDirective,
    OutletDirective => OutletDirective,
    NavigateDirective => NavigateDirective,
    BackDirective => BackDirective,
    ForwardDirective => ForwardDirective,
    ActionsBlock => ActionsBlock,
    FunctionDecl => FunctionDecl,
    Param => Param,
    RouterBlock => RouterBlock,
    RouteEntry => RouteEntry,
    GuardHook => GuardHook,
    StoreBlock => StoreBlock,
    Getter => Getter,
    StyleBlock => StyleBlock,
    StyleRule => StyleRule,
    AtRule => AtRule,
    StyleDeclaration => StyleDeclaration,
}
