//! Actions, router and store blocks.
//!
//! Function, guard-hook and getter bodies are captured as raw token spans;
//! only their signatures are parsed.

use super::core::{ParseResult, Parser, describe_token};
use super::token::TokenKind;
use crate::ast::{
    ActionsBlock, Expr, FunctionDecl, Getter, GuardHook, Param, RouteEntry, RouterBlock, StoreBlock,
};
use crate::error::{ErrorKind, ParseError};

impl Parser {
    // ========================================================================
    // Actions
    // ========================================================================

    pub(super) fn parse_actions_block(&mut self) -> ParseResult<ActionsBlock> {
        let start = self.expect(TokenKind::Actions)?.span;
        self.expect(TokenKind::LBrace)?;

        let mut functions = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            functions.push(self.parse_function_decl()?);
            self.skip_separators();
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok(ActionsBlock {
            functions,
            span: start.to(close.span),
        })
    }

    /// `[async] name(params) { body }`
    fn parse_function_decl(&mut self) -> ParseResult<FunctionDecl> {
        let start = self.current().span;
        let is_async = self.current().kind == TokenKind::Ident
            && self.current().raw == "async"
            && self.peek().kind != TokenKind::LParen;
        if is_async {
            self.advance();
        }

        if !self.is_name() {
            return Err(self.unexpected("action name"));
        }
        let name = self.advance();
        let params = self.parse_params()?;
        let body = self.parse_raw_block()?;

        Ok(FunctionDecl {
            name: name.raw,
            params,
            body,
            is_async,
            span: start.to(self.previous().span),
        })
    }

    /// `(a, b = 1, ...rest)`
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params: Vec<Param> = Vec::new();

        while !self.is(TokenKind::RParen) {
            if params.last().is_some_and(|p| p.rest) {
                return Err(self.error(ErrorKind::UnexpectedToken, "A rest parameter must be the last parameter"));
            }

            let start = self.current().span;
            let rest = self.eat(TokenKind::Spread);
            let name = self.expect_name()?;

            let default = if self.eat(TokenKind::Eq) {
                if rest {
                    return Err(self.error(ErrorKind::UnexpectedToken, "A rest parameter cannot have a default value"));
                }
                Some(self.parse_expression()?)
            } else {
                None
            };

            let end = default.as_ref().map(Expr::span).unwrap_or(name.span);
            params.push(Param {
                name: name.raw,
                default,
                rest,
                span: start.to(end),
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    // ========================================================================
    // Router
    // ========================================================================

    pub(super) fn parse_router_block(&mut self) -> ParseResult<RouterBlock> {
        let start = self.expect(TokenKind::Router)?.span;
        self.expect(TokenKind::LBrace)?;

        let mut router = RouterBlock {
            mode: None,
            base: None,
            routes: Vec::new(),
            before_each: None,
            after_each: None,
            span: start,
        };
        let mut seen_routes = false;

        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            match self.current().kind {
                TokenKind::Mode => {
                    self.ensure_field_unique(router.mode.is_some(), "mode", "router")?;
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    let value = if self.is(TokenKind::String) {
                        self.advance()
                    } else {
                        self.expect(TokenKind::Ident)?
                    };
                    router.mode = Some(value.text().to_string());
                }
                TokenKind::Base => {
                    self.ensure_field_unique(router.base.is_some(), "base", "router")?;
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    router.base = Some(self.expect(TokenKind::String)?.text().to_string());
                }
                TokenKind::Routes => {
                    self.ensure_field_unique(seen_routes, "routes", "router")?;
                    seen_routes = true;
                    router.routes = self.parse_routes()?;
                }
                TokenKind::BeforeEach => {
                    self.ensure_field_unique(router.before_each.is_some(), "beforeEach", "router")?;
                    router.before_each = Some(self.parse_guard_hook()?);
                }
                TokenKind::AfterEach => {
                    self.ensure_field_unique(router.after_each.is_some(), "afterEach", "router")?;
                    router.after_each = Some(self.parse_guard_hook()?);
                }
                _ => return Err(self.unexpected("router option (mode, base, routes, beforeEach, afterEach)")),
            }
            self.skip_separators();
        }

        let close = self.expect(TokenKind::RBrace)?;
        router.span = start.to(close.span);
        Ok(router)
    }

    /// `routes { "/path": handler, ... }`
    fn parse_routes(&mut self) -> ParseResult<Vec<RouteEntry>> {
        self.expect(TokenKind::Routes)?;
        self.eat(TokenKind::Colon);
        self.expect(TokenKind::LBrace)?;

        let mut routes: Vec<RouteEntry> = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            let path = self.expect(TokenKind::String)?;
            if routes.iter().any(|r| r.path == path.text()) {
                return Err(ParseError::at(
                    ErrorKind::DuplicateBlock,
                    format!("Duplicate route '{}'", path.text()),
                    &path,
                ));
            }
            self.expect(TokenKind::Colon)?;
            let handler = self.parse_expression()?;
            routes.push(RouteEntry {
                path: path.text().to_string(),
                span: path.span.to(handler.span()),
                handler,
            });
            self.skip_separators();
        }

        self.expect(TokenKind::RBrace)?;
        Ok(routes)
    }

    /// `beforeEach(to, from) { body }`
    fn parse_guard_hook(&mut self) -> ParseResult<GuardHook> {
        let name = self.advance();
        let params = self.parse_params()?;
        let body = self.parse_raw_block()?;
        Ok(GuardHook {
            name: name.raw,
            params,
            body,
            span: name.span.to(self.previous().span),
        })
    }

    // ========================================================================
    // Store
    // ========================================================================

    pub(super) fn parse_store_block(&mut self) -> ParseResult<StoreBlock> {
        let start = self.expect(TokenKind::Store)?.span;
        self.expect(TokenKind::LBrace)?;

        let mut store = StoreBlock {
            state: None,
            getters: Vec::new(),
            actions: None,
            persist: None,
            storage_key: None,
            plugins: None,
            span: start,
        };
        let mut seen_getters = false;

        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            match self.current().kind {
                TokenKind::State => {
                    self.ensure_field_unique(store.state.is_some(), "state", "store")?;
                    store.state = Some(self.parse_state_block()?);
                }
                TokenKind::Getters => {
                    self.ensure_field_unique(seen_getters, "getters", "store")?;
                    seen_getters = true;
                    store.getters = self.parse_getters()?;
                }
                TokenKind::Actions => {
                    self.ensure_field_unique(store.actions.is_some(), "actions", "store")?;
                    store.actions = Some(self.parse_actions_block()?);
                }
                TokenKind::Persist => {
                    self.ensure_field_unique(store.persist.is_some(), "persist", "store")?;
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    store.persist = Some(match self.current().kind {
                        TokenKind::True => true,
                        TokenKind::False => false,
                        _ => return Err(self.unexpected("'true' or 'false'")),
                    });
                    self.advance();
                }
                TokenKind::StorageKey => {
                    self.ensure_field_unique(store.storage_key.is_some(), "storageKey", "store")?;
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    store.storage_key = Some(self.expect(TokenKind::String)?.text().to_string());
                }
                TokenKind::Plugins => {
                    self.ensure_field_unique(store.plugins.is_some(), "plugins", "store")?;
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    if !self.is(TokenKind::LBracket) {
                        return Err(self.unexpected("plugin array '[...]'"));
                    }
                    store.plugins = Some(self.parse_expression()?);
                }
                _ => {
                    return Err(self.unexpected(
                        "store option (state, getters, actions, persist, storageKey, plugins)",
                    ));
                }
            }
            self.skip_separators();
        }

        let close = self.expect(TokenKind::RBrace)?;
        store.span = start.to(close.span);
        Ok(store)
    }

    /// `getters { name() { body } }`
    fn parse_getters(&mut self) -> ParseResult<Vec<Getter>> {
        self.expect(TokenKind::Getters)?;
        self.expect(TokenKind::LBrace)?;

        let mut getters = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            if !self.is_name() {
                return Err(self.unexpected("getter name"));
            }
            let name = self.advance();

            if self.eat(TokenKind::LParen) {
                if !self.is(TokenKind::RParen) {
                    return Err(self.error(
                        ErrorKind::UnexpectedToken,
                        format!("Getter '{}' takes no parameters, found {}", name.raw, describe_token(self.current())),
                    ));
                }
                self.advance();
            }

            let body = self.parse_raw_block()?;
            getters.push(Getter {
                name: name.raw,
                body,
                span: name.span.to(self.previous().span),
            });
            self.skip_separators();
        }

        self.expect(TokenKind::RBrace)?;
        Ok(getters)
    }

    fn ensure_field_unique(&self, present: bool, field: &str, block: &str) -> ParseResult<()> {
        if !present {
            return Ok(());
        }
        Err(self.error(
            ErrorKind::DuplicateBlock,
            format!("Duplicate '{}' in {} block", field, block),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ast, Program};
    use crate::parser::lexer::tokenize;
    use std::sync::Arc;

    fn parse_ast(source: &str) -> ParseResult<Ast> {
        let mut parser = Parser::new(tokenize(source));
        let program = parser.parse()?;
        Ok(Ast::new(program, parser.into_tokens(), Arc::from(source)))
    }

    fn parse(source: &str) -> ParseResult<Program> {
        parse_ast(source).map(|ast| ast.program)
    }

    #[test]
    fn test_actions_with_raw_bodies() {
        let source = r#"
actions {
  increment() { count++ }
  async load(id, force = false, ...rest) {
    const res = await fetch(`/api/${id}`)
    items = await res.json()
  }
}
"#;
        let ast = parse_ast(source).unwrap();
        let actions = ast.program.actions.as_ref().unwrap();
        assert_eq!(actions.functions.len(), 2);

        let increment = &actions.functions[0];
        assert_eq!(increment.name, "increment");
        assert!(!increment.is_async);
        assert_eq!(ast.raw_text(increment.body), "count++");

        let load = &actions.functions[1];
        assert!(load.is_async);
        assert_eq!(load.params.len(), 3);
        assert!(load.params[1].default.is_some());
        assert!(load.params[2].rest);
        assert!(ast.raw_text(load.body).starts_with("const res = await fetch"));
        assert!(ast.raw_text(load.body).ends_with("res.json()"));
    }

    #[test]
    fn test_nested_braces_in_body() {
        let ast = parse_ast("actions { run() { if (a) { b() } else { c() } } }").unwrap();
        let run = &ast.program.actions.as_ref().unwrap().functions[0];
        assert_eq!(ast.raw_text(run.body), "if (a) { b() } else { c() }");
    }

    #[test]
    fn test_async_named_action() {
        let program = parse("actions { async() { } }").unwrap();
        let f = &program.actions.unwrap().functions[0];
        assert_eq!(f.name, "async");
        assert!(!f.is_async);
    }

    #[test]
    fn test_rest_param_must_be_last() {
        let err = parse("actions { f(...a, b) { } }").unwrap_err();
        assert!(err.message.contains("rest parameter must be the last"));
    }

    #[test]
    fn test_unclosed_action_body() {
        let err = parse("actions { f() { if (x) { y() }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_router_block() {
        let source = r#"
router {
  mode: "history"
  base: "/app"
  routes {
    "/": Home,
    "/users/:id": () => import("./User.pulse"),
    "*": NotFound
  }
  beforeEach(to, from) { if (!auth) return "/login" }
  afterEach(to) { track(to.path) }
}
"#;
        let ast = parse_ast(source).unwrap();
        let router = ast.program.router.as_ref().unwrap();
        assert_eq!(router.mode.as_deref(), Some("history"));
        assert_eq!(router.base.as_deref(), Some("/app"));
        assert_eq!(router.routes.len(), 3);
        assert_eq!(router.routes[1].path, "/users/:id");
        assert!(matches!(router.routes[1].handler, Expr::Arrow { .. }));

        let guard = router.before_each.as_ref().unwrap();
        assert_eq!(guard.params.len(), 2);
        assert_eq!(guard.params[1].name, "from");
        assert_eq!(ast.raw_text(guard.body), "if (!auth) return \"/login\"");
        assert!(router.after_each.is_some());
    }

    #[test]
    fn test_duplicate_route() {
        let err = parse(r#"router { routes { "/": A, "/": B } }"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBlock);
    }

    #[test]
    fn test_unknown_router_option() {
        let err = parse("router { history: true }").unwrap_err();
        assert!(err.message.contains("router option"));
    }

    #[test]
    fn test_store_block() {
        let source = r#"
store {
  state { count: 0, user: null }
  getters {
    doubled() { return this.count * 2 }
    isLoggedIn { return this.user !== null }
  }
  actions {
    increment() { this.count++ }
  }
  persist: true
  storageKey: "app-store"
  plugins: [logger, devtools({ name: "app" })]
}
"#;
        let ast = parse_ast(source).unwrap();
        let store = ast.program.store.as_ref().unwrap();
        assert_eq!(store.state.as_ref().unwrap().properties.len(), 2);
        assert_eq!(store.getters.len(), 2);
        assert_eq!(ast.raw_text(store.getters[0].body), "return this.count * 2");
        assert_eq!(store.actions.as_ref().unwrap().functions.len(), 1);
        assert_eq!(store.persist, Some(true));
        assert_eq!(store.storage_key.as_deref(), Some("app-store"));
        assert!(matches!(store.plugins, Some(Expr::Array { ref elements, .. }) if elements.len() == 2));
    }

    #[test]
    fn test_getter_with_params() {
        let err = parse("store { getters { byId(id) { } } }").unwrap_err();
        assert!(err.message.contains("takes no parameters"));
    }

    #[test]
    fn test_duplicate_store_field() {
        let err = parse("store { persist: true persist: false }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBlock);
        assert!(err.message.contains("'persist'"));
    }

    #[test]
    fn test_persist_requires_bool() {
        let err = parse(r#"store { persist: "yes" }"#).unwrap_err();
        assert!(err.message.contains("'true' or 'false'"));
    }
}
