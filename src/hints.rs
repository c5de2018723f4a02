//! Remediation hints for common syntax mistakes.
//!
//! `expect()` failures are looked up by (expected, found) token kinds; the
//! remaining error kinds carry a fixed documentation anchor.

use crate::error::ErrorKind;
use crate::parser::token::TokenKind;

const DOCS: &str = "docs/syntax.md";

/// A suggestion attached to a parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub help: &'static str,
    pub anchor: &'static str,
}

impl Hint {
    pub fn docs(&self) -> String {
        format!("{}#{}", DOCS, self.anchor)
    }
}

/// Hint for an `expect(expected)` that found `found` instead
pub fn for_mismatch(expected: TokenKind, found: TokenKind) -> Option<Hint> {
    use TokenKind as T;

    let hint = match (expected, found) {
        (T::RBrace, T::Eof) => Hint {
            help: "A block was opened with '{' but never closed. Add the matching '}'",
            anchor: "blocks",
        },
        (T::RParen, T::Eof) | (T::RParen, T::LBrace) => Hint {
            help: "Close the argument list with ')' before the block",
            anchor: "expressions",
        },
        (T::RBracket, _) => Hint {
            help: "Array literals and computed members end with ']'",
            anchor: "expressions",
        },
        (T::LParen, T::LBrace) => Hint {
            help: "Directives take their argument in parentheses: @if (condition) { ... }",
            anchor: "control-flow",
        },
        (T::LBrace, T::Colon) => Hint {
            help: "Block names are not followed by ':'. Write `state { count: 0 }`",
            anchor: "blocks",
        },
        (T::LBrace, T::Eq) => Hint {
            help: "Blocks are not assigned. Write `state { ... }` instead of `state = { ... }`",
            anchor: "blocks",
        },
        (T::Colon, T::Eq) => Hint {
            help: "Properties use ':' rather than '=': `count: 0`",
            anchor: "state",
        },
        (T::Colon, T::Ident) | (T::Colon, T::Number) | (T::Colon, T::String) => Hint {
            help: "Each property needs a ':' between its name and value",
            anchor: "state",
        },
        (T::In, _) | (T::Of, _) => Hint {
            help: "Loops name the item and the list: @for (item of items) { ... }",
            anchor: "loops",
        },
        (T::String, T::Ident) => Hint {
            help: "Paths and names here are string literals. Wrap the value in quotes",
            anchor: "imports",
        },
        (T::From, T::String) => Hint {
            help: "Named imports need 'from' before the module path: import { a } from \"./a\"",
            anchor: "imports",
        },
        (T::Ident, T::Number) => Hint {
            help: "Names cannot start with a digit",
            anchor: "expressions",
        },
        (T::Ident, k) if k.is_keyword() => Hint {
            help: "Reserved words cannot be used as names here",
            anchor: "keywords",
        },
        (T::Arrow, _) => Hint {
            help: "Arrow functions need '=>' after the parameter list",
            anchor: "expressions",
        },
        _ => return None,
    };
    Some(hint)
}

/// Documentation anchor for errors that are not token mismatches
pub fn for_kind(kind: ErrorKind) -> Option<Hint> {
    let hint = match kind {
        ErrorKind::DuplicateBlock => Hint {
            help: "Each block may appear once per file. Merge the two blocks into one",
            anchor: "blocks",
        },
        ErrorKind::UnknownTopLevel => Hint {
            help: "A component file contains imports, @page, @route and the blocks props, state, view, actions, style, router, store",
            anchor: "file-structure",
        },
        ErrorKind::InvalidImport => Hint {
            help: "Supported forms: import X from \"m\", import { a, b as c } from \"m\", import * as ns from \"m\", import \"m\"",
            anchor: "imports",
        },
        ErrorKind::InvalidModifier => Hint {
            help: "@model accepts the modifiers .lazy, .trim and .number",
            anchor: "two-way-binding",
        },
        ErrorKind::InvalidDirective => Hint {
            help: "Check the directive's argument list against the directive reference",
            anchor: "directives",
        },
        ErrorKind::InvalidAssignment => Hint {
            help: "Only names and member expressions can be assigned to",
            anchor: "expressions",
        },
        ErrorKind::InvalidInterpolation => Hint {
            help: "Interpolations look like {expression}. Escape a literal brace as \\{",
            anchor: "text",
        },
        ErrorKind::InvalidStyle => Hint {
            help: "Preprocessor syntax is kept as raw CSS unless strict style parsing is enabled",
            anchor: "style",
        },
        ErrorKind::NestingTooDeep => Hint {
            help: "Split deeply nested markup or expressions into smaller components",
            anchor: "limits",
        },
        ErrorKind::InvalidToken => Hint {
            help: "Remove the character or wrap it in a string literal",
            anchor: "lexical-structure",
        },
        ErrorKind::UnexpectedToken | ErrorKind::UnexpectedEof => return None,
    };
    Some(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclosed_block_hint() {
        let hint = for_mismatch(TokenKind::RBrace, TokenKind::Eof).unwrap();
        assert!(hint.help.contains("never closed"));
        assert_eq!(hint.docs(), "docs/syntax.md#blocks");
    }

    #[test]
    fn test_keyword_as_name_hint() {
        let hint = for_mismatch(TokenKind::Ident, TokenKind::If).unwrap();
        assert_eq!(hint.anchor, "keywords");
    }

    #[test]
    fn test_no_hint_for_unrelated_pair() {
        assert!(for_mismatch(TokenKind::Comma, TokenKind::Dot).is_none());
    }

    #[test]
    fn test_every_kind_but_generic_has_docs() {
        assert!(for_kind(ErrorKind::DuplicateBlock).is_some());
        assert!(for_kind(ErrorKind::UnexpectedToken).is_none());
    }
}
