//! Invariants that must hold for every input, not just the expected fixtures.
//!
//! Run with: cargo test --test invariants

use libtest_mimic::{Arguments, Failed, Trial};
use pulse_compiler::{ErrorKind, ParseOptions, TokenKind, parse, parse_with, tokenize};
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let args = Arguments::from_args();

    let mut trials = Vec::new();
    for path in sources() {
        let name = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
        let p = path.clone();
        trials.push(Trial::test(format!("tokens::{}", name), move || token_stream(&p)));
        let p = path.clone();
        trials.push(Trial::test(format!("prefixes::{}", name), move || prefixes_never_panic(&p)));
    }

    trials.push(Trial::test("depth::expressions", deep_expressions));
    trials.push(Trial::test("depth::view", deep_view));
    trials.push(Trial::test("depth::style", deep_style));
    trials.push(Trial::test("style::garbage_falls_back", style_garbage_falls_back));
    trials.push(Trial::test("serde::camel_case_program", camel_case_program));

    libtest_mimic::run(&args, trials).exit();
}

/// Every .pulse file under tests/
fn sources() -> Vec<PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/**/*.pulse");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    files.sort();
    files
}

fn read(path: &Path) -> Result<String, Failed> {
    fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e).into())
}

/// One trailing EOF, spans in order, `raw` equal to the source slice
fn token_stream(path: &Path) -> Result<(), Failed> {
    let source = read(path)?;
    let tokens = tokenize(&source);

    let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
    if eofs != 1 || tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
        return Err(format!("{}: expected exactly one trailing EOF", path.display()).into());
    }

    let mut previous_end = 0;
    let mut previous_position = (1, 1);
    for token in &tokens {
        if token.span.start < previous_end {
            return Err(format!("{}: overlapping token {:?}", path.display(), token).into());
        }
        if source.get(token.span.start..token.span.end) != Some(token.raw.as_str()) {
            return Err(format!("{}: raw does not match source for {:?}", path.display(), token).into());
        }
        if (token.line, token.column) < previous_position {
            return Err(format!("{}: position went backwards at {:?}", path.display(), token).into());
        }
        previous_end = token.span.end;
        previous_position = (token.line, token.column);
    }
    Ok(())
}

/// Truncating a valid file anywhere yields a result, never a panic
fn prefixes_never_panic(path: &Path) -> Result<(), Failed> {
    let source = read(path)?;
    for (index, _) in source.char_indices() {
        let prefix = &source[..index];
        if let Err(error) = parse(prefix) {
            let lines = prefix.lines().count() as u32 + 1;
            if error.line == 0 || error.line > lines {
                return Err(format!(
                    "{}: error line {} outside a {}-line prefix",
                    path.display(),
                    error.line,
                    lines
                )
                .into());
            }
        }
    }
    Ok(())
}

fn deep_expressions() -> Result<(), Failed> {
    let source = format!("state {{ x: {}1{} }}", "(".repeat(5000), ")".repeat(5000));
    expect_too_deep(parse(&source).err().map(|e| e.kind))
}

fn deep_view() -> Result<(), Failed> {
    let source = format!("view {{ {}{} }}", "div { ".repeat(5000), "} ".repeat(5000));
    expect_too_deep(parse(&source).err().map(|e| e.kind))
}

fn deep_style() -> Result<(), Failed> {
    let strict = ParseOptions {
        style_fallback: false,
        ..ParseOptions::default()
    };
    let source = format!("style {{ {}{} }}", ".a { ".repeat(5000), "} ".repeat(5000));
    expect_too_deep(parse_with(&source, &strict).err().map(|e| e.kind))?;

    let ast = parse(&source).map_err(|e| e.to_string())?;
    let style = ast.program.style.ok_or("missing style block")?;
    if style.parse_error.is_none() || !style.rules.is_empty() {
        return Err("deep style should fall back to raw text".into());
    }
    Ok(())
}

fn expect_too_deep(kind: Option<ErrorKind>) -> Result<(), Failed> {
    match kind {
        Some(ErrorKind::NestingTooDeep) => Ok(()),
        other => Err(format!("expected NestingTooDeep, got {:?}", other).into()),
    }
}

/// Whatever sits between balanced braces, a style block never fails the parse
fn style_garbage_falls_back() -> Result<(), Failed> {
    let bodies = [
        "$x: 1;",
        "@mixin m($a) { color: $a } .b { @include m(red) }",
        ".a { color: }",
        ".a { : red }",
        ".a { color red }",
        "%placeholder { margin: 0 }",
        ".a { width: calc(100% - (2 * 8px)) ; }",
        "= + - * / ! ? ~ ^ | .a { }",
        "@ { }",
        ".a { b: c } }{ .d { }",
    ];
    for body in bodies {
        let source = format!("style {{ {} }}\nview {{ p \"after\" }}", body);
        match parse(&source) {
            Ok(ast) if ast.program.view.is_some() => {}
            Ok(_) => return Err(format!("view block lost after style {:?}", body).into()),
            Err(error) if error.kind == ErrorKind::UnexpectedEof || error.kind == ErrorKind::UnknownTopLevel => {
                // Unbalanced braces end the block early; that is a structural error
                if !body.contains("}{") {
                    return Err(format!("style {:?} failed: {}", body, error).into());
                }
            }
            Err(error) => return Err(format!("style {:?} failed: {}", body, error).into()),
        }
    }
    Ok(())
}

fn camel_case_program() -> Result<(), Failed> {
    let ast = parse("store { storageKey: \"k\" }").map_err(|e| e.to_string())?;
    let json = serde_json::to_value(&ast.program).map_err(|e| e.to_string())?;
    if json["store"]["storageKey"] != "k" {
        return Err(format!("unexpected JSON: {}", json).into());
    }
    Ok(())
}
