use clap::{ArgAction, Parser, Subcommand};
use pulse_compiler::{ParseError, ParseOptions, Program, parse_with, tokenize};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Pulse - lexer and parser for .pulse components")]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a .pulse file
    Tokens {
        /// Path to .pulse file
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Output tokens as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse .pulse files and report syntax errors
    Parse {
        /// Path to .pulse file or directory
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Print the AST as JSON (single file or stdin only)
        #[arg(long)]
        json: bool,

        /// Fail on style blocks the structured style parser cannot read
        #[arg(long)]
        strict_style: bool,

        /// Maximum nesting depth
        #[arg(long, default_value_t = ParseOptions::default().max_depth)]
        max_depth: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(io::stderr)
        .init();

    let ok = match cli.command {
        Commands::Tokens { file, stdin, json } => match read_input(file.as_deref(), stdin) {
            Some((source, _)) => {
                print_tokens(&source, json);
                true
            }
            None => false,
        },
        Commands::Parse {
            file,
            stdin,
            json,
            strict_style,
            max_depth,
        } => {
            let options = ParseOptions {
                style_fallback: !strict_style,
                max_depth,
            };
            match (stdin, file) {
                (true, _) => parse_stdin(&options, json),
                (false, Some(path)) => parse_path(&path, &options, json),
                (false, None) => {
                    eprintln!("Error: provide a file/directory or use --stdin");
                    false
                }
            }
        }
    };

    if !ok {
        process::exit(1);
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "pulse_compiler=warn",
        1 => "pulse_compiler=debug",
        _ => "pulse_compiler=trace",
    }
}

/// Read source from a file or stdin, returning it with a display name
fn read_input(file: Option<&Path>, stdin: bool) -> Option<(String, String)> {
    if stdin {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error: failed to read stdin: {}", e);
            return None;
        }
        return Some((source, "<stdin>".to_string()));
    }

    let path = file?;
    match fs::read_to_string(path) {
        Ok(source) => Some((source, path.display().to_string())),
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", path.display(), e);
            None
        }
    }
}

fn print_tokens(source: &str, json_output: bool) {
    let tokens = tokenize(source);

    if json_output {
        match serde_json::to_string_pretty(&tokens) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    for token in &tokens {
        println!(
            "{:>4}:{:<3} {:<14} {}",
            token.line,
            token.column,
            format!("{:?}", token.kind),
            token.raw.escape_debug()
        );
    }
}

fn parse_stdin(options: &ParseOptions, json_output: bool) -> bool {
    let Some((source, name)) = read_input(None, true) else {
        return false;
    };
    match parse_with(&source, options) {
        Ok(ast) => {
            if json_output {
                print_json(&ast.program);
            }
            true
        }
        Err(e) => {
            print_error(&e, &source, &name);
            false
        }
    }
}

fn parse_path(path: &Path, options: &ParseOptions, json_output: bool) -> bool {
    if path.is_file() {
        if path.extension().is_none_or(|ext| ext != "pulse") {
            eprintln!("Error: {} is not a .pulse file", path.display());
            return false;
        }
        let start = Instant::now();
        let ok = parse_file(path, options, json_output);
        if ok && !json_output {
            print_summary(1, 0, start.elapsed());
        }
        ok
    } else if path.is_dir() {
        if json_output {
            eprintln!("Error: --json needs a single file");
            return false;
        }
        parse_directory(path, options)
    } else {
        eprintln!("Error: {} does not exist", path.display());
        false
    }
}

fn parse_directory(dir: &Path, options: &ParseOptions) -> bool {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pulse"))
    {
        file_count += 1;
        if !parse_file(entry.path(), options, false) {
            failed += 1;
        }
    }

    if file_count == 0 {
        eprintln!("No .pulse files found in {}", dir.display());
        return false;
    }

    print_summary(file_count, failed, start.elapsed());
    failed == 0
}

fn parse_file(path: &Path, options: &ParseOptions, json_output: bool) -> bool {
    let Some((source, name)) = read_input(Some(path), false) else {
        return false;
    };

    match parse_with(&source, options) {
        Ok(ast) => {
            debug!(file = %name, tokens = ast.tokens.len(), "parsed");
            if let Some(error) = ast.program.style.as_ref().and_then(|s| s.parse_error.as_ref()) {
                print_warning(&name, error);
            }
            if json_output {
                print_json(&ast.program);
            } else {
                print_parsed(&name);
            }
            true
        }
        Err(e) => {
            print_error(&e, &source, &name);
            false
        }
    }
}

fn print_json(program: &Program) {
    match serde_json::to_string_pretty(program) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn print_parsed(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_warning(path: &str, message: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[33m!\x1b[0m {}: style kept as raw text ({})", path, message);
    } else {
        eprintln!("  ! {}: style kept as raw text ({})", path, message);
    }
}

fn print_error(error: &ParseError, source: &str, name: &str) {
    if io::stderr().is_terminal() {
        eprint!("{}", error.render_color(source, name));
    } else {
        eprint!("{}", error.render(source, name));
    }
}

fn print_summary(count: usize, failed: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };
    let failures = if failed > 0 {
        format!(", {} failed", failed)
    } else {
        String::new()
    };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Parsed {} {}{} in {}\x1b[0m", count, files_word, failures, time_str);
    } else {
        eprintln!("\n✨ Parsed {} {}{} in {}", count, files_word, failures, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
