use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flow_templates::{
    extract_type_map, parse, render, typecheck, ParseError, Position, RenderError, Scope,
    Traversal, Value,
};

/// Render a flow template to stdout.
#[derive(Debug, Parser)]
#[command(name = "flow", version)]
struct Cli {
    /// Template file; read from stdin when omitted.
    template: Option<PathBuf>,

    /// JSON object of variable values. `null` switches a flag on.
    #[arg(long, value_name = "FILE")]
    scope: Option<PathBuf>,

    /// Set a variable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Switch a boolean flag on.
    #[arg(long = "flag", value_name = "NAME")]
    flags: Vec<String>,

    /// Print the inferred variable types as JSON instead of rendering.
    #[arg(long)]
    types: bool,

    /// Only infer types from top-level tags.
    #[arg(long)]
    top_level_only: bool,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let input = match &cli.template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read template from stdin")?;
            input
        }
    };
    let lines: Vec<&str> = input.lines().collect();

    let parsed = parse(&input);
    if !parsed.is_ok() {
        for err in &parsed.errors {
            print_parse_error(&lines, err);
        }
        return Ok(ExitCode::FAILURE);
    }

    let traversal = if cli.top_level_only {
        Traversal::TopLevel
    } else {
        Traversal::Nested
    };
    let (tm, tm_errors) = extract_type_map(&parsed.ast, traversal);
    if !tm_errors.is_empty() {
        for err in &tm_errors {
            eprintln!("{}", err);
        }
        return Ok(ExitCode::FAILURE);
    }

    if cli.types {
        println!("{}", serde_json::to_string_pretty(&tm)?);
        return Ok(ExitCode::SUCCESS);
    }

    let checked = typecheck(build_scope(&cli)?, &tm);
    if !checked.is_ok() {
        for err in &checked.errors {
            eprintln!("{} (got '{}')", err, err.val);
        }
        return Ok(ExitCode::FAILURE);
    }

    match render(&parsed.ast, &checked.scope) {
        Ok(output) => {
            print!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let RenderError::NotDeclared { pos, .. } = &err;
            print_diagnostic(&lines, *pos, *pos, &err.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// The scope file first, then `--set` and `--flag` on top of it.
fn build_scope(cli: &Cli) -> anyhow::Result<Scope> {
    let mut scope = Scope::new();
    if let Some(path) = &cli.scope {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scope {}", path.display()))?;
        let vars: BTreeMap<String, Option<Value>> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("invalid scope file {}: {}", path.display(), e))?;
        for (name, value) in vars {
            scope.insert(name, value.unwrap_or(Value::Bool(true)));
        }
    }

    let answers = cli
        .set
        .iter()
        .map(|(name, value)| (name.clone(), Some(value.clone())))
        .chain(cli.flags.iter().map(|name| (name.clone(), None)));
    for (name, value) in Scope::from_answers(answers).iter() {
        scope.insert(name.clone(), value.clone());
    }
    Ok(scope)
}

fn print_parse_error(lines: &[&str], err: &ParseError) {
    print_diagnostic(lines, err.begin, err.end, &err.message);
}

fn print_diagnostic(lines: &[&str], begin: Position, end: Position, message: &str) {
    let line_text = lines.get(begin.line).unwrap_or(&"");

    eprintln!("ERROR AT LINE {}:", begin.line + 1);
    eprintln!("{}", line_text);

    // Build the underline
    let start_col = begin.column;
    let line_len = line_text.chars().count();
    let end_col = if begin.line == end.line && end.column > begin.column {
        end.column
    } else if start_col < line_len {
        // Point error or spans multiple lines: underline to end of line
        line_len
    } else {
        start_col + 1
    };

    let mut underline = " ".repeat(start_col);
    underline.push('^');
    if end_col > start_col + 1 {
        underline.push_str(&"_".repeat(end_col - start_col - 1));
    }

    eprintln!("{}", underline);
    eprintln!("{}", message);
    eprintln!();
}
