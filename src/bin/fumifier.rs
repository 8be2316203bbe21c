//! Simple CLI for Fumifier expression evaluation.
//!
//! A command-line interface for compiling and evaluating FLASH/JSONata
//! expressions against a JSON input, printing the result or diagnostics.

use clap::{Parser, Subcommand};
use fumifier::engine::{fumifier, EngineOptions};
use fumifier::value::Value;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read as _};
use std::process;

#[derive(Parser)]
#[command(name = "fumifier")]
#[command(about = "Compile and evaluate Fumifier expressions against a JSON input")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against a JSON input
    Evaluate {
        /// Expression source
        expression: String,
        /// JSON file containing the input (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
        /// Report all diagnostics instead of stopping at the first fatal one
        #[arg(short, long)]
        verbose: bool,
    },
    /// Parse an expression and print its AST as JSON
    Parse {
        /// Expression source
        expression: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { expression, file, pretty, verbose } => {
            handle_evaluate(&expression, file.as_deref(), pretty, verbose);
        }
        Commands::Parse { expression } => handle_parse(&expression),
    }
}

fn read_input(file: Option<&str>) -> String {
    match file {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading file '{path}': {e}");
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {e}");
                process::exit(1);
            }
            buffer
        }
    }
}

fn handle_evaluate(expression: &str, file: Option<&str>, pretty: bool, verbose: bool) {
    let input_text = read_input(file);
    let input_json: JsonValue = match serde_json::from_str(&input_text) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error parsing JSON input: {e}");
            process::exit(1);
        }
    };

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    runtime.block_on(async move {
        let compiled = match fumifier(expression, EngineOptions::default()).await {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error compiling expression: {e}");
                process::exit(1);
            }
        };
        let input = Value::from_json(&input_json);

        if verbose {
            let report = compiled.evaluate_verbose(input, &[]).await;
            let output = serde_json::json!({
                "ok": report.ok,
                "status": report.status,
                "result": report.result.map(|v| fumifier::value::to_json(&v)),
                "diagnostics": report.diagnostics,
                "executionId": report.execution_id,
            });
            print_json(&output, pretty);
        } else {
            match compiled.evaluate(input, &[]).await {
                Ok(value) => print_json(&fumifier::value::to_json(&value), pretty),
                Err(e) => {
                    eprintln!("Evaluation error: {}", e.diagnostic.message);
                    process::exit(1);
                }
            }
        }
    });
}

fn handle_parse(expression: &str) {
    match fumifier::parser::parse(expression, true) {
        Ok((ast, diagnostics)) => {
            print_json(&serde_json::to_value(&ast).unwrap_or(JsonValue::Null), true);
            for diag in diagnostics {
                eprintln!("{}: {}", diag.code, diag.message);
            }
        }
        Err(e) => {
            eprintln!("Error parsing expression: {}", e.0.message);
            process::exit(1);
        }
    }
}

fn print_json(value: &JsonValue, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    };
    println!("{text}");
}
