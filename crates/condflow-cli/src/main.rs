//! condflow command-line diagnostics

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use condflow_compiler::{CompilerOptions, PredicateCompiler};
use condflow_core::{Token, TokenKind, Value};
use condflow_sdk::{PipelinesConfig, StepTarget};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "condflow", version, about = "Inspect and evaluate condflow expressions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of an expression
    Tokenize {
        expression: String,
    },

    /// Print the condition tree of an expression as JSON
    Parse {
        expression: String,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Evaluate an expression against a JSON record
    ///
    /// Exits with 0 when the expression holds, 1 when it does not.
    Eval {
        expression: String,

        /// Name the expression uses for the record
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// The record, as JSON
        #[arg(short, long, default_value = "{}")]
        item: String,

        /// Compile without constant folding
        #[arg(long)]
        no_fold: bool,
    },

    /// Parse a pipeline definition file and compile every step condition
    Check {
        /// Path to a .yaml, .yml or .json definition file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{:#}", e);
    }

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condflow=info,condflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

/// Run one command; `Ok(false)` only for an expression that evaluated false
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Tokenize { expression } => {
            for line in tokenize_lines(&expression)? {
                println!("{}", line);
            }
            Ok(true)
        }
        Commands::Parse {
            expression,
            compact,
        } => {
            println!("{}", parse_json(&expression, compact)?);
            Ok(true)
        }
        Commands::Eval {
            expression,
            prefix,
            item,
            no_fold,
        } => {
            let result = eval(&expression, &prefix, &item, !no_fold)?;
            println!("{}", result);
            Ok(result)
        }
        Commands::Check { file } => {
            let count = check(&file)?;
            info!("{}: {} condition(s) compiled", file.display(), count);
            println!("ok");
            Ok(true)
        }
    }
}

fn tokenize_lines(expression: &str) -> Result<Vec<String>> {
    let tokens = condflow_parser::tokenize(expression)?;
    Ok(tokens.iter().map(describe_token).collect())
}

fn describe_token(token: &Token) -> String {
    let kind = match token.kind {
        TokenKind::Value => "Value",
        TokenKind::QuotedString => "QuotedString",
        TokenKind::Operator(_) => "Operator",
        TokenKind::GroupDelim(_) => "GroupDelim",
        TokenKind::ListSeparator => "ListSeparator",
    };
    format!("{:>4}  {:<13} {}", token.offset, kind, token.text)
}

fn parse_json(expression: &str, compact: bool) -> Result<String> {
    let condition = condflow_parser::parse_expression(expression)?;
    let json = if compact {
        serde_json::to_string(&condition)?
    } else {
        serde_json::to_string_pretty(&condition)?
    };
    Ok(json)
}

fn eval(expression: &str, prefix: &str, item: &str, fold: bool) -> Result<bool> {
    let record: serde_json::Value =
        serde_json::from_str(item).context("--item is not valid JSON")?;
    let record = Value::from(record);

    let compiler = PredicateCompiler::with_options(CompilerOptions {
        enable_constant_folding: fold,
    });
    let predicate = compiler.compile_expression::<Value>(expression, prefix)?;
    Ok(predicate.evaluate(&record))
}

/// Compile every `when` in a definition file against dynamic records
fn check(path: &Path) -> Result<usize> {
    let config = PipelinesConfig::from_file(path)?;
    let compiler = PredicateCompiler::new();
    let mut count = 0;

    for pipeline in &config.pipelines {
        for (index, step) in pipeline.steps.iter().enumerate() {
            let target = step
                .target()
                .with_context(|| format!("pipeline '{}', step {}", pipeline.name, index + 1))?;
            let when = match step.when.as_deref().map(str::trim) {
                Some(when) if !when.is_empty() => when,
                _ => continue,
            };
            let prefix = step
                .prefix
                .as_deref()
                .or(config.default_prefix.as_deref())
                .unwrap_or_default();

            compiler
                .compile_expression::<Value>(when, prefix)
                .with_context(|| {
                    let name = match target {
                        StepTarget::Processor(name) | StepTarget::Pipeline(name) => name,
                    };
                    format!("pipeline '{}', step '{}'", pipeline.name, name)
                })?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tokenize_lines() {
        let lines = tokenize_lines("a = 1").unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Value"));
        assert!(lines[1].contains("Operator"));
        assert!(lines[2].ends_with('1'));
    }

    #[test]
    fn test_parse_json() {
        let json = parse_json("x = {1,2,3}", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["Group"]["children"][0]["SetComparison"]["operator"],
            "In"
        );
    }

    #[test]
    fn test_eval() {
        assert!(eval("a = 1", "x", r#"{"a": 1}"#, true).unwrap());
        assert!(!eval("a = 1", "x", r#"{"a": 2}"#, true).unwrap());
        assert!(eval("x.n > 2 * 3", "x", r#"{"n": 7}"#, false).unwrap());
    }

    #[test]
    fn test_eval_errors() {
        assert!(eval("a = 1", "", "not json", true).is_err());
        assert!(eval("a = ", "", "{}", true).is_err());
    }

    #[test]
    fn test_eval_args() {
        let cli = Cli::try_parse_from(["condflow", "eval", "a = 1", "--item", r#"{"a":1}"#]).unwrap();
        match cli.command {
            Commands::Eval { prefix, item, no_fold, .. } => {
                assert_eq!(prefix, "");
                assert_eq!(item, r#"{"a":1}"#);
                assert!(!no_fold);
            }
            _ => panic!("expected eval"),
        }
    }
}
