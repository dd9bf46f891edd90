use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use jdb_eval::ast_printer::AstPrinter;
use jdb_eval::error::EvalError;
use jdb_eval::expression::{assignment_expression, ExpressionParser};
use jdb_eval::memory::Memory;
use jdb_eval::mirror::MirrorEvaluator;
use jdb_eval::scanner::Scanner;

const LOG_FILE: &str = "jdb-eval.log";

#[derive(ClapParser, Debug)]
#[command(version, about = "Java debug expression evaluator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to jdb-eval.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes an expression, printing each token
    Tokenize { expression: String },

    /// Parses an expression and prints its AST
    Parse {
        expression: String,

        /// Collect every syntax error instead of stopping at the first
        #[arg(long)]
        diagnostics: bool,

        /// Print the tree as JSON instead of the prefix form
        #[arg(long)]
        json: bool,
    },

    /// Evaluates an expression against a snapshot and prints the result
    Evaluate {
        expression: String,

        /// JSON snapshot of the suspended thread
        #[arg(long)]
        snapshot: PathBuf,

        /// Print the snapshot after evaluation
        #[arg(long)]
        dump: bool,
    },

    /// Checks a breakpoint condition, printing `hit` or `skip`
    Condition {
        expression: String,

        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Assigns a value to the variable at a path such as `a b [2] c`
    Set {
        #[arg(required = true)]
        path: Vec<String>,

        /// New value, as a Java expression
        #[arg(long)]
        value: String,

        #[arg(long)]
        snapshot: PathBuf,

        /// Print the snapshot after the assignment
        #[arg(long)]
        dump: bool,
    },
}

/// Reads a snapshot file into a `Memory` target.
fn load_memory(path: &Path) -> Result<Memory> {
    info!("Reading snapshot: {:?}", path);

    let file = File::open(path).context(format!("Failed to open file {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut json = String::new();

    let bytes = reader
        .read_to_string(&mut json)
        .context(format!("Failed to read file {:?}", path))?;

    info!("Read {} bytes from {:?}", bytes, path);

    Memory::from_json(&json).context(format!("Invalid snapshot {:?}", path))
}

fn init_logger() -> Result<()> {
    let log_file = File::create(LOG_FILE).context(format!("Failed to create {}", LOG_FILE))?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("jdb_eval::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to {}", LOG_FILE);
    Ok(())
}

/// Exit status for a failed evaluation: 65 for syntax, 70 for everything else.
fn exit_code(err: &EvalError) -> i32 {
    if err.is_syntax() {
        65
    } else {
        70
    }
}

fn fail(err: EvalError) -> ! {
    debug!("Evaluation debug: {:?}", err);
    eprintln!("{}", err);
    std::process::exit(exit_code(&err));
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { expression } => {
            info!("Running Tokenize subcommand");

            let mut tokenized = true;

            for token in Scanner::new(&expression) {
                match token {
                    Ok(token) => {
                        debug!("Scanned token: {}", token);
                        println!("{}", token);
                    }

                    Err(e) => {
                        tokenized = false;
                        debug!("Tokenization debug: {}", e);
                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");
                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse {
            expression,
            diagnostics,
            json,
        } => {
            info!("Running Parse subcommand");

            let mut parser =
                ExpressionParser::new_instance(expression).collecting_diagnostics(diagnostics);

            match parser.ast() {
                Ok(expr) => {
                    let ast_str: String = if json {
                        serde_json::to_string_pretty(expr).context("Failed to serialize AST")?
                    } else {
                        AstPrinter.print(expr)
                    };

                    debug!("AST: {}", ast_str);
                    println!("{}", ast_str);
                }

                Err(e) => {
                    if diagnostics {
                        for diagnostic in parser.diagnostics() {
                            eprintln!("{}", diagnostic);
                        }

                        std::process::exit(65);
                    }

                    fail(e);
                }
            }

            info!("Parse subcommand completed");
        }

        Commands::Evaluate {
            expression,
            snapshot,
            dump,
        } => {
            info!("Running Evaluate subcommand");

            let memory: Memory = load_memory(&snapshot)?;
            let evaluator = MirrorEvaluator::new(&memory);
            let mut parser = ExpressionParser::new_instance(expression);

            match parser.evaluate(&evaluator) {
                Ok(value) => {
                    debug!("Evaluated to: {}", value);
                    println!("{}", memory.describe(&value));
                }

                Err(e) => fail(e),
            }

            if dump {
                println!("{}", memory.to_json()?);
            }

            info!("Evaluate subcommand completed");
        }

        Commands::Condition {
            expression,
            snapshot,
        } => {
            info!("Running Condition subcommand");

            let memory: Memory = load_memory(&snapshot)?;
            let evaluator = MirrorEvaluator::new(&memory);
            let mut parser = ExpressionParser::new_instance(expression);

            match evaluator.condition_holds(&mut parser) {
                Ok(hit) => println!("{}", if hit { "hit" } else { "skip" }),
                Err(e) => fail(e),
            }
        }

        Commands::Set {
            path,
            value,
            snapshot,
            dump,
        } => {
            info!("Running Set subcommand");

            let memory: Memory = load_memory(&snapshot)?;
            let evaluator = MirrorEvaluator::new(&memory);
            let text: String = assignment_expression(&path, &value);

            debug!("Assignment expression: {}", text);

            let mut parser = ExpressionParser::new_instance(text);

            match parser.evaluate(&evaluator) {
                Ok(stored) => println!("{}", memory.describe(&stored)),
                Err(e) => fail(e),
            }

            if dump {
                println!("{}", memory.to_json()?);
            }
        }
    }

    Ok(())
}
