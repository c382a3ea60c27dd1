use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use loxwalk::ast_printer::AstPrinter;
use loxwalk::interpreter::Interpreter;
use loxwalk::lox::{EXIT_IO_ERROR, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR, EXIT_USAGE};
use loxwalk::parser::Parser;
use loxwalk::scanner::Scanner;
use loxwalk::{Lox, LoxError, Outcome};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to loxwalk.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a program and prints its syntax tree
    Parse { filename: PathBuf },

    /// Evaluates a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt (the default)
    Repl,
}

fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);
    Ok(source)
}

fn init_logger(to_file: bool) -> Result<()> {
    if !to_file {
        // Silent unless RUST_LOG asks for something.
        Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
        return Ok(());
    }

    let log_file = File::create("loxwalk.log").context("Failed to create loxwalk.log")?;

    Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("loxwalk::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Logger initialized, writing to loxwalk.log");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let scanned = Scanner::new(&source).scan_tokens();

    for err in &scanned.errors {
        eprintln!("{}", err);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&scanned.tokens)?);
    } else {
        for token in &scanned.tokens {
            println!("{}", token);
        }
    }

    Ok(if scanned.errors.is_empty() {
        0
    } else {
        EXIT_STATIC_ERROR
    })
}

fn parse(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let scanned = Scanner::new(&source).scan_tokens();
    let parsed = Parser::new(scanned.tokens).parse();

    let errors: Vec<_> = scanned.errors.iter().chain(parsed.errors.iter()).collect();
    if !errors.is_empty() {
        for err in errors {
            eprintln!("{}", err);
        }
        return Ok(EXIT_STATIC_ERROR);
    }

    for stmt in &parsed.statements {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    Ok(0)
}

fn evaluate(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let scanned = Scanner::new(&source).scan_tokens();

    if !scanned.errors.is_empty() {
        for err in &scanned.errors {
            eprintln!("{}", err);
        }
        return Ok(EXIT_STATIC_ERROR);
    }

    let expr = match Parser::new(scanned.tokens).parse_expression() {
        Ok(expr) => expr,
        Err(errors) => {
            for err in errors {
                eprintln!("{}", err);
            }
            return Ok(EXIT_STATIC_ERROR);
        }
    };

    debug!("Expression: {}", AstPrinter::print(&expr));

    match Interpreter::new().evaluate_expression(&expr) {
        Ok(value) => {
            println!("{}", value);
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(EXIT_RUNTIME_ERROR)
        }
    }
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Completed => {}
        Outcome::StaticErrors(diagnostics) => eprintln!("{}", diagnostics),
        Outcome::RuntimeError(e) => eprintln!("{}", e),
    }
}

fn run(filename: &Path) -> Result<i32> {
    let outcome = Lox::new()
        .run_file(filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    report(&outcome);
    Ok(outcome.exit_code())
}

fn repl() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        // Errors are reported and forgotten; the session keeps its globals.
        report(&lox.run(&line));
    }

    Ok(0)
}

/// Maps a failure that escaped a command to its exit status.
fn failure_code(err: &anyhow::Error) -> i32 {
    let io = err.chain().any(|cause| {
        cause.is::<io::Error>() || matches!(cause.downcast_ref::<LoxError>(), Some(LoxError::Io(_)))
    });

    if io {
        EXIT_IO_ERROR
    } else {
        EXIT_RUNTIME_ERROR
    }
}

fn main() -> Result<()> {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print()?;
            // --help and --version land here too
            process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    init_logger(args.log)?;

    info!("CLI arguments: {:?}", args);

    let result = match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(&filename, json),
        Commands::Parse { filename } => parse(&filename),
        Commands::Evaluate { filename } => evaluate(&filename),
        Commands::Run { filename } => run(&filename),
        Commands::Repl => repl(),
    };

    let code = result.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        failure_code(&e)
    });

    if code != 0 {
        debug!("Exiting with code {}", code);
        process::exit(code);
    }

    Ok(())
}
