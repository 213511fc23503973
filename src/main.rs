use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner;
use rox::session::Session;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    /// Without a subcommand, start an interactive prompt
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token instead of the plain dump
        #[arg(long)]
        json: bool,
    },

    /// Parses a program from a file and prints its syntax tree
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a Lox program; without a file, starts an interactive prompt
    Run { filename: Option<PathBuf> },
}

/// Reads a whole source file through a read‑only memory map.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the mapping is only read, and copied out before `file` closes.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", len, filename);

    Ok(text)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "{} {:<5} [{}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let mut had_error = false;

    for item in scanner::Scanner::new(&source) {
        match item {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),
            Ok(token) => println!("{}", token),
            Err(e) => {
                had_error = true;
                eprintln!("{}", e);
            }
        }
    }

    Ok(if had_error { 65 } else { 0 })
}

fn parse(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, scan_errors) = scanner::scan(&source);
    report(&scan_errors);

    match Parser::new(&tokens).parse() {
        Ok(statements) => {
            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }
            Ok(if scan_errors.is_empty() { 0 } else { 65 })
        }
        Err(errors) => {
            report(&errors);
            Ok(65)
        }
    }
}

fn evaluate(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, scan_errors) = scanner::scan(&source);
    report(&scan_errors);

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) if scan_errors.is_empty() => expr,
        Ok(_) => return Ok(65),
        Err(errors) => {
            report(&errors);
            return Ok(65);
        }
    };

    info!("Expression parsed successfully");

    match Interpreter::new().evaluate(&expr) {
        Ok(value) => {
            println!("{}", value);
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(e.exit_code())
        }
    }
}

fn run_file(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut session = Session::new();

    match session.run(&source) {
        Ok(()) => {
            info!("Program executed successfully");
            Ok(0)
        }
        Err(failure) => {
            report(failure.errors());
            Ok(failure.exit_code())
        }
    }
}

/// Interactive prompt: every line is its own execution unit, errors are
/// reported and the session carries on.
fn run_prompt() -> Result<i32> {
    info!("Starting interactive prompt");

    let mut session = Session::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if let Err(failure) = session.run(&line) {
            report(failure.errors());
        }
    }

    println!();
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let code: i32 = match args.commands {
        Some(Commands::Tokenize { filename, json }) => tokenize(&filename, json)?,
        Some(Commands::Parse { filename }) => parse(&filename)?,
        Some(Commands::Evaluate { filename }) => evaluate(&filename)?,
        Some(Commands::Run {
            filename: Some(filename),
        }) => run_file(&filename)?,
        Some(Commands::Run { filename: None }) | None => run_prompt()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        process::exit(code);
    }

    Ok(())
}
