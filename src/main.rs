use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::lox::Lox;
use rox::scanner::Scanner;

/// Exit status for scan, parse and resolve errors.
const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(
    version,
    about = "Lox language interpreter",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to run; starts an interactive prompt when omitted
    script: Option<PathBuf>,

    /// Enable logging to rox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },
}

/// Reads a whole source file, rejecting invalid UTF‑8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(LoxError::from)
        .context(format!("{:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger(to_file: bool) -> Result<()> {
    if !to_file {
        // Honour RUST_LOG if set, otherwise stay silent.
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
        return Ok(());
    }

    let log_file = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to rox.log");
    Ok(())
}

fn exit_code(error: &LoxError) -> i32 {
    if error.is_static() {
        EXIT_STATIC_ERROR
    } else {
        EXIT_RUNTIME_ERROR
    }
}

fn run_file(filename: &Path) -> Result<()> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    if let Err(e) = lox.run(&source) {
        debug!("Run failed: {:?}", e);
        eprintln!("{}", e);
        std::process::exit(exit_code(&e));
    }

    info!("Program executed successfully");
    Ok(())
}

fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if line.trim() == "exit()" {
            break;
        }

        if let Err(e) = lox.run(&line) {
            eprintln!("{}", e);
        }

        lox.reset_errors();
    }

    info!("Leaving interactive prompt");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for result in Scanner::new(&source) {
        match result {
            Ok(token) if json => {
                println!("{}", serde_json::to_string(&token).context("Failed to encode token")?);
            }
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        std::process::exit(EXIT_STATIC_ERROR);
    }

    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    let source = read_file(filename)?;

    match Lox::parse_expression(&source) {
        Ok(expr) => println!("{}", AstPrinter.print(&expr)),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_STATIC_ERROR);
        }
    }

    Ok(())
}

fn evaluate(filename: &Path) -> Result<()> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    match lox.evaluate(&source) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    init_logger(args.log)?;

    info!("CLI arguments: {:?}", args);

    match (args.command, args.script) {
        (Some(Commands::Tokenize { filename, json }), _) => tokenize(&filename, json),
        (Some(Commands::Parse { filename }), _) => parse(&filename),
        (Some(Commands::Evaluate { filename }), _) => evaluate(&filename),
        (Some(Commands::Run { filename }), _) | (None, Some(filename)) => run_file(&filename),
        (None, None) => run_prompt(),
    }
}
