//! WorldQuest -- a country roadmap engine speaking the WQI protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//!
//! Usage:
//!   worldquest [--dataset FILE]
//!
//! The dataset defaults to the bundled country table. `WORLDQUEST_DATASET`
//! is used when `--dataset` is not given. Set `RUST_LOG` for diagnostics.

use std::borrow::Cow;
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use log::{error, info, warn};

use worldquest::atlas::{Atlas, DatasetError};
use worldquest::engine::Engine;
use worldquest::protocol::parser::{parse_command, Command};

const DATASET_ENV: &str = "WORLDQUEST_DATASET";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let dataset = match parse_args(env::args().skip(1)) {
        Ok(Some(path)) => Some(path),
        Ok(None) => env::var_os(DATASET_ENV).map(PathBuf::from),
        Err(msg) => {
            eprintln!("{}", msg);
            print_usage();
            process::exit(2);
        }
    };

    let atlas = match load_atlas(dataset) {
        Ok(atlas) => atlas,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!("loaded {} countries", atlas.len());

    if let Err(e) = run(Engine::new(atlas)) {
        error!("{}", e);
        process::exit(1);
    }
}

/// Returns the `--dataset` path, if any. `--help` prints usage and exits.
fn parse_args<I>(args: I) -> Result<Option<PathBuf>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut dataset = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => match args.next() {
                Some(path) => dataset = Some(PathBuf::from(path)),
                None => return Err("--dataset requires a path".to_string()),
            },
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(dataset)
}

fn load_atlas(path: Option<PathBuf>) -> Result<Atlas, DatasetError> {
    match path {
        Some(path) => {
            info!("loading dataset from {}", path.display());
            Atlas::load(&path)
        }
        None => Atlas::bundled(),
    }
}

fn print_usage() {
    eprintln!("Usage: worldquest [--dataset FILE]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dataset FILE  Country table in JSON (default: bundled, or ${})", DATASET_ENV);
    eprintln!("  -h, --help      Show this message");
}

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn run(mut engine: Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // Invalid UTF-8 decodes to replacement characters, which no command
        // accepts, so such lines are logged and skipped by the parser.
        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            warn!("input line is not valid UTF-8");
        }

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Wqi => engine.handle_wqi(&mut out)?,
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => engine.new_game(),
            Command::Start { codes } => engine.set_start(codes),
            Command::Completed { codes } => engine.set_completed(codes),
            Command::Allowed { codes } => engine.set_allowed(codes),
            Command::Roadmap => engine.handle_roadmap(&mut out)?,
            Command::Complete { code } => engine.handle_complete(&mut out, &code)?,
            Command::Neighbors { code } => engine.handle_neighbors(&mut out, &code)?,
            Command::Distance { from, to } => engine.handle_distance(&mut out, &from, &to)?,
            Command::Score { answers } => engine.handle_score(&mut out, &answers)?,
            Command::Quit => break,
        }
    }
    Ok(())
}
