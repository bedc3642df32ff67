//! Run an incremental program through the engine and print its answers.
//!
//! Usage: `tempo [FILE|-] [STEP]`. The program is read from `FILE`, or
//! from standard input if it is absent or `-`, and solved up to `STEP`
//! (default 0). The environment supplies the rest of the configuration:
//!
//! - `TEMPO_ENGINE`: the engine executable (default `clingo`)
//! - `TEMPO_MAX_TIME`: seconds before the engine is stopped (default unlimited)
//! - `TEMPO_TIMEOUT`: `1` or `true` if a `timeout` utility is available
//! - `TEMPO_WORKDIR`: where queries are staged
//! - `TEMPO_TRACE`: comma-separated trace levels, e.g. `invoke,parse`

use std::env::{self, args};
use std::fs::read_to_string;
use std::io::{stdin, Read};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use atty::Stream;

use tempo_reasoner::{Config, Reasoner};
use tempo_syntax::Atom;
use tempo_tracer::Trace;

fn main() -> Result<()> {
    let mut args = args().skip(1);
    let filename = args.next();
    let step = match args.next() {
        None => 0,
        Some(step) => step
            .parse::<u32>()
            .with_context(|| format!("Invalid step {step}"))?,
    };
    if filename.is_none() && atty::is(Stream::Stdin) && atty::is(Stream::Stdout) {
        println!("Welcome to Tempo! Please enter your program, terminated with Ctrl-D.");
    }
    let input = read_file(filename.as_deref())?;

    let trace = match env::var("TEMPO_TRACE") {
        Ok(names) => Trace::from_names(&names),
        Err(_) => Trace::none(),
    };
    let reasoner = Reasoner::new(config()?, trace);
    let answers = reasoner.query(&input, step)?;
    if answers.is_empty() {
        println!("UNSATISFIABLE");
    }
    for answer in answers {
        println!("{}", format_answer(&answer));
    }
    Ok(())
}

/// Build a configuration from the environment.
fn config() -> Result<Config> {
    let mut config = Config::default();
    if let Ok(engine) = env::var("TEMPO_ENGINE") {
        config.engine.executable = PathBuf::from(engine);
    }
    if let Ok(seconds) = env::var("TEMPO_MAX_TIME") {
        config.engine.max_time = seconds
            .parse()
            .with_context(|| format!("Invalid TEMPO_MAX_TIME {seconds}"))?;
    }
    if let Ok(flag) = env::var("TEMPO_TIMEOUT") {
        config.engine.timeout_available = matches!(flag.as_str(), "1" | "true");
    }
    if let Ok(dir) = env::var("TEMPO_WORKDIR") {
        config.working_directory = PathBuf::from(dir);
    }
    Ok(config)
}

fn format_answer(answer: &[Atom]) -> String {
    let atoms = answer.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("{{{}}}", atoms.join(" "))
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None | Some("-") => {
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}
