//! Drive an external answer set solving engine: stage its inputs,
//! run it over a range of increments, and read its answers back.
//!
//! The engine boundary is a request/response contract ([`Engine`]):
//! a request carries program text, iteration bounds, and an answer
//! count; the response is the engine's captured output. Reading that
//! output into answer sets is independent of how it was produced.

mod engine;
mod filter;
mod output;
mod stage;

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub use engine::{ClingoEngine, CommandLine, Engine, EngineConfig, SolveRequest, Transcript};
pub use filter::{filter_actions, prune_shorter_than};
pub use output::{
    events, read_answer_sets, read_atom_groups, read_optimal_answer_set, Event, OnUnsatisfiable,
    Optimize,
};
pub use stage::{QueryDirectory, Stage, StagedDirectory};

/// Things that may go wrong running the engine. An unsatisfiable
/// program is not one of them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unable to stage the query directory")]
    Stage(#[source] io::Error),
    #[error("unable to write program {}", .path.display())]
    WriteProgram {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` failed ({status})")]
    Failed { command: String, status: ExitStatus },
    #[error("unable to capture engine output in {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
