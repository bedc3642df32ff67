//! Read the engine's captured output.
//!
//! The output interleaves status lines with answer blocks. An answer
//! block is introduced by one or more header lines mentioning `Answer`
//! and carried by the next line: whitespace-separated atoms. Blocks may
//! be followed by an `Optimization: <cost>` line. A run that was cut
//! short reports `INTERRUPTED : 1`, and its last answer is unusable.
//!
//! Each answer block is parsed independently into a tagged result, so
//! one malformed block is dropped without disturbing the others.

use std::str::Lines;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use tempo_syntax::{AnswerSet, Atom, Fluent, SyntaxError};
use tempo_tracer::*;

/// What a reading does with answers already found when the engine
/// reports `UNSATISFIABLE`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OnUnsatisfiable {
    /// Report no answers at all.
    #[default]
    DiscardFound,

    /// Stop reading, but keep what was found.
    KeepFound,
}

/// The direction of optimization when picking one answer by cost.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Optimize {
    Minimize,
    Maximize,
}

impl Optimize {
    pub fn new(minimum: bool) -> Self {
        if minimum {
            Self::Minimize
        } else {
            Self::Maximize
        }
    }

    /// Is `cost` strictly better than the best so far?
    fn improves(self, cost: i64, best: Option<i64>) -> bool {
        match (self, best) {
            (_, None) => true,
            (Self::Minimize, Some(best)) => cost < best,
            (Self::Maximize, Some(best)) => cost > best,
        }
    }
}

/// A meaningful line (or pair of lines) of engine output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event<'a> {
    Unsatisfiable,
    Unknown,
    Interrupted,

    /// The content line of an answer block.
    Answer(&'a str),
    Optimization(i64),
}

/// Iterate over the events of some engine output.
pub fn events(text: &str) -> Events<'_> {
    Events {
        lines: text.lines(),
    }
}

pub struct Events<'a> {
    lines: Lines<'a>,
}

impl<'a> Events<'a> {
    fn next_line(&mut self) -> &'a str {
        self.lines.next().unwrap_or_default().trim_end()
    }
}

impl<'a> Iterator for Events<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?.trim_end();
            if line == "UNSATISFIABLE" {
                return Some(Event::Unsatisfiable);
            } else if line == "UNKNOWN" {
                return Some(Event::Unknown);
            } else if line.contains("INTERRUPTED : 1") {
                return Some(Event::Interrupted);
            } else if line.contains("Answer") {
                let mut content = self.next_line();
                while content.contains("Answer") {
                    content = self.next_line();
                }
                return Some(Event::Answer(content));
            } else if let Ok((_, cost)) = optimization(line) {
                return Some(Event::Optimization(cost));
            }
        }
    }
}

/// The first cost of an `Optimization: ` line.
fn optimization(line: &str) -> IResult<&str, i64> {
    preceded(
        pair(take_until("Optimization: "), tag("Optimization: ")),
        map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>),
    )(line)
}

fn parse_answer(content: &str) -> Result<AnswerSet, SyntaxError> {
    content.split_whitespace().map(str::parse::<Fluent>).collect()
}

fn parse_atoms(content: &str) -> Result<Vec<Atom>, SyntaxError> {
    content.split_whitespace().map(str::parse::<Atom>).collect()
}

/// Fold parsed answer blocks into a sequence, dropping malformed ones
/// and the last one of an interrupted run.
fn read_blocks<T>(
    text: &str,
    on_unsatisfiable: OnUnsatisfiable,
    parse: impl Fn(&str) -> Result<T, SyntaxError>,
    trace: Trace,
) -> Vec<T> {
    let mut answers = Vec::new();
    let mut interrupted = false;
    for event in events(text) {
        match event {
            Event::Unsatisfiable => match on_unsatisfiable {
                OnUnsatisfiable::DiscardFound => return Vec::new(),
                OnUnsatisfiable::KeepFound => break,
            },
            Event::Interrupted => interrupted = true,
            Event::Answer(content) => match parse(content) {
                Ok(answer) => answers.push(answer),
                Err(error) => trace!(trace, Parse, "Dropping answer: {}", error),
            },
            Event::Unknown | Event::Optimization(_) => (),
        }
    }
    if interrupted && answers.pop().is_some() {
        trace!(trace, Parse, "Run interrupted; dropped its last answer");
    }
    answers
}

/// Read every answer set, in the order the engine found them.
pub fn read_answer_sets(
    text: &str,
    on_unsatisfiable: OnUnsatisfiable,
    trace: Trace,
) -> Vec<AnswerSet> {
    read_blocks(text, on_unsatisfiable, parse_answer, trace)
}

/// Read every answer as a group of atoms, without asking for time steps.
pub fn read_atom_groups(
    text: &str,
    on_unsatisfiable: OnUnsatisfiable,
    trace: Trace,
) -> Vec<Vec<Atom>> {
    read_blocks(text, on_unsatisfiable, parse_atoms, trace)
}

/// Read the answer set with the best cost, or the empty answer set if
/// there is none. `UNSATISFIABLE` and `UNKNOWN` end the reading with
/// whatever was best so far.
pub fn read_optimal_answer_set(text: &str, optimize: Optimize, trace: Trace) -> AnswerSet {
    let mut best: Option<(i64, AnswerSet)> = None;
    let mut current = None;
    for event in events(text) {
        match event {
            Event::Unsatisfiable | Event::Unknown => break,
            Event::Answer(content) => {
                current = parse_answer(content)
                    .map_err(|error| trace!(trace, Parse, "Dropping answer: {}", error))
                    .ok();
            }
            Event::Optimization(cost) => {
                if let Some(answer) = current.take() {
                    if optimize.improves(cost, best.as_ref().map(|(cost, _)| *cost)) {
                        trace!(trace, Parse, "New best cost {}: {}", cost, answer);
                        best = Some((cost, answer));
                    }
                }
            }
            Event::Interrupted => (),
        }
    }
    best.map(|(_, answer)| answer).unwrap_or_default()
}
