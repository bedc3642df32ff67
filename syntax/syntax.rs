//! Syntactic elements of time-indexed logic programs as exchanged
//! with an answer set solving engine: atoms, fluents (atoms tagged
//! with a time step), rules over fluents, and the answer sets the
//! engine reports back.

mod lexer;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Things that may go wrong reading or building syntactic elements.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    #[error("malformed atom `{0}`")]
    Atom(String),
    #[error("`{0}` has no trailing time step")]
    MissingTimeStep(String),
    #[error("head fluents disagree on their time step: {0:?} vs. {1:?}")]
    MixedHeadTimeSteps(Option<u32>, Option<u32>),
}

/// Uninterpreted element that names a predicate.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An _n_-ary predicate applied to a tuple of opaque argument terms.
/// Atoms compare by their text: the same predicate and argument strings.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom {
    pub predicate: Symbol,
    pub arguments: Vec<String>,
}

impl Atom {
    pub fn new(predicate: Symbol, arguments: impl IntoIterator<Item = String>) -> Self {
        Self {
            predicate,
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.predicate.name()
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Render with one extra trailing argument.
    fn fmt_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        extra: Option<&dyn fmt::Display>,
    ) -> fmt::Result {
        let Atom {
            predicate,
            arguments,
        } = self;
        match (arguments.is_empty(), extra) {
            (true, None) => fmt::Display::fmt(predicate, f),
            (true, Some(extra)) => f.write_fmt(format_args!("{predicate}({extra})")),
            (false, None) => f.write_fmt(format_args!("{predicate}({})", arguments.join(","))),
            (false, Some(extra)) => f.write_fmt(format_args!(
                "{predicate}({},{extra})",
                arguments.join(",")
            )),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, None)
    }
}

impl FromStr for Atom {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lexer::parse_atom(s.trim()).ok_or_else(|| SyntaxError::Atom(s.to_owned()))
    }
}

/// A time-indexed state or action proposition: an atom whose last
/// argument is its time step. The step may be unset, in which case
/// the fluent renders as the bare atom.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fluent {
    atom: Atom,
    step: Option<u32>,
}

impl Fluent {
    pub fn new(atom: Atom, step: Option<u32>) -> Self {
        Self { atom, step }
    }

    /// The atom without its time step.
    pub fn atom(&self) -> &Atom {
        &self.atom
    }

    pub fn name(&self) -> &str {
        self.atom.name()
    }

    pub fn time_step(&self) -> Option<u32> {
        self.step
    }

    /// A copy of this fluent at another time step.
    pub fn at(&self, step: u32) -> Self {
        Self::new(self.atom.clone(), Some(step))
    }

    /// Render with `step` (e.g., a numeral or a variable name) in place
    /// of this fluent's own time step.
    pub fn display_at<'a>(&'a self, step: &'a dyn fmt::Display) -> impl fmt::Display + 'a {
        FluentAt { fluent: self, step }
    }
}

struct FluentAt<'a> {
    fluent: &'a Fluent,
    step: &'a dyn fmt::Display,
}

impl fmt::Display for FluentAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fluent.atom.fmt_with(f, Some(self.step))
    }
}

impl fmt::Display for Fluent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            Some(step) => self.atom.fmt_with(f, Some(step as &dyn fmt::Display)),
            None => fmt::Display::fmt(&self.atom, f),
        }
    }
}

impl FromStr for Fluent {
    type Err = SyntaxError;

    /// Read a fluent from an engine token like `at(l3_414,2)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut atom = s.parse::<Atom>()?;
        let step = atom
            .arguments
            .last()
            .and_then(|last| last.parse::<u32>().ok())
            .ok_or_else(|| SyntaxError::MissingTimeStep(s.to_owned()))?;
        atom.arguments.pop();
        Ok(Self::new(atom, Some(step)))
    }
}

/// A disjunctive head and a conjunctive body of fluents. All head
/// fluents share one time step; [`Rule::new`] rejects rules that don't.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Rule {
    head: Vec<Fluent>,
    body: Vec<Fluent>,
}

impl Rule {
    pub fn new(
        head: impl IntoIterator<Item = Fluent>,
        body: impl IntoIterator<Item = Fluent>,
    ) -> Result<Self, SyntaxError> {
        let head = head.into_iter().collect::<Vec<_>>();
        if let Some(first) = head.first() {
            if let Some(other) = head.iter().find(|h| h.step != first.step) {
                return Err(SyntaxError::MixedHeadTimeSteps(first.step, other.step));
            }
        }
        Ok(Self {
            head,
            body: body.into_iter().collect(),
        })
    }

    /// A headless, bodiless rule.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single-fluent fact.
    pub fn fact(fluent: Fluent) -> Self {
        Self {
            head: vec![fluent],
            body: vec![],
        }
    }

    /// A headless rule, i.e., an integrity constraint.
    pub fn constraint(body: impl IntoIterator<Item = Fluent>) -> Self {
        Self {
            head: vec![],
            body: body.into_iter().collect(),
        }
    }

    pub fn head(&self) -> &[Fluent] {
        &self.head
    }

    pub fn body(&self) -> &[Fluent] {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.body.is_empty()
    }

    /// The time step shared by the head fluents, if any.
    pub fn head_time_step(&self) -> Option<u32> {
        self.head.first().and_then(Fluent::time_step)
    }
}

/// One stable model reported by the engine, in the order the engine
/// printed its atoms. The empty answer set means "no solution".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnswerSet(Vec<Fluent>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fluents(&self) -> &[Fluent] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fluent> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The latest time step among the fluents, or 0 if there are none.
    pub fn max_time_step(&self) -> u32 {
        self.iter().filter_map(Fluent::time_step).max().unwrap_or(0)
    }

    /// Keep only the action fluents, in their original order.
    pub fn actions(&self, actions: &ActionSet) -> Self {
        self.iter().filter(|f| actions.contains(f)).cloned().collect()
    }
}

impl FromIterator<Fluent> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Fluent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AnswerSet {
    type Item = Fluent;
    type IntoIter = std::vec::IntoIter<Fluent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{{{}}}",
            self.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

/// The predicates that denote actions rather than state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionSet(BTreeSet<Symbol>);

impl ActionSet {
    pub fn new(names: impl IntoIterator<Item = Symbol>) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn contains(&self, fluent: &Fluent) -> bool {
        self.0.contains(&fluent.atom.predicate)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ActionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Symbol::from))
    }
}

/// These constructor macros make tests involving fluents and rules much
/// more readable. They are *not* intended as a public interface, and
/// *should* be behind `#[cfg(test)]`, but [cargo can't currently export
/// test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(feature = "macros")]
mod macros {
    #[macro_export]
    macro_rules! atom {
        ($pred: ident $(($($arg: tt),*))?) => {
            $crate::Atom::new(
                $crate::Symbol::from(stringify!($pred)),
                [$($(String::from(stringify!($arg))),*)?],
            )
        };
    }

    #[macro_export]
    macro_rules! fluent {
        ($pred: ident $(($($arg: tt),*))? @ $step: expr) => {
            $crate::Fluent::new($crate::atom!($pred $(($($arg),*))?), Some($step))
        };
        ($pred: ident $(($($arg: tt),*))?) => {
            $crate::Fluent::new($crate::atom!($pred $(($($arg),*))?), None)
        };
    }

    #[macro_export]
    macro_rules! rule {
        ([$($head: expr),* $(,)?]) => {
            $crate::Rule::new([$($head),*], []).expect("malformed test rule")
        };
        ([$($head: expr),* $(,)?], [$($body: expr),* $(,)?]) => {
            $crate::Rule::new([$($head),*], [$($body),*]).expect("malformed test rule")
        };
    }

    #[macro_export]
    macro_rules! answer {
        ($($fluent: expr),* $(,)?) => {
            [$($fluent),*].into_iter().collect::<$crate::AnswerSet>()
        };
    }
}
