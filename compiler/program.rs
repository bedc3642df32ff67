//! A program is a set of rules split into the two sections of an
//! incremental program: a _base_ section anchored at time step 0,
//! grounded once, and a _step_ section parameterized by a step
//! variable, grounded again for every increment.

use std::fmt;

use tempo_syntax::Rule;

use crate::render::{cumulative_program, fixed_program};

/// A rule set, partitioned into base and step sections.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    base: Vec<Rule>,
    step: Vec<Rule>,
}

impl Program {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let (base, step) = rules.into_iter().partition(Self::is_base);
        Self { base, step }
    }

    /// A rule belongs to the base section iff its head is anchored at
    /// time step 0. Constraints and unanchored rules are step rules.
    pub fn is_base(rule: &Rule) -> bool {
        rule.head_time_step() == Some(0)
    }

    pub fn base(&self) -> &[Rule] {
        &self.base
    }

    pub fn step(&self) -> &[Rule] {
        &self.step
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.step.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render both sections, with `var` as the step variable.
    pub fn render(&self, var: &str) -> String {
        format!(
            "#program base.\n{}\n#program step({var}).\n{}\n",
            fixed_program(&self.base, Some(0)),
            cumulative_program(&self.step, var),
        )
    }

    /// Borrow the program for display with a particular step variable.
    pub fn display<'a>(&'a self, var: &'a str) -> impl fmt::Display + 'a {
        Sections { program: self, var }
    }
}

struct Sections<'a> {
    program: &'a Program,
    var: &'a str,
}

impl fmt::Display for Sections<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program.render(self.var))
    }
}
