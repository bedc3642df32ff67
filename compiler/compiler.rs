//! Compile time-indexed rule sets into incremental engine programs.
//!
//! Rules whose heads are anchored at time step 0 go into the `base`
//! section; everything else goes into a `step(var)` section that the
//! engine grounds once per increment of its step counter. Planning adds
//! a `check(var)` section with the goal, monitoring replays a fixed plan,
//! and diagnosis wraps a believed state in weighted soft choices.

mod diagnosis;
mod goal;
mod program;
mod render;

use tempo_syntax::{AnswerSet, Rule};
use tempo_tracer::*;

pub use diagnosis::{diagnosis_query, soft_state};
pub use goal::{monitor_query, plan_query, replay};
pub use program::Program;
pub use render::{
    cumulative_form, cumulative_program, fixed_form, fixed_program, goal_form, goal_program,
};

/// Compile the programs of every kind of query against one step variable.
#[derive(Clone, Debug)]
pub struct QueryCompiler {
    var: String,
    trace: Trace,
}

impl QueryCompiler {
    pub fn new(var: impl Into<String>, trace: Trace) -> Self {
        Self {
            var: var.into(),
            trace,
        }
    }

    /// The step variable.
    pub fn var(&self) -> &str {
        &self.var
    }

    /// Base and step sections for a rule set.
    pub fn program(&self, rules: impl IntoIterator<Item = Rule>) -> String {
        let program = Program::new(rules);
        self.traced("program", program.render(&self.var))
    }

    /// Every rule fixed at time step 0, without a step section.
    pub fn state(&self, rules: &[Rule]) -> String {
        self.traced("state", fixed_program(rules, Some(0)))
    }

    pub fn plan(&self, goal: &[Rule]) -> String {
        self.traced("plan", plan_query(goal, &self.var))
    }

    pub fn monitor(&self, goal: &[Rule], plan: &AnswerSet) -> String {
        self.traced("monitor", monitor_query(goal, plan, &self.var))
    }

    pub fn diagnosis(&self, state: &AnswerSet, plan: &AnswerSet, goal: &[Rule]) -> String {
        self.traced(
            "diagnosis",
            diagnosis_query(state, plan, goal, &self.var),
        )
    }

    fn traced(&self, kind: &str, text: String) -> String {
        trace!(self.trace, Compile, "Compiled {} query:\n{}", kind, text);
        text
    }
}
