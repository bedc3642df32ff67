//! Goal checks for planning, and plan replay for monitoring.
//!
//! A plan query adds a `check` section whose goal rules only fire at
//! the step where the engine sets the `query` external, so the engine
//! looks for the shortest horizon that satisfies the goal. A monitor
//! query additionally pins a candidate plan's actions to their steps,
//! so the engine only has to check that the fixed sequence works.

use tempo_syntax::{AnswerSet, Rule};

use crate::render::{cumulative_program, goal_program};

/// The check section asserting `goal` at step `var`.
pub fn plan_query(goal: &[Rule], var: &str) -> String {
    format!(
        "#program check({var}).\n#external query({var}).\n{}\n",
        goal_program(goal, var)
    )
}

/// One fact per action of `plan`, the _i_-th action at step _i_
/// (counting from 1).
pub fn replay(plan: &AnswerSet) -> Vec<Rule> {
    plan.iter()
        .zip(1..)
        .map(|(action, step)| Rule::fact(action.at(step)))
        .collect()
}

/// The plan query for `goal`, followed by a step section replaying `plan`.
pub fn monitor_query(goal: &[Rule], plan: &AnswerSet, var: &str) -> String {
    format!(
        "{}#program step({var}).\n{}",
        plan_query(goal, var),
        cumulative_program(&replay(plan), var)
    )
}
