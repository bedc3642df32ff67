//! Minimum-cost repair of a believed state.
//!
//! Every fluent of the current state becomes optional (a cardinality
//! choice `0{f}1`) and costs 1 when kept (a weak constraint). Together
//! with a replay of the committed plan and its goal, the cheapest model
//! keeps as little of the state as is needed to explain the outcome.

use tempo_syntax::{AnswerSet, Rule};

use crate::goal::monitor_query;

/// Soft choices and penalties over the fluents of `state`.
pub fn soft_state(state: &AnswerSet) -> String {
    let choices = state
        .iter()
        .map(|f| format!("0{{{f}}}1.\n"))
        .collect::<String>();
    let penalties = state
        .iter()
        .map(|f| format!(":~ {f}. [1,{f}]\n"))
        .collect::<String>();
    format!("#program base.\n{choices}{penalties}")
}

/// The soft state followed by a replay of `plan` against `goal`.
pub fn diagnosis_query(state: &AnswerSet, plan: &AnswerSet, goal: &[Rule], var: &str) -> String {
    format!(
        "{}\n{}\n",
        soft_state(state),
        monitor_query(goal, plan, var)
    )
}
