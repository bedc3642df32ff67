//! Post-filters for plans. The engine bounds plan length only from
//! above and reports state alongside actions, so callers prune short
//! plans and project plans onto their actions after the fact.

use tempo_syntax::{ActionSet, AnswerSet};

/// Project every answer set onto its action fluents.
pub fn filter_actions(
    answers: impl IntoIterator<Item = AnswerSet>,
    actions: &ActionSet,
) -> Vec<AnswerSet> {
    answers
        .into_iter()
        .map(|answer| answer.actions(actions))
        .collect()
}

/// Drop the answer sets that end before time step `min`.
pub fn prune_shorter_than(
    answers: impl IntoIterator<Item = AnswerSet>,
    min: u32,
) -> Vec<AnswerSet> {
    answers
        .into_iter()
        .filter(|answer| answer.max_time_step() >= min)
        .collect()
}
