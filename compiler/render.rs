//! Render rules as engine program text. Each rule has three textual
//! forms, depending on where in an incremental program it lands:
//!
//! * The _fixed_ form pins every fluent to one time step (or to its
//!   own step if none is given); it anchors facts in the base section.
//! * The _cumulative_ form substitutes the step variable in the head
//!   and guards the rule with `var=N`, so one template serves every
//!   increment of the step section.
//! * The _goal_ form substitutes the step variable in the body and
//!   guards it with the `query(var)` external of the check section.

use tempo_syntax::{Fluent, Rule};

fn join<'a>(
    fluents: &'a [Fluent],
    render: impl Fn(&'a Fluent) -> String,
    separator: &str,
) -> String {
    fluents.iter().map(render).collect::<Vec<_>>().join(separator)
}

/// `h1 | h2:- b1, b2.` with every fluent at `step`.
/// An empty rule renders as nothing.
pub fn fixed_form(rule: &Rule, step: Option<u32>) -> String {
    if rule.is_empty() {
        return String::new();
    }
    let fluent = |f: &Fluent| match step {
        Some(step) => f.display_at(&step).to_string(),
        None => f.to_string(),
    };
    let mut text = join(rule.head(), fluent, " | ");
    if !rule.body().is_empty() {
        text.push_str(":- ");
        text.push_str(&join(rule.body(), fluent, ", "));
    }
    text.push_str(".\n");
    text
}

/// `h1(var) | h2(var):- b1, b2, var=N.` where `N` is the head's time step.
/// An empty rule renders as nothing.
pub fn cumulative_form(rule: &Rule, var: &str) -> String {
    if rule.is_empty() {
        return String::new();
    }
    let mut text = join(rule.head(), |f| f.display_at(&var).to_string(), " | ");
    text.push_str(":- ");
    text.push_str(&join(rule.body(), ToString::to_string, ", "));
    if !rule.head().is_empty() {
        if !rule.body().is_empty() {
            text.push_str(", ");
        }
        let step = rule
            .head()
            .iter()
            .filter_map(Fluent::time_step)
            .max()
            .unwrap_or(0);
        text.push_str(&format!("{var}={step}"));
    }
    text.push_str(".\n");
    text
}

/// `h1 | h2:- b1(var), b2(var), query(var).` Always terminated,
/// even when the rule is empty.
pub fn goal_form(rule: &Rule, var: &str) -> String {
    let mut text = join(rule.head(), ToString::to_string, " | ");
    if !rule.body().is_empty() {
        text.push_str(":- ");
        text.push_str(&join(rule.body(), |f| f.display_at(&var).to_string(), ", "));
        text.push_str(&format!(", query({var})"));
    }
    text.push_str(".\n");
    text
}

/// Concatenate the fixed forms of some rules.
pub fn fixed_program<'a>(rules: impl IntoIterator<Item = &'a Rule>, step: Option<u32>) -> String {
    rules.into_iter().map(|r| fixed_form(r, step)).collect()
}

/// Concatenate the cumulative forms of some rules.
pub fn cumulative_program<'a>(rules: impl IntoIterator<Item = &'a Rule>, var: &str) -> String {
    rules.into_iter().map(|r| cumulative_form(r, var)).collect()
}

/// Concatenate the goal forms of some rules.
pub fn goal_program<'a>(rules: impl IntoIterator<Item = &'a Rule>, var: &str) -> String {
    rules.into_iter().map(|r| goal_form(r, var)).collect()
}
