// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use tracing::trace;

/// One precedence rule: yields a status when it applies to the input.
///
/// Rules are kept in ordered slices and evaluated with [`first_match`], so the precedence of a
/// resolver is the order of its rule list.
pub struct Rule<I, S> {
    pub name: &'static str,
    pub apply: fn(&I) -> Option<S>,
}

impl<I, S> Rule<I, S> {
    pub fn evaluate(&self, input: &I) -> Option<S> {
        (self.apply)(input)
    }
}

/// Returns the name and status of the first rule that applies, if any.
pub fn first_match<I, S>(rules: &[Rule<I, S>], input: &I) -> Option<(&'static str, S)> {
    rules.iter().find_map(|rule| {
        let status = rule.evaluate(input)?;
        trace!("rule {} matched", rule.name);
        Some((rule.name, status))
    })
}

/// Like [`first_match`] but falls back to `default` when no rule applies.
pub fn resolve_with<I, S>(rules: &[Rule<I, S>], input: &I, default: S) -> S {
    match first_match(rules, input) {
        Some((_, status)) => status,
        None => default,
    }
}
