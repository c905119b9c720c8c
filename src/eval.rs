//! Targeting rule evaluator and flag evaluation engine.
//!
//! Everything in this module is pure and read-only: evaluation never
//! mutates the flag snapshot, never performs I/O, and never fails for a
//! malformed context. A missing or mistyped context field degrades to the
//! "not matched" branch so a corrupt request can never accidentally enable
//! a feature.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::hash::{group_index, percentile};
use crate::model::{AttrValue, Flag, RuleOperator, TargetingRule};

pub type Context = HashMap<String, AttrValue>;

/// The context attribute used for rollout and experiment bucketing.
pub const USER_ID_ATTR: &str = "userId";

/// Evaluates a single rule against the context. Fail-closed: an absent
/// attribute, a non-string operand under a substring operator, or an
/// unordered pair under an ordering operator all evaluate to `false`.
pub fn evaluate_rule(rule: &TargetingRule, context: &Context) -> bool {
    let Some(context_val) = context.get(&rule.attribute) else {
        return false;
    };
    match rule.operator {
        RuleOperator::Equals => context_val == &rule.value,
        RuleOperator::Contains | RuleOperator::StartsWith | RuleOperator::EndsWith => {
            let (AttrValue::String(haystack), AttrValue::String(needle)) =
                (context_val, &rule.value)
            else {
                return false;
            };
            match rule.operator {
                RuleOperator::Contains => haystack.contains(needle.as_str()),
                RuleOperator::StartsWith => haystack.starts_with(needle.as_str()),
                RuleOperator::EndsWith => haystack.ends_with(needle.as_str()),
                _ => unreachable!(),
            }
        }
        RuleOperator::GreaterThan => {
            matches!(context_val.partial_cmp(&rule.value), Some(Ordering::Greater))
        }
        RuleOperator::LessThan => {
            matches!(context_val.partial_cmp(&rule.value), Some(Ordering::Less))
        }
    }
}

/// Logical AND over every rule. An empty rule list is vacuously true.
pub fn evaluate_all_rules(rules: &[TargetingRule], context: &Context) -> bool {
    rules.iter().all(|rule| evaluate_rule(rule, context))
}

/// Decides enabled/disabled for one flag snapshot and one request context.
///
/// Order of checks, short-circuiting:
/// 1. disabled flag or engaged kill switch → `false` (the kill switch wins
///    over every other setting)
/// 2. targeting rules, ANDed
/// 3. percentage rollout: the user's percentile must fall below the rollout
///    percentage; 100 skips the check entirely, 0 excludes everyone
/// 4. experiment groups: the user's deterministic group decides
/// 5. otherwise enabled
pub fn evaluate_flag(flag: &Flag, context: &Context) -> bool {
    if !flag.is_enabled || flag.is_killswitch_enabled {
        return false;
    }

    if !evaluate_all_rules(&flag.targeting_rules, context) {
        return false;
    }

    if flag.rollout_percentage < 100 {
        let user_id = bucket_key(context);
        if percentile(&user_id) >= u32::from(flag.rollout_percentage) {
            return false;
        }
    }

    if !flag.experiment_groups.is_empty() {
        let user_id = bucket_key(context);
        let idx = group_index(&user_id, flag.experiment_groups.len());
        return flag.experiment_groups[idx].is_enabled;
    }

    true
}

/// Stringified bucketing key: the `userId` context attribute, or the empty
/// string for anonymous requests (which hashes to percentile 0).
fn bucket_key(context: &Context) -> String {
    match context.get(USER_ID_ATTR) {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}
