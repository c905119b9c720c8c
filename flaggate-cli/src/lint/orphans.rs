use std::collections::HashSet;

use crate::flagset::Flagset;

use super::LintWarning;

/// Flags and lifecycle records are one-to-one; either side missing its
/// counterpart points at a botched edit.
pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let flag_ids: HashSet<&str> = flagset.flags.iter().map(|f| f.id.as_str()).collect();
    let tracked_ids: HashSet<&str> = flagset
        .lifecycles
        .iter()
        .map(|r| r.flag_id.as_str())
        .collect();

    for flag in &flagset.flags {
        if !tracked_ids.contains(flag.id.as_str()) {
            warnings.push(LintWarning::warn(format!(
                "{}: flag has no lifecycle record",
                flag.key
            )));
        }
    }
    for record in &flagset.lifecycles {
        if !flag_ids.contains(record.flag_id.as_str()) {
            warnings.push(LintWarning::warn(format!(
                "{}: lifecycle record points at unknown flag id '{}'",
                record.id, record.flag_id
            )));
        }
    }
    warnings
}
