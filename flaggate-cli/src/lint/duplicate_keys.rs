use std::collections::HashSet;

use crate::flagset::Flagset;

use super::LintWarning;

pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut seen_keys = HashSet::new();
    let mut seen_ids = HashSet::new();
    for flag in &flagset.flags {
        if !seen_keys.insert(flag.key.as_str()) {
            warnings.push(LintWarning::error(format!(
                "flag key '{}' is defined more than once",
                flag.key
            )));
        }
        if !seen_ids.insert(flag.id.as_str()) {
            warnings.push(LintWarning::error(format!(
                "flag id '{}' is defined more than once",
                flag.id
            )));
        }
    }
    warnings
}
