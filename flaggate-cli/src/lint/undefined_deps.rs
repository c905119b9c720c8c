use std::collections::HashSet;

use crate::flagset::Flagset;

use super::LintWarning;

pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let known_ids: HashSet<&str> = flagset.flags.iter().map(|f| f.id.as_str()).collect();
    for record in &flagset.lifecycles {
        for dep in &record.dependencies {
            if !known_ids.contains(dep.as_str()) {
                warnings.push(LintWarning::error(format!(
                    "{}: depends on unknown flag id '{}'",
                    record.id, dep
                )));
            }
        }
    }
    warnings
}
