use std::collections::HashMap;

use flaggate_lib::{LifecycleRecord, LifecycleState};

use crate::flagset::Flagset;

use super::LintWarning;

/// A record already in GA whose dependency is not GA means the gate was
/// bypassed somewhere (hand-edited file, defective writer). Flag it loudly.
pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let by_flag_id: HashMap<&str, &LifecycleRecord> = flagset
        .lifecycles
        .iter()
        .map(|r| (r.flag_id.as_str(), r))
        .collect();

    for record in &flagset.lifecycles {
        if record.state != LifecycleState::Ga {
            continue;
        }
        for dep in &record.dependencies {
            let dep_state = by_flag_id.get(dep.as_str()).map(|r| r.state);
            if dep_state != Some(LifecycleState::Ga) {
                warnings.push(LintWarning::error(format!(
                    "{}: is GA but dependency flag '{}' is not",
                    record.id, dep
                )));
            }
        }
    }
    warnings
}
