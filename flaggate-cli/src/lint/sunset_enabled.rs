use std::collections::HashMap;

use flaggate_lib::LifecycleState;

use crate::flagset::Flagset;

use super::LintWarning;

pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let enabled: HashMap<&str, bool> = flagset
        .flags
        .iter()
        .map(|f| (f.id.as_str(), f.is_enabled))
        .collect();

    for record in &flagset.lifecycles {
        if record.state == LifecycleState::Sunset
            && enabled.get(record.flag_id.as_str()).copied() == Some(true)
        {
            warnings.push(LintWarning::warn(format!(
                "{}: flag is sunset but still enabled",
                record.flag_id
            )));
        }
    }
    warnings
}
