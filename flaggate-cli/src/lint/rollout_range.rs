use flaggate_lib::Flag;

use super::LintWarning;

pub fn check(flag: &Flag) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    if flag.rollout_percentage > 100 {
        warnings.push(LintWarning::error(format!(
            "{}: rolloutPercentage {} is out of valid range (0-100)",
            flag.key, flag.rollout_percentage
        )));
    }
    for rule in &flag.targeting_rules {
        if let Err(e) = rule.validate() {
            warnings.push(LintWarning::error(format!("{}: {}", flag.key, e)));
        }
    }
    warnings
}
