use flaggate_lib::Flag;

use super::LintWarning;

pub fn check(flag: &Flag) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    if flag.is_killswitch_enabled {
        warnings.push(LintWarning::warn(format!(
            "{}: kill switch is engaged, the flag is forced off",
            flag.key
        )));
    }
    warnings
}
