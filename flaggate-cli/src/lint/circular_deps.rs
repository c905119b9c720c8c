use std::collections::{HashMap, HashSet};

use crate::flagset::Flagset;

use super::LintWarning;

pub fn check(flagset: &Flagset) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut deps_map: HashMap<&str, &Vec<String>> = HashMap::new();
    for record in &flagset.lifecycles {
        if !record.dependencies.is_empty() {
            deps_map.insert(record.flag_id.as_str(), &record.dependencies);
        }
    }

    let mut visited = HashSet::new();
    for flag_id in deps_map.keys() {
        if !visited.contains(*flag_id) {
            let mut stack = HashSet::new();
            if let Some(cycle) = detect_cycle(flag_id, &deps_map, &mut visited, &mut stack) {
                warnings.push(LintWarning::error(format!("circular dependency: {cycle}")));
            }
        }
    }
    warnings
}

fn detect_cycle(
    flag_id: &str,
    deps_map: &HashMap<&str, &Vec<String>>,
    visited: &mut HashSet<String>,
    stack: &mut HashSet<String>,
) -> Option<String> {
    visited.insert(flag_id.to_string());
    stack.insert(flag_id.to_string());

    if let Some(deps) = deps_map.get(flag_id) {
        for dep in deps.iter() {
            if stack.contains(dep.as_str()) {
                return Some(format!("{} -> {}", flag_id, dep));
            }
            if !visited.contains(dep.as_str()) {
                if let Some(cycle) = detect_cycle(dep.as_str(), deps_map, visited, stack) {
                    return Some(format!("{} -> {}", flag_id, cycle));
                }
            }
        }
    }

    stack.remove(flag_id);
    None
}
