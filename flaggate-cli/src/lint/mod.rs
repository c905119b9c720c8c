mod circular_deps;
mod duplicate_keys;
mod ga_dependencies;
mod killswitch_on;
mod orphans;
mod rollout_range;
mod sunset_enabled;
mod undefined_deps;

use std::io::{self, IsTerminal};

use crate::flagset::Flagset;

#[derive(Debug)]
pub enum LintLevel {
    Warning,
    Error,
}

#[derive(Debug)]
pub struct LintWarning {
    pub level: LintLevel,
    pub message: String,
}

impl LintWarning {
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: LintLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LintLevel::Error,
            message: message.into(),
        }
    }
}

/// Runs every lint over the flagset. Ok(()) when nothing was flagged.
pub fn run_lint_inner(path: &str, flagset: &Flagset) -> Result<(), ()> {
    let use_color = io::stderr().is_terminal();
    let warn_icon = if use_color {
        "\x1b[33m\u{26a0}\x1b[0m"
    } else {
        "\u{26a0}"
    };
    let error_icon = if use_color {
        "\x1b[31m\u{26a0}\x1b[0m"
    } else {
        "\u{26a0}"
    };

    let mut warnings: Vec<LintWarning> = Vec::new();

    // Global lints
    warnings.extend(duplicate_keys::check(flagset));
    warnings.extend(undefined_deps::check(flagset));
    warnings.extend(circular_deps::check(flagset));
    warnings.extend(ga_dependencies::check(flagset));
    warnings.extend(sunset_enabled::check(flagset));
    warnings.extend(orphans::check(flagset));

    // Per-flag lints
    for flag in &flagset.flags {
        warnings.extend(rollout_range::check(flag));
        warnings.extend(killswitch_on::check(flag));
    }

    if warnings.is_empty() {
        println!("{path} ok, no warnings");
        Ok(())
    } else {
        for w in &warnings {
            let icon = match w.level {
                LintLevel::Warning => warn_icon,
                LintLevel::Error => error_icon,
            };
            eprintln!("{} {}", icon, w.message);
        }
        eprintln!();
        eprintln!("{} warnings found", warnings.len());
        Err(())
    }
}
