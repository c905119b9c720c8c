mod flagset;
mod lint;

use std::collections::HashMap;
use std::process;

use clap::{Parser, Subcommand};
use flaggate_lib::lifecycle::entry_criteria;
use flaggate_lib::parse::parse_context;
use flaggate_lib::{LifecycleRecord, LifecycleState, LifecycleStore};

use crate::flagset::Flagset;

#[derive(Parser, Debug)]
#[command(name = "flaggate")]
#[command(version)]
#[command(about = "Feature flag evaluation and lifecycle governance", long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a demo flagset file
    Init {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,
    },
    /// List flags with their lifecycle state
    List {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,

        /// Show flag display names
        #[arg(short = 'd', long = "description")]
        description: bool,
    },
    /// Check the flagset against the model's structural invariants
    Validate {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,
    },
    /// Run governance lints over flags and lifecycle records
    Lint {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,
    },
    /// Run validate and lint together
    Check {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,
    },
    /// Evaluate a flag against a context
    Eval {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,

        /// Flag key to evaluate (e.g. new-checkout)
        key: String,

        /// Context key=value pairs (e.g. userId=alice country=NL age=30)
        context: Vec<String>,
    },
    /// Move a lifecycle record to a new maturity stage
    Transition {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,

        /// Lifecycle record id
        lifecycle_id: String,

        /// Target state (DEVELOPMENT, ALPHA, BETA, GA, DEPRECATED, SUNSET)
        state: String,

        /// Who approved the transition
        #[arg(short = 'a', long = "approver")]
        approver: String,
    },
    /// Add a dependency edge from a lifecycle record to another flag
    Depend {
        /// Path to the flagset file
        #[arg(short = 'f', long = "flagset", default_value = "flagset.json")]
        flagset: String,

        /// Lifecycle record id
        lifecycle_id: String,

        /// Flag id the record should depend on
        flag_id: String,
    },
    /// Print the entry criteria for a lifecycle stage
    Criteria {
        /// Lifecycle state (DEVELOPMENT, ALPHA, BETA, GA, DEPRECATED, SUNSET)
        state: String,
    },
}

fn main() {
    let args = Args::parse();
    match args.cmd {
        Command::Init { flagset } => run_init(&flagset),
        Command::List {
            flagset,
            description,
        } => run_list(&flagset, description),
        Command::Validate { flagset } => {
            let set = load_or_exit(&flagset);
            if run_validate_inner(&flagset, &set).is_err() {
                process::exit(1);
            }
        }
        Command::Lint { flagset } => {
            let set = load_or_exit(&flagset);
            if lint::run_lint_inner(&flagset, &set).is_err() {
                process::exit(1);
            }
        }
        Command::Check { flagset } => {
            let set = load_or_exit(&flagset);
            let validate = run_validate_inner(&flagset, &set);
            let lint = lint::run_lint_inner(&flagset, &set);
            if validate.is_err() || lint.is_err() {
                process::exit(1);
            }
        }
        Command::Eval {
            flagset,
            key,
            context,
        } => run_eval(&flagset, &key, &context),
        Command::Transition {
            flagset,
            lifecycle_id,
            state,
            approver,
        } => run_transition(&flagset, &lifecycle_id, &state, &approver),
        Command::Depend {
            flagset,
            lifecycle_id,
            flag_id,
        } => run_depend(&flagset, &lifecycle_id, &flag_id),
        Command::Criteria { state } => run_criteria(&state),
    }
}

fn load_or_exit(path: &str) -> Flagset {
    match Flagset::load(path) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn run_init(path: &str) {
    if std::path::Path::new(path).exists() {
        eprintln!("{path} already exists, not overwriting");
        process::exit(1);
    }
    if let Err(e) = Flagset::demo().save(path) {
        eprintln!("{e}");
        process::exit(1);
    }
    println!("created {path}");
}

fn run_list(path: &str, description: bool) {
    let set = load_or_exit(path);
    let states: HashMap<&str, &LifecycleRecord> = set
        .lifecycles
        .iter()
        .map(|r| (r.flag_id.as_str(), r))
        .collect();

    for flag in &set.flags {
        let state = states
            .get(flag.id.as_str())
            .map(|r| r.state.to_string())
            .unwrap_or_else(|| "-".to_string());
        let runtime = if flag.is_killswitch_enabled {
            "killed"
        } else if flag.is_enabled {
            "on"
        } else {
            "off"
        };
        if description {
            println!(
                "{:<30} {:<12} {:<7} {:>3}%  {}",
                flag.key, state, runtime, flag.rollout_percentage, flag.name
            );
        } else {
            println!(
                "{:<30} {:<12} {:<7} {:>3}%",
                flag.key, state, runtime, flag.rollout_percentage
            );
        }
    }
}

fn run_validate_inner(path: &str, set: &Flagset) -> Result<(), ()> {
    let mut errors = 0;
    for flag in &set.flags {
        if let Err(e) = flag.validate() {
            eprintln!("{e}");
            errors += 1;
        }
    }
    if errors == 0 {
        println!(
            "{path} is valid ({} flags, {} lifecycle records)",
            set.flags.len(),
            set.lifecycles.len()
        );
        Ok(())
    } else {
        eprintln!();
        eprintln!("{errors} validation errors found");
        Err(())
    }
}

fn run_eval(path: &str, key: &str, pairs: &[String]) {
    let set = load_or_exit(path);
    let context = match parse_context(pairs) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let service = set.into_service();
    println!("{}", service.evaluate(key, &context));
}

fn run_transition(path: &str, lifecycle_id: &str, state: &str, approver: &str) {
    let new_state: LifecycleState = match state.parse() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let service = load_or_exit(path).into_service();
    let old_state = service
        .lifecycles()
        .find_by_id(lifecycle_id)
        .map(|r| r.state);

    match service.transition_state(lifecycle_id, new_state, approver) {
        Ok(record) => {
            if let Err(e) = Flagset::from_service(&service).save(path) {
                eprintln!("{e}");
                process::exit(1);
            }
            let old = old_state.expect("record existed for a successful transition");
            println!("{}: {} -> {}", record.id, old, record.state);
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn run_depend(path: &str, lifecycle_id: &str, flag_id: &str) {
    let service = load_or_exit(path).into_service();
    match service.add_dependency(lifecycle_id, flag_id) {
        Ok(record) => {
            if let Err(e) = Flagset::from_service(&service).save(path) {
                eprintln!("{e}");
                process::exit(1);
            }
            println!(
                "{}: depends on [{}]",
                record.id,
                record.dependencies.join(", ")
            );
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn run_criteria(state: &str) {
    let state: LifecycleState = match state.parse() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let criteria = entry_criteria(state);
    if criteria.is_empty() {
        println!("{state}: no entry criteria");
        return;
    }
    println!("{state}:");
    for criterion in criteria {
        println!("  - {criterion}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flaggate_lib::AttrValue;

    #[test]
    fn test_demo_flagset_is_valid_and_clean() {
        let set = Flagset::demo();
        assert!(run_validate_inner("demo", &set).is_ok());
        for flag in &set.flags {
            assert!(flag.validate().is_ok());
        }
        assert_eq!(set.flags.len(), set.lifecycles.len());
    }

    #[test]
    fn test_demo_flagset_roundtrips_through_json() {
        let set = Flagset::demo();
        let json = serde_json::to_string(&set).unwrap();
        let restored: Flagset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.flags, set.flags);
        assert_eq!(restored.lifecycles, set.lifecycles);
    }

    #[test]
    fn test_demo_flag_evaluates_for_targeted_user() {
        let service = Flagset::demo().into_service();
        // the demo flag targets country=NL at 25% rollout
        let context = flaggate_lib::parse::parse_context(&["userId=bob", "country=NL"]).unwrap();
        assert_eq!(
            context.get("country"),
            Some(&AttrValue::String("NL".into()))
        );
        // hash("bob") % 100 == 28, outside the 25% rollout
        assert!(!service.evaluate("new-checkout", &context));
    }
}
