//! Lifecycle governance state machine.
//!
//! The transition table and entry criteria are immutable static lookups, so
//! legality of a transition is a pure function of `(from, to)`. The GA
//! dependency gate lives with the service facade, which can reach the
//! lifecycle store; nothing here performs I/O.

use chrono::{DateTime, Utc};

use crate::error::FlagError;
use crate::model::{LifecycleRecord, LifecycleState, StateMeta};

/// Allowed transition targets per state. `SUNSET` is terminal.
pub fn allowed_targets(state: LifecycleState) -> &'static [LifecycleState] {
    use LifecycleState::*;
    match state {
        Development => &[Alpha],
        Alpha => &[Beta, Development],
        Beta => &[Ga, Alpha],
        Ga => &[Deprecated],
        Deprecated => &[Sunset],
        Sunset => &[],
    }
}

pub fn can_transition(from: LifecycleState, to: LifecycleState) -> bool {
    allowed_targets(from).contains(&to)
}

/// Human-readable entry criteria per stage, recorded on the record when the
/// stage is entered. `DEVELOPMENT` has none.
pub fn entry_criteria(state: LifecycleState) -> &'static [&'static str] {
    use LifecycleState::*;
    match state {
        Development => &[],
        Alpha => &[
            "Implementation complete behind the flag",
            "Unit tests cover the gated paths",
            "Flag owner assigned",
        ],
        Beta => &[
            "No critical defects open from alpha",
            "Monitoring and alerting in place",
            "Rollback procedure documented",
        ],
        Ga => &[
            "All dependency flags promoted to GA",
            "Performance validated at production traffic",
            "Documentation published",
        ],
        Deprecated => &[
            "Replacement or migration path announced",
            "Migration plan recorded",
        ],
        Sunset => &[
            "All callers migrated off the flag",
            "Flag references removed from code",
            "Cleanup strategy executed",
        ],
    }
}

/// Rejects a transition not present in the table.
pub fn validate_transition(from: LifecycleState, to: LifecycleState) -> Result<(), FlagError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(FlagError::validation(format!(
            "invalid lifecycle transition {from} -> {to}"
        )))
    }
}

/// Applies a validated transition: rewrites the state and resets the state
/// metadata to the new stage's entry criteria.
pub fn apply_transition(
    record: &mut LifecycleRecord,
    new_state: LifecycleState,
    approver: &str,
    now: DateTime<Utc>,
) {
    record.state = new_state;
    record.state_meta = StateMeta {
        entered_at: now,
        criteria: entry_criteria(new_state)
            .iter()
            .map(|c| c.to_string())
            .collect(),
        approved_by: Some(approver.to_string()),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use LifecycleState::*;
        assert!(can_transition(Development, Alpha));
        assert!(can_transition(Alpha, Beta));
        assert!(can_transition(Alpha, Development));
        assert!(can_transition(Beta, Ga));
        assert!(can_transition(Beta, Alpha));
        assert!(can_transition(Ga, Deprecated));
        assert!(can_transition(Deprecated, Sunset));

        // no skipping stages, no resurrection
        assert!(!can_transition(Development, Ga));
        assert!(!can_transition(Development, Beta));
        assert!(!can_transition(Beta, Development));
        assert!(!can_transition(Ga, Beta));
        assert!(!can_transition(Deprecated, Ga));
    }

    #[test]
    fn test_sunset_is_terminal() {
        use LifecycleState::*;
        assert!(allowed_targets(Sunset).is_empty());
        for target in [Development, Alpha, Beta, Ga, Deprecated, Sunset] {
            assert!(validate_transition(Sunset, target).is_err());
        }
    }

    #[test]
    fn test_validate_transition_error_names_states() {
        let err = validate_transition(LifecycleState::Development, LifecycleState::Ga).unwrap_err();
        assert_eq!(
            err,
            FlagError::Validation("invalid lifecycle transition DEVELOPMENT -> GA".into())
        );
    }

    #[test]
    fn test_entry_criteria_table() {
        assert!(entry_criteria(LifecycleState::Development).is_empty());
        for state in [
            LifecycleState::Alpha,
            LifecycleState::Beta,
            LifecycleState::Ga,
            LifecycleState::Deprecated,
            LifecycleState::Sunset,
        ] {
            assert!(!entry_criteria(state).is_empty());
        }
    }

    #[test]
    fn test_apply_transition_resets_state_meta() {
        let mut record = LifecycleRecord::new("lc-1", "f1", Utc::now());
        let now = Utc::now();
        apply_transition(&mut record, LifecycleState::Alpha, "dana", now);

        assert_eq!(record.state, LifecycleState::Alpha);
        assert_eq!(record.state_meta.entered_at, now);
        assert_eq!(record.state_meta.approved_by.as_deref(), Some("dana"));
        assert_eq!(
            record.state_meta.criteria,
            entry_criteria(LifecycleState::Alpha)
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
        );
    }
}
