//! Feature flag evaluation and lifecycle governance.
//!
//! The evaluation half is pure and read-only: given a flag snapshot and a
//! request context it deterministically decides enabled/disabled using kill
//! switches, targeting rules, percentage rollout and experiment-group
//! bucketing. The governance half is a state machine over a flag's maturity
//! stage with a cycle-free dependency graph gating promotion to GA. Both
//! talk to storage through the repository traits in [`store`].

use chrono::Utc;

pub mod error;
pub mod eval;
pub mod graph;
pub mod hash;
pub mod lifecycle;
pub mod model;
pub mod parse;
pub mod store;

pub use error::FlagError;
pub use eval::{evaluate_all_rules, evaluate_flag, evaluate_rule, Context, USER_ID_ATTR};
pub use model::{
    AttrValue, ExperimentGroup, Flag, LifecycleRecord, LifecycleState, RuleOperator, StateMeta,
    TargetingRule,
};
pub use store::{FlagStore, InMemoryFlagStore, InMemoryLifecycleStore, LifecycleStore};

/// Facade over the flag and lifecycle repositories.
///
/// Evaluation is stateless and safe for unbounded concurrent use. The
/// mutating operations are read-modify-write against the lifecycle store
/// and must be serialized per record by the caller (see [`store`]).
///
/// # Examples
/// ```
/// use flaggate_lib::{Flag, FlagService, InMemoryFlagStore, InMemoryLifecycleStore};
///
/// let service = FlagService::new(InMemoryFlagStore::new(), InMemoryLifecycleStore::new());
/// service
///     .create_flag(Flag::new("f-1", "new-checkout", "New checkout"))
///     .unwrap();
///
/// // freshly created flags start disabled
/// assert!(!service.evaluate("new-checkout", &Default::default()));
/// ```
pub struct FlagService<F: FlagStore, L: LifecycleStore> {
    flags: F,
    lifecycles: L,
}

impl<F: FlagStore, L: LifecycleStore> FlagService<F, L> {
    pub fn new(flags: F, lifecycles: L) -> Self {
        Self { flags, lifecycles }
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    pub fn lifecycles(&self) -> &L {
        &self.lifecycles
    }

    /// Evaluates a flag by key against the given context. An unknown key is
    /// simply off — evaluation never errors.
    pub fn evaluate(&self, key: &str, context: &Context) -> bool {
        match self.flags.find_by_key(key) {
            Some(flag) => evaluate_flag(&flag, context),
            None => false,
        }
    }

    /// Moves a lifecycle record to a new maturity stage.
    ///
    /// Rejects transitions outside the state machine's table, and GA
    /// promotions while any dependency's lifecycle is missing or not yet
    /// GA. On success the record is written back with refreshed state
    /// metadata.
    pub fn transition_state(
        &self,
        lifecycle_id: &str,
        new_state: LifecycleState,
        approver: &str,
    ) -> Result<LifecycleRecord, FlagError> {
        let mut record = self
            .lifecycles
            .find_by_id(lifecycle_id)
            .ok_or_else(|| FlagError::not_found(format!("lifecycle record {lifecycle_id}")))?;

        lifecycle::validate_transition(record.state, new_state)?;

        if new_state == LifecycleState::Ga {
            for dep_flag_id in &record.dependencies {
                match self.lifecycles.find_by_flag_id(dep_flag_id) {
                    Some(dep) if dep.state == LifecycleState::Ga => {}
                    _ => {
                        return Err(FlagError::validation(format!(
                            "cannot promote to GA: dependency flag {dep_flag_id} is not GA"
                        )))
                    }
                }
            }
        }

        lifecycle::apply_transition(&mut record, new_state, approver, Utc::now());
        Ok(self.lifecycles.save(record))
    }

    /// Adds a "depends on" edge from a lifecycle record to another flag.
    ///
    /// Re-adding an existing dependency is a no-op. The target flag must
    /// exist, and the new edge must not close a cycle in the dependency
    /// graph.
    pub fn add_dependency(
        &self,
        lifecycle_id: &str,
        dependency_flag_id: &str,
    ) -> Result<LifecycleRecord, FlagError> {
        let mut record = self
            .lifecycles
            .find_by_id(lifecycle_id)
            .ok_or_else(|| FlagError::not_found(format!("lifecycle record {lifecycle_id}")))?;

        if record.dependencies.iter().any(|d| d == dependency_flag_id) {
            return Ok(record);
        }

        if self.flags.find_by_id(dependency_flag_id).is_none() {
            return Err(FlagError::not_found(format!(
                "dependency flag {dependency_flag_id}"
            )));
        }

        if graph::would_create_cycle(&self.lifecycles, &record.flag_id, dependency_flag_id) {
            return Err(FlagError::validation(format!(
                "adding dependency on flag {dependency_flag_id} would create a circular dependency"
            )));
        }

        record.dependencies.push(dependency_flag_id.to_string());
        Ok(self.lifecycles.save(record))
    }

    /// Registers a flag and bootstraps its lifecycle record.
    ///
    /// The key must be unique. Whatever the caller put in the snapshot, a
    /// new flag always starts disabled at 0% rollout; its lifecycle starts
    /// in `DEVELOPMENT`.
    pub fn create_flag(&self, mut flag: Flag) -> Result<(Flag, LifecycleRecord), FlagError> {
        flag.validate()?;
        if self.flags.find_by_key(&flag.key).is_some() {
            return Err(FlagError::validation(format!(
                "flag key '{}' already exists",
                flag.key
            )));
        }

        flag.is_enabled = false;
        flag.rollout_percentage = 0;

        let record =
            LifecycleRecord::new(format!("{}-lifecycle", flag.id), flag.id.clone(), Utc::now());
        let flag = self.flags.save(flag);
        let record = self.lifecycles.save(record);
        Ok((flag, record))
    }

    /// Deletes a flag together with its lifecycle record (and, by
    /// ownership, its rules and experiment groups).
    pub fn delete_flag(&self, flag_id: &str) -> Result<(), FlagError> {
        self.flags
            .delete(flag_id)
            .ok_or_else(|| FlagError::not_found(format!("flag {flag_id}")))?;
        self.lifecycles.delete_by_flag_id(flag_id);
        Ok(())
    }
}
