//! The JSON flagset file: a flat document holding flags and their lifecycle
//! records, loaded into the in-memory stores for every command and written
//! back after mutations.

use serde::{Deserialize, Serialize};
use serde_json::json;

use flaggate_lib::{
    ExperimentGroup, Flag, FlagService, FlagStore, InMemoryFlagStore, InMemoryLifecycleStore,
    LifecycleRecord, LifecycleStore, RuleOperator, TargetingRule,
};

pub type Service = FlagService<InMemoryFlagStore, InMemoryLifecycleStore>;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Flagset {
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub lifecycles: Vec<LifecycleRecord>,
}

impl Flagset {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("could not read '{path}': {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("could not parse '{path}': {e}"))
    }

    pub fn save(&self, path: &str) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("could not serialize flagset: {e}"))?;
        std::fs::write(path, content + "\n").map_err(|e| format!("could not write '{path}': {e}"))
    }

    /// Populates fresh in-memory stores and wraps them in a service.
    pub fn into_service(self) -> Service {
        let flags = InMemoryFlagStore::new();
        for flag in self.flags {
            flags.save(flag);
        }
        let lifecycles = InMemoryLifecycleStore::new();
        for mut record in self.lifecycles {
            // keep file-recorded versions; the store bumps on save
            record.version = record.version.saturating_sub(1);
            lifecycles.save(record);
        }
        FlagService::new(flags, lifecycles)
    }

    /// Snapshots a service's stores back into file form.
    pub fn from_service(service: &Service) -> Self {
        Self {
            flags: service.flags().all(),
            lifecycles: service.lifecycles().all(),
        }
    }

    /// The demo flagset written by `fg init`.
    pub fn demo() -> Self {
        let service = FlagService::new(InMemoryFlagStore::new(), InMemoryLifecycleStore::new());
        service
            .create_flag(Flag::new("flag-001", "new-checkout", "New checkout flow"))
            .expect("demo flagset");
        let mut flag = service.flags().find_by_key("new-checkout").expect("demo flag");
        flag.is_enabled = true;
        flag.rollout_percentage = 25;
        flag.metadata = json!({ "owner": "payments-team" });
        flag.targeting_rules = vec![TargetingRule::new(
            "country",
            RuleOperator::Equals,
            "NL".into(),
        )
        .expect("demo rule")];
        flag.experiment_groups = vec![
            ExperimentGroup::new("treatment", true),
            ExperimentGroup::new("control", false),
        ];
        service.flags().save(flag);
        Self::from_service(&service)
    }
}
