use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlagError;

/// A typed attribute value, used both for targeting rule operands and for
/// request context entries. The variant is fixed at rule-creation time so
/// the evaluator can dispatch comparison semantics without runtime probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Number(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(string) => write!(f, "{string}"),
            AttrValue::Number(number) => write!(f, "{number}"),
            AttrValue::Float(float) => write!(f, "{float}"),
            AttrValue::Boolean(bool) => write!(f, "{bool}"),
        }
    }
}

/// Equality is strict per variant, except that `Number` and `Float` compare
/// numerically. The source data model had a single number type; `3` and
/// `3.0` are the same value in a rule or a context.
impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::String(a), AttrValue::String(b)) => a == b,
            (AttrValue::Boolean(a), AttrValue::Boolean(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Float(b)) => (*a as f64) == *b,
            (AttrValue::Float(a), AttrValue::Number(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

/// Ordering exists for string/string and number/number pairs (with
/// int/float coercion). Everything else is unordered, which the evaluator
/// treats as "rule not matched".
impl PartialOrd for AttrValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (AttrValue::String(a), AttrValue::String(b)) => a.partial_cmp(b),
            (AttrValue::Number(a), AttrValue::Number(b)) => a.partial_cmp(b),
            (AttrValue::Float(a), AttrValue::Float(b)) => a.partial_cmp(b),
            (AttrValue::Number(a), AttrValue::Float(b)) => (*a as f64).partial_cmp(b),
            (AttrValue::Float(a), AttrValue::Number(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Boolean(b)
    }
}

/// The recognized comparison operators. The enum is closed: an operator
/// outside this set cannot be constructed, and serde rejects unknown
/// operator names when deserializing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
}

impl RuleOperator {
    /// Substring operators only make sense against string operands.
    pub fn is_substring(self) -> bool {
        matches!(
            self,
            RuleOperator::Contains | RuleOperator::StartsWith | RuleOperator::EndsWith
        )
    }

    /// Ordering operators need an orderable operand (string or number).
    pub fn is_ordering(self) -> bool {
        matches!(self, RuleOperator::GreaterThan | RuleOperator::LessThan)
    }
}

impl fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOperator::Equals => write!(f, "equals"),
            RuleOperator::Contains => write!(f, "contains"),
            RuleOperator::StartsWith => write!(f, "startsWith"),
            RuleOperator::EndsWith => write!(f, "endsWith"),
            RuleOperator::GreaterThan => write!(f, "greaterThan"),
            RuleOperator::LessThan => write!(f, "lessThan"),
        }
    }
}

/// A single attribute-comparison predicate. All of a flag's rules must hold
/// for the flag to apply to a request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingRule {
    pub attribute: String,
    pub operator: RuleOperator,
    pub value: AttrValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl TargetingRule {
    /// Creates a rule, rejecting operator/value combinations the evaluator
    /// could never match (e.g. `contains 42`).
    pub fn new(
        attribute: impl Into<String>,
        operator: RuleOperator,
        value: AttrValue,
    ) -> Result<Self, FlagError> {
        let rule = Self {
            attribute: attribute.into(),
            operator,
            value,
            metadata: None,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Re-checks the operator/value typing, for rules that arrived through
    /// deserialization instead of [`TargetingRule::new`].
    pub fn validate(&self) -> Result<(), FlagError> {
        if self.operator.is_substring() && !matches!(self.value, AttrValue::String(_)) {
            return Err(FlagError::validation(format!(
                "rule on '{}': operator {} requires a string value",
                self.attribute, self.operator
            )));
        }
        if self.operator.is_ordering() && matches!(self.value, AttrValue::Boolean(_)) {
            return Err(FlagError::validation(format!(
                "rule on '{}': operator {} requires an orderable value",
                self.attribute, self.operator
            )));
        }
        Ok(())
    }
}

/// A named experiment bucket. Users are assigned deterministically among a
/// flag's groups by hashing their id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentGroup {
    pub name: String,
    pub is_enabled: bool,
    #[serde(default)]
    pub traffic_allocation: f64,
    #[serde(default)]
    pub variants: Value,
}

impl ExperimentGroup {
    pub fn new(name: impl Into<String>, is_enabled: bool) -> Self {
        Self {
            name: name.into(),
            is_enabled,
            traffic_allocation: 0.0,
            variants: Value::Null,
        }
    }
}

/// A feature flag snapshot. Rules and experiment groups are owned inline;
/// deleting the flag deletes them with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: String,
    pub key: String,
    pub name: String,
    pub is_enabled: bool,
    pub rollout_percentage: u8,
    pub is_killswitch_enabled: bool,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub targeting_rules: Vec<TargetingRule>,
    #[serde(default)]
    pub experiment_groups: Vec<ExperimentGroup>,
}

impl Flag {
    /// A freshly created flag starts in the safe runtime state: disabled,
    /// 0% rollout, kill switch off.
    pub fn new(id: impl Into<String>, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            name: name.into(),
            is_enabled: false,
            rollout_percentage: 0,
            is_killswitch_enabled: false,
            metadata: Value::Null,
            targeting_rules: Vec::new(),
            experiment_groups: Vec::new(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    pub fn with_rollout(mut self, percentage: u8) -> Self {
        self.rollout_percentage = percentage;
        self
    }

    pub fn with_killswitch(mut self, on: bool) -> Self {
        self.is_killswitch_enabled = on;
        self
    }

    pub fn with_rule(mut self, rule: TargetingRule) -> Self {
        self.targeting_rules.push(rule);
        self
    }

    pub fn with_group(mut self, group: ExperimentGroup) -> Self {
        self.experiment_groups.push(group);
        self
    }

    /// Structural validation: rollout bounds and rule typing.
    pub fn validate(&self) -> Result<(), FlagError> {
        if self.rollout_percentage > 100 {
            return Err(FlagError::validation(format!(
                "flag '{}': rolloutPercentage {} is out of range (0-100)",
                self.key, self.rollout_percentage
            )));
        }
        for rule in &self.targeting_rules {
            rule.validate()?;
        }
        Ok(())
    }
}

/// Maturity stage of a feature, independent of its runtime on/off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Development,
    Alpha,
    Beta,
    Ga,
    Deprecated,
    Sunset,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Development => "DEVELOPMENT",
            LifecycleState::Alpha => "ALPHA",
            LifecycleState::Beta => "BETA",
            LifecycleState::Ga => "GA",
            LifecycleState::Deprecated => "DEPRECATED",
            LifecycleState::Sunset => "SUNSET",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LifecycleState {
    type Err = FlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEVELOPMENT" => Ok(LifecycleState::Development),
            "ALPHA" => Ok(LifecycleState::Alpha),
            "BETA" => Ok(LifecycleState::Beta),
            "GA" => Ok(LifecycleState::Ga),
            "DEPRECATED" => Ok(LifecycleState::Deprecated),
            "SUNSET" => Ok(LifecycleState::Sunset),
            other => Err(FlagError::validation(format!(
                "unknown lifecycle state '{other}' \
                 (expected DEVELOPMENT, ALPHA, BETA, GA, DEPRECATED or SUNSET)"
            ))),
        }
    }
}

/// Bookkeeping for the current lifecycle stage: when it was entered, the
/// entry criteria for the stage, and who approved the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMeta {
    pub entered_at: DateTime<Utc>,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

/// Governance record, one-to-one with a flag. `dependencies` holds *flag
/// ids* of other flags this one depends on — an edge list keyed by
/// identifier, never object references, so the graph cannot form a true
/// reference cycle in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRecord {
    pub id: String,
    pub flag_id: String,
    pub state: LifecycleState,
    #[serde(rename = "stateMetadata")]
    pub state_meta: StateMeta,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Bumped by the store on every save; supports optimistic concurrency
    /// checks at a real repository boundary.
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_strategy: Option<String>,
    #[serde(default)]
    pub usage_metrics: Value,
    #[serde(default)]
    pub version_control: Value,
}

impl LifecycleRecord {
    /// A record always starts its life in `DEVELOPMENT`.
    pub fn new(id: impl Into<String>, flag_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            flag_id: flag_id.into(),
            state: LifecycleState::Development,
            state_meta: StateMeta {
                entered_at: now,
                criteria: crate::lifecycle::entry_criteria(LifecycleState::Development)
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                approved_by: None,
            },
            dependencies: Vec::new(),
            version: 0,
            migration_plan: None,
            cleanup_strategy: None,
            usage_metrics: Value::Null,
            version_control: Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_numeric_equality() {
        assert_eq!(AttrValue::Number(3), AttrValue::Float(3.0));
        assert_ne!(AttrValue::Number(3), AttrValue::Float(3.5));
        assert_ne!(AttrValue::String("3".into()), AttrValue::Number(3));
        assert_ne!(AttrValue::Boolean(true), AttrValue::Number(1));
    }

    #[test]
    fn test_attr_value_ordering() {
        assert!(AttrValue::Number(3) < AttrValue::Number(4));
        assert!(AttrValue::Number(3) < AttrValue::Float(3.5));
        assert!(AttrValue::Float(5.4) > AttrValue::Number(5));
        assert!(AttrValue::String("a".into()) < AttrValue::String("b".into()));
        // cross-type and boolean comparisons are unordered
        assert_eq!(
            AttrValue::String("3".into()).partial_cmp(&AttrValue::Number(3)),
            None
        );
        assert_eq!(
            AttrValue::Boolean(false).partial_cmp(&AttrValue::Boolean(true)),
            None
        );
    }

    #[test]
    fn test_rule_typing_validation() {
        assert!(TargetingRule::new("email", RuleOperator::EndsWith, "@co.com".into()).is_ok());
        assert!(TargetingRule::new("email", RuleOperator::Contains, AttrValue::Number(42)).is_err());
        assert!(TargetingRule::new("age", RuleOperator::GreaterThan, AttrValue::Number(18)).is_ok());
        assert!(
            TargetingRule::new("age", RuleOperator::LessThan, AttrValue::Boolean(true)).is_err()
        );
        assert!(TargetingRule::new("plan", RuleOperator::Equals, AttrValue::Boolean(true)).is_ok());
    }

    #[test]
    fn test_flag_rollout_validation() {
        let flag = Flag::new("f1", "checkout", "New checkout").with_rollout(101);
        assert!(flag.validate().is_err());
        let flag = Flag::new("f1", "checkout", "New checkout").with_rollout(100);
        assert!(flag.validate().is_ok());
    }

    #[test]
    fn test_flag_wire_names() {
        let flag = Flag::new("f1", "checkout", "New checkout")
            .enabled(true)
            .with_rollout(25);
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["isEnabled"], serde_json::json!(true));
        assert_eq!(json["rolloutPercentage"], serde_json::json!(25));
        assert_eq!(json["isKillswitchEnabled"], serde_json::json!(false));
        assert!(json["targetingRules"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_operator_wire_names() {
        let op: RuleOperator = serde_json::from_str("\"startsWith\"").unwrap();
        assert_eq!(op, RuleOperator::StartsWith);
        // unknown operator names are rejected at the deserialization edge
        assert!(serde_json::from_str::<RuleOperator>("\"matches\"").is_err());
    }

    #[test]
    fn test_lifecycle_state_parse() {
        assert_eq!("ga".parse::<LifecycleState>().unwrap(), LifecycleState::Ga);
        assert_eq!(
            "Beta".parse::<LifecycleState>().unwrap(),
            LifecycleState::Beta
        );
        assert!("RETIRED".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_new_record_starts_in_development() {
        let record = LifecycleRecord::new("lc-1", "f1", Utc::now());
        assert_eq!(record.state, LifecycleState::Development);
        assert!(record.state_meta.criteria.is_empty());
        assert!(record.dependencies.is_empty());
        assert_eq!(record.version, 0);
    }
}
