use std::fmt::{Display, Formatter};
use std::str::FromStr;

use labrix_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Operations a permission can allow on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read records of the module.
    Read,
    /// Create records in the module.
    Write,
    /// Modify existing records of the module.
    Update,
    /// Remove records from the module.
    Delete,
    /// Export module data.
    Export,
    /// Import module data.
    Import,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Import => "import",
        }
    }

    /// Returns all known actions in stable order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Read,
            Action::Write,
            Action::Update,
            Action::Delete,
            Action::Export,
            Action::Import,
        ];

        ALL
    }

    /// Parses a transport value into an action.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "export" => Ok(Self::Export),
            "import" => Ok(Self::Import),
            _ => Err(AppError::Validation(format!("unknown action '{value}'"))),
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A non-empty, duplicate-free set of actions.
///
/// Insertion order is preserved and duplicates collapse on construction, so
/// two sets built from the same actions in the same order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet(Vec<Action>);

impl ActionSet {
    /// Creates an action set, collapsing duplicates in insertion order.
    ///
    /// Fails with a validation error when no actions remain.
    pub fn new(actions: impl IntoIterator<Item = Action>) -> AppResult<Self> {
        let mut deduped: Vec<Action> = Vec::new();
        for action in actions {
            if !deduped.contains(&action) {
                deduped.push(action);
            }
        }

        if deduped.is_empty() {
            return Err(AppError::Validation(
                "action set must contain at least one action".to_owned(),
            ));
        }

        Ok(Self(deduped))
    }

    /// Parses transport values into an action set.
    pub fn from_transport(values: &[String]) -> AppResult<Self> {
        let mut actions = Vec::with_capacity(values.len());
        for value in values {
            actions.push(Action::from_transport(value)?);
        }

        Self::new(actions)
    }

    /// Returns whether the set contains the action.
    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    /// Returns whether the set contains every listed action.
    ///
    /// An empty list is vacuously covered.
    #[must_use]
    pub fn contains_all(&self, actions: &[Action]) -> bool {
        actions.iter().all(|action| self.contains(*action))
    }

    /// Returns whether every action of this set appears in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.0.iter().all(|action| other.contains(*action))
    }

    /// Appends the actions of this set that `accumulator` is missing,
    /// preserving arrival order.
    pub fn union_into(&self, accumulator: &mut Vec<Action>) {
        for action in &self.0 {
            if !accumulator.contains(action) {
                accumulator.push(*action);
            }
        }
    }

    /// Returns the actions in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Action] {
        self.0.as_slice()
    }

    /// Returns the number of distinct actions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty. Always false for validated sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the actions in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    /// Returns the storage values of the actions in insertion order.
    #[must_use]
    pub fn to_storage(&self) -> Vec<String> {
        self.0.iter().map(|action| action.as_str().to_owned()).collect()
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Joins actions into a readable list for denial messages.
#[must_use]
pub fn describe_actions(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "any".to_owned();
    }

    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{Action, ActionSet, describe_actions};

    #[test]
    fn action_roundtrip_storage_value() {
        for action in Action::all() {
            let restored = Action::from_str(action.as_str());
            assert!(restored.is_ok());
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Action::from_str("execute").is_err());
    }

    #[test]
    fn empty_action_set_is_rejected() {
        assert!(ActionSet::new([]).is_err());
    }

    #[test]
    fn duplicates_collapse_in_insertion_order() {
        let set = ActionSet::new([Action::Write, Action::Read, Action::Write]);
        assert!(set.is_ok());
        let set = set.unwrap_or_else(|_| unreachable!());
        assert_eq!(set.as_slice(), &[Action::Write, Action::Read]);
    }

    #[test]
    fn contains_all_is_vacuous_for_empty_requirement() {
        let set = ActionSet::new([Action::Read]).unwrap_or_else(|_| unreachable!());
        assert!(set.contains_all(&[]));
    }

    #[test]
    fn describe_actions_names_each_action() {
        assert_eq!(
            describe_actions(&[Action::Read, Action::Delete]),
            "read, delete"
        );
        assert_eq!(describe_actions(&[]), "any");
    }

    fn arbitrary_actions() -> impl Strategy<Value = Vec<Action>> {
        proptest::collection::vec(
            prop_oneof![
                Just(Action::Read),
                Just(Action::Write),
                Just(Action::Update),
                Just(Action::Delete),
                Just(Action::Export),
                Just(Action::Import),
            ],
            1..12,
        )
    }

    proptest! {
        #[test]
        fn construction_never_holds_duplicates(actions in arbitrary_actions()) {
            let set = ActionSet::new(actions).unwrap_or_else(|_| unreachable!());
            for (index, action) in set.iter().enumerate() {
                prop_assert!(!set.as_slice()[index + 1..].contains(action));
            }
        }

        #[test]
        fn every_set_is_subset_of_full_vocabulary(actions in arbitrary_actions()) {
            let set = ActionSet::new(actions).unwrap_or_else(|_| unreachable!());
            let full = ActionSet::new(Action::all().to_vec())
                .unwrap_or_else(|_| unreachable!());
            prop_assert!(set.is_subset_of(&full));
        }

        #[test]
        fn union_into_preserves_members(
            first in arbitrary_actions(),
            second in arbitrary_actions(),
        ) {
            let first = ActionSet::new(first).unwrap_or_else(|_| unreachable!());
            let second = ActionSet::new(second).unwrap_or_else(|_| unreachable!());

            let mut union = Vec::new();
            first.union_into(&mut union);
            second.union_into(&mut union);

            for action in first.iter().chain(second.iter()) {
                prop_assert!(union.contains(action));
            }
            for (index, action) in union.iter().enumerate() {
                prop_assert!(!union[index + 1..].contains(action));
            }
        }
    }
}
