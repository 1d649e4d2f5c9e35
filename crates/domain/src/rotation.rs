//! Traffic-distribution policies encoded in a stored record value.
//!
//! The stored form is a compact text grammar with two reserved separators:
//!
//! ```text
//! 10.0.0.1                          static literal
//! 10.0.0.1/10.0.0.2/10.0.0.3        round-robin list, head is served next
//! 10.0.0.1/10.0.0.2%10.0.0.3        groups; one is drawn uniformly at random,
//!                                   a group containing '/' rotates in place
//! ```
//!
//! Values are parsed into a [`RotationPolicy`], a selection produces a
//! [`RotationPlan`], and the plan's `new_value` is encoded back into the same
//! grammar so existing rows stay readable.

use crate::DomainError;
use std::fmt;

pub const LIST_SEPARATOR: char = '/';
pub const GROUP_SEPARATOR: char = '%';

/// Ordered, non-empty list served head-first and rotated left after each use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRobinList {
    items: Vec<String>,
}

impl RoundRobinList {
    pub fn new(items: Vec<String>) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvalidRecordValue(
                "round-robin list cannot be empty".to_string(),
            ));
        }
        if let Some(pos) = items.iter().position(|item| item.is_empty()) {
            return Err(DomainError::InvalidRecordValue(format!(
                "round-robin list has an empty element at position {}",
                pos
            )));
        }
        Ok(Self { items })
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Self::new(raw.split(LIST_SEPARATOR).map(str::to_string).collect())
    }

    pub fn head(&self) -> &str {
        &self.items[0]
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Moves the head to the tail. Always a cyclic permutation of the input.
    pub fn rotated(&self) -> Self {
        let mut items = self.items.clone();
        items.rotate_left(1);
        Self { items }
    }

    pub fn encode(&self) -> String {
        self.items.join(&LIST_SEPARATOR.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationGroup {
    Literal(String),
    List(RoundRobinList),
}

impl RotationGroup {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::InvalidRecordValue(
                "group cannot be empty".to_string(),
            ));
        }
        if raw.contains(LIST_SEPARATOR) {
            RoundRobinList::parse(raw).map(RotationGroup::List)
        } else {
            Ok(RotationGroup::Literal(raw.to_string()))
        }
    }

    pub fn encode(&self) -> String {
        match self {
            RotationGroup::Literal(value) => value.clone(),
            RotationGroup::List(list) => list.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPolicy {
    Static(String),
    RoundRobin(RoundRobinList),
    Grouped(Vec<RotationGroup>),
}

/// Outcome of one selection: what to answer with and, when the policy
/// advanced, the value that must be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    pub selected: String,
    pub new_value: Option<String>,
}

impl RotationPlan {
    fn unchanged(selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            new_value: None,
        }
    }

    pub fn mutates(&self) -> bool {
        self.new_value.is_some()
    }
}

impl RotationPolicy {
    /// Strict parse. The policy kind is decided by the separators alone.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.contains(GROUP_SEPARATOR) {
            let groups = value
                .split(GROUP_SEPARATOR)
                .map(RotationGroup::parse)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RotationPolicy::Grouped(groups))
        } else if value.contains(LIST_SEPARATOR) {
            RoundRobinList::parse(value).map(RotationPolicy::RoundRobin)
        } else {
            Ok(RotationPolicy::Static(value.to_string()))
        }
    }

    /// Total parse: a malformed value is served verbatim as a static literal.
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|_| RotationPolicy::Static(value.to_string()))
    }

    pub fn encode(&self) -> String {
        match self {
            RotationPolicy::Static(value) => value.clone(),
            RotationPolicy::RoundRobin(list) => list.encode(),
            RotationPolicy::Grouped(groups) => groups
                .iter()
                .map(RotationGroup::encode)
                .collect::<Vec<_>>()
                .join(&GROUP_SEPARATOR.to_string()),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, RotationPolicy::Static(_))
    }

    /// Picks the next answer.
    ///
    /// Grouped values draw one group uniformly over the number of groups, not
    /// weighted by their content. Only a drawn list group produces a new value;
    /// every other group is left byte-for-byte as it was.
    pub fn select(&self, rng: &mut fastrand::Rng) -> RotationPlan {
        match self {
            RotationPolicy::Static(value) => RotationPlan::unchanged(value.as_str()),
            RotationPolicy::RoundRobin(list) => RotationPlan {
                selected: list.head().to_string(),
                new_value: Some(list.rotated().encode()),
            },
            RotationPolicy::Grouped(groups) if groups.is_empty() => RotationPlan::unchanged(""),
            RotationPolicy::Grouped(groups) => {
                let idx = rng.usize(..groups.len());
                match &groups[idx] {
                    RotationGroup::Literal(value) => RotationPlan::unchanged(value.as_str()),
                    RotationGroup::List(list) => {
                        let mut next = groups.clone();
                        next[idx] = RotationGroup::List(list.rotated());
                        RotationPlan {
                            selected: list.head().to_string(),
                            new_value: Some(RotationPolicy::Grouped(next).encode()),
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Parses `value` leniently and selects from it.
pub fn rotate(value: &str, rng: &mut fastrand::Rng) -> RotationPlan {
    RotationPolicy::parse_lenient(value).select(rng)
}
