use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// A breakpoint exactly as the frontend asked for it, in client coordinates.
/// Two specs are the same breakpoint only if every field matches; a changed
/// condition is a different breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BreakpointSpec {
    pub source_path: String,
    pub line: i64,
    pub column: Option<i64>,
    pub condition: Option<String>,
}

impl BreakpointSpec {
    pub fn new(
        source_path: impl Into<String>,
        line: i64,
        column: Option<i64>,
        condition: Option<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            line,
            column,
            condition: condition.filter(|c| !c.trim().is_empty()),
        }
    }
}

pub type BreakpointSet = BTreeSet<BreakpointSpec>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub to_remove: Vec<BreakpointSpec>,
    pub to_add: Vec<BreakpointSpec>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

pub fn reconcile(previous: &BreakpointSet, next: &BreakpointSet) -> Reconciliation {
    Reconciliation {
        to_remove: previous.difference(next).cloned().collect(),
        to_add: next.difference(previous).cloned().collect(),
    }
}

/// What happens to the accepted set when remote calls fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Keep the requested set and report failures.
    #[default]
    Optimistic,
    /// Correct the accepted set to what the engine actually applied, and
    /// report rejected breakpoints as unverified.
    Strict,
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown breakpoint policy '{other}'")),
        }
    }
}

/// Accepted breakpoint sets, one per source path.
#[derive(Debug, Default)]
pub struct BreakpointStore {
    accepted: BTreeMap<String, BreakpointSet>,
    last_error: Option<String>,
}

impl BreakpointStore {
    #[cfg(test)]
    pub fn accepted(&self, source_path: &str) -> Option<&BreakpointSet> {
        self.accepted.get(source_path)
    }

    /// Installs `next` as the accepted set for `source_path` and returns the
    /// delta from the set it replaced.
    pub fn replace(&mut self, source_path: &str, next: BreakpointSet) -> Reconciliation {
        let previous = self.accepted.remove(source_path).unwrap_or_default();
        let delta = reconcile(&previous, &next);
        if !next.is_empty() {
            self.accepted.insert(source_path.to_string(), next);
        }
        delta
    }

    /// Every accepted breakpoint across all sources, for replay on a new request.
    pub fn all(&self) -> Vec<BreakpointSpec> {
        self.accepted.values().flatten().cloned().collect()
    }

    /// Brings the accepted set back in line with the engine after a partial
    /// failure: failed adds never landed, failed removes are still there.
    pub fn settle(&mut self, source_path: &str, failed_adds: &[BreakpointSpec], failed_removes: &[BreakpointSpec]) {
        let set = self.accepted.entry(source_path.to_string()).or_default();
        for spec in failed_adds {
            set.remove(spec);
        }
        for spec in failed_removes {
            set.insert(spec.clone());
        }
        if set.is_empty() {
            self.accepted.remove(source_path);
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}
