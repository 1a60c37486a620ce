use serde::{Deserialize, Serialize};

/// A line of check output.
pub type Message = String;

/// Outcome of a single proposal check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Informational findings.
    pub info: Vec<Message>,
    /// Findings worth a human look.
    pub warnings: Vec<Message>,
    /// Findings that should block the proposal.
    pub errors: Vec<Message>,
}

impl CheckResult {
    /// A result with a single informational message.
    pub fn info(message: impl Into<Message>) -> Self {
        Self { info: vec![message.into()], ..Default::default() }
    }

    /// A result with a single error.
    pub fn error(message: impl Into<Message>) -> Self {
        Self { errors: vec![message.into()], ..Default::default() }
    }

    /// Whether the check raised no errors.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the check raised neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// A named check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCheckResult {
    /// Identifier of the check.
    pub id: String,
    /// Human readable name of the check.
    pub name: String,
    /// The outcome.
    pub result: CheckResult,
}

/// Results of all checks run against one simulation, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllCheckResults(Vec<NamedCheckResult>);

impl AllCheckResults {
    /// Records the result of a check, replacing an earlier result with the same ID.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>, result: CheckResult) {
        let id = id.into();
        let entry = NamedCheckResult { id, name: name.into(), result };
        match self.0.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.0.push(entry),
        }
    }

    /// Looks up a result by check ID.
    pub fn get(&self, id: &str) -> Option<&NamedCheckResult> {
        self.0.iter().find(|entry| entry.id == id)
    }

    /// Iterates over the results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedCheckResult> {
        self.0.iter()
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no results were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.0.iter().all(|entry| entry.result.passed())
    }

    /// Total number of errors and warnings across all checks.
    pub fn counts(&self) -> (usize, usize) {
        self.0.iter().fold((0, 0), |(errors, warnings), entry| {
            (errors + entry.result.errors.len(), warnings + entry.result.warnings.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces() {
        let mut results = AllCheckResults::default();
        results.insert("b", "Second", CheckResult::info("ok"));
        results.insert("a", "First", CheckResult::error("bad"));
        results.insert("b", "Second", CheckResult::default());

        let ids = results.iter().map(|entry| entry.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["b", "a"]);
        assert!(results.get("b").unwrap().result.info.is_empty());
        assert!(!results.passed());
        assert_eq!(results.counts(), (1, 0));
    }
}
