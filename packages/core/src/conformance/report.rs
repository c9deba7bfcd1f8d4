use crate::error::ErrorKind;
use serde::Serialize;

/// Which group of operations a report entry covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    KeyExchange,
    Aead,
    Signature,
}

/// Result of driving one algorithm through its protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every step succeeded, listed in execution order.
    Passed { steps: Vec<&'static str> },
    /// The first step that failed. Later steps were not run.
    ///
    /// `kind` is `None` when the backend returned success but the result was
    /// wrong (e.g. the two shared secrets differ).
    Failed {
        step: &'static str,
        error: String,
        kind: Option<ErrorKind>,
    },
    /// The backend does not implement the algorithm.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmReport {
    pub category: Category,
    pub algorithm: &'static str,
    pub outcome: Outcome,
}

impl AlgorithmReport {
    pub fn is_passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        self.outcome == Outcome::Unsupported
    }
}

/// Per-algorithm results for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub backend: &'static str,
    pub results: Vec<AlgorithmReport>,
}

impl ConformanceReport {
    /// True when every algorithm passed. An empty report never passes.
    pub fn all_passed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(AlgorithmReport::is_passed)
    }

    /// True when nothing failed; unsupported algorithms are acceptable.
    pub fn is_conformant(&self) -> bool {
        !self.results.iter().any(AlgorithmReport::is_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &AlgorithmReport> {
        self.results.iter().filter(|r| r.is_failed())
    }

    pub fn find(&self, category: Category, algorithm: &str) -> Option<&AlgorithmReport> {
        self.results
            .iter()
            .find(|r| r.category == category && r.algorithm == algorithm)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: Outcome) -> AlgorithmReport {
        AlgorithmReport {
            category: Category::Aead,
            algorithm: "CHACHA20_POLY1305",
            outcome,
        }
    }

    #[test]
    fn test_unsupported_is_conformant_but_not_passed() {
        let report = ConformanceReport {
            backend: "stub",
            results: vec![report(Outcome::Unsupported)],
        };
        assert!(report.is_conformant());
        assert!(!report.all_passed());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_failure_serializes_step_and_kind() {
        let report = ConformanceReport {
            backend: "native",
            results: vec![report(Outcome::Failed {
                step: "Tag tamper",
                error: "AEAD authentication failed".to_string(),
                kind: Some(ErrorKind::Validity),
            })],
        };

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let entry = &json["results"][0];
        assert_eq!(entry["category"], "aead");
        assert_eq!(entry["outcome"]["status"], "failed");
        assert_eq!(entry["outcome"]["step"], "Tag tamper");
        assert_eq!(entry["outcome"]["kind"], "Validity");
    }

    #[test]
    fn test_empty_report_does_not_pass() {
        let report = ConformanceReport {
            backend: "native",
            results: Vec::new(),
        };
        assert!(!report.all_passed());
        assert!(report.is_conformant());
    }
}
