//! Priority slot extraction.

use serde::{Deserialize, Serialize};

/// Priority level attached to a task or reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Returns the canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extracts a priority level from free text, if one is stated.
///
/// Best-effort keyword matching; the strongest stated level wins when
/// several appear ("urgent" beats a stray "low"). Returns `None` when the
/// text says nothing about priority.
pub fn extract_priority(text: &str) -> Option<Priority> {
    let lowered = text.to_lowercase();

    // Negated urgency reads as low, so it must be checked before "urgent".
    if contains_any(
        &lowered,
        &["not urgent", "low priority", "no rush", "no hurry", "whenever you get a chance"],
    ) {
        return Some(Priority::Low);
    }
    if contains_any(
        &lowered,
        &["urgent", "asap", "as soon as possible", "right away", "critical", "emergency"],
    ) {
        return Some(Priority::Urgent);
    }
    if contains_any(
        &lowered,
        &["high priority", "very important", "important", "top priority"],
    ) {
        return Some(Priority::High);
    }
    if contains_any(&lowered, &["medium priority", "normal priority"]) {
        return Some(Priority::Medium);
    }

    None
}

fn contains_any(s: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| s.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_urgent() {
        assert_eq!(extract_priority("call the bank asap"), Some(Priority::Urgent));
        assert_eq!(
            extract_priority("this is urgent, fix the boiler"),
            Some(Priority::Urgent)
        );
    }

    #[test]
    fn extracts_high() {
        assert_eq!(
            extract_priority("add an important task for monday"),
            Some(Priority::High)
        );
        assert_eq!(
            extract_priority("high priority: renew passport"),
            Some(Priority::High)
        );
    }

    #[test]
    fn extracts_low() {
        assert_eq!(
            extract_priority("no rush, just add water the plants"),
            Some(Priority::Low)
        );
    }

    #[test]
    fn extracts_medium() {
        assert_eq!(
            extract_priority("normal priority is fine"),
            Some(Priority::Medium)
        );
    }

    #[test]
    fn negated_urgency_reads_as_low() {
        assert_eq!(extract_priority("it's not urgent"), Some(Priority::Low));
    }

    #[test]
    fn urgent_outranks_importance() {
        assert_eq!(
            extract_priority("important and urgent: call the school"),
            Some(Priority::Urgent)
        );
    }

    #[test]
    fn absent_when_unstated() {
        assert_eq!(extract_priority("add milk to my todo list"), None);
        assert_eq!(extract_priority(""), None);
    }

    #[test]
    fn deterministic_across_calls() {
        let text = "urgent: file the report";
        assert_eq!(extract_priority(text), extract_priority(text));
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&Priority::Urgent).unwrap();
        assert_eq!(json, "\"urgent\"");
    }
}
