//! Clarification detection.
//!
//! A clarification is the user explicitly re-asserting an intent after a
//! routing miss ("i asked you to add the todo"). Without a dedicated
//! override, a stale pending request for handler A keeps capturing the
//! correction meant for handler B.

use crate::domain::foundation::HandlerId;
use crate::domain::intent::IntentType;

/// Phrases that signal the user is correcting a previous turn.
const CORRECTION_MARKERS: &[&str] = &[
    "i asked you to",
    "i asked for",
    "i told you to",
    "i said",
    "no, i meant",
    "no i meant",
    "i meant",
    "that's not what i asked",
    "thats not what i asked",
];

/// Detects a clarification and the handler it re-asserts.
///
/// Returns the handler only when the text both carries a correction
/// marker and names recognizable intent vocabulary. The vocabulary check
/// uses the same specific-before-generic order as the classifier.
pub fn detect_clarification(text: &str) -> Option<HandlerId> {
    let lowered = text.to_lowercase();
    if !CORRECTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        return None;
    }

    if contains_any(&lowered, &["todo", "to-do", "task", "checklist"]) {
        return Some(HandlerId::tasks());
    }
    if contains_any(&lowered, &["remind", "reminder", "alarm", "alert"]) {
        return Some(HandlerId::scheduling());
    }
    if contains_any(&lowered, &["message", "text", "email"]) {
        return Some(HandlerId::correspondence());
    }
    None
}

/// The intent a clarification re-asserts for a handler.
pub fn reasserted_intent(handler: &HandlerId) -> IntentType {
    match handler.as_str() {
        HandlerId::SCHEDULING => IntentType::ScheduleReminder,
        HandlerId::TASKS => IntentType::ManageTask,
        HandlerId::CORRESPONDENCE => IntentType::SendMessage,
        _ => IntentType::None,
    }
}

fn contains_any(s: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| s.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_reasserted_task() {
        assert_eq!(
            detect_clarification("i asked you to add the todo"),
            Some(HandlerId::tasks())
        );
    }

    #[test]
    fn detects_reasserted_reminder() {
        assert_eq!(
            detect_clarification("no, i meant set a reminder"),
            Some(HandlerId::scheduling())
        );
    }

    #[test]
    fn detects_reasserted_message() {
        assert_eq!(
            detect_clarification("i said send the message to alice"),
            Some(HandlerId::correspondence())
        );
    }

    #[test]
    fn task_vocabulary_outranks_reminder_vocabulary() {
        // Both vocabularies present; the specific reading wins.
        assert_eq!(
            detect_clarification("i asked you to put that on my todo list, not a reminder"),
            Some(HandlerId::tasks())
        );
    }

    #[test]
    fn marker_without_vocabulary_is_not_a_clarification() {
        assert_eq!(detect_clarification("i said hello"), None);
    }

    #[test]
    fn vocabulary_without_marker_is_not_a_clarification() {
        assert_eq!(detect_clarification("add milk to my todo list"), None);
    }

    #[test]
    fn reasserted_intents_cover_known_handlers() {
        assert_eq!(
            reasserted_intent(&HandlerId::scheduling()),
            IntentType::ScheduleReminder
        );
        assert_eq!(reasserted_intent(&HandlerId::tasks()), IntentType::ManageTask);
        assert_eq!(
            reasserted_intent(&HandlerId::new("unknown").unwrap()),
            IntentType::None
        );
    }
}
