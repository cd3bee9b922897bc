//! Task description extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// "add milk to my todo list" → "milk"
static ADD_TO_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:add|put)\s+(.+?)\s+(?:to|on|onto)\s+(?:my\s+|the\s+)?(?:to-?do|task|shopping)\s*list\b")
        .unwrap()
});

/// "create a task to call mom" → "call mom"
static CREATE_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:add|create|make)\s+(?:a\s+|a\s+new\s+)?(?:task|to-?do)(?:\s+(?:to|for|called|:))?\s+(.+)$")
        .unwrap()
});

/// "remind me to water the plants", "remember to ...", "i need to ..."
static VERB_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:remind me to|remember to|don't forget to|i need to|i have to)\s+(.+)$")
        .unwrap()
});

/// Trailing time talk stripped off extracted descriptions.
static TRAILING_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*(?:(?:at\s+)?\d{1,2}(?::\d{2})?\s*(?:am|pm)?|today|tomorrow|tonight|at\s+noon|at\s+midnight|in\s+\d{1,4}\s+(?:minutes?|mins?|hours?|hrs?))\s*[.!?]?\s*$",
    )
    .unwrap()
});

/// Extracts a task description from free text, if one is present.
///
/// Best-effort pattern matching over the common phrasings for adding work
/// items. Trailing time expressions are stripped so "remind me to call mom
/// at 6pm" yields "call mom"; the time itself belongs to the time slot.
/// Returns `None` when no description can be isolated.
pub fn extract_task(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if let Some(caps) = ADD_TO_LIST_RE.captures(trimmed) {
        caps.get(1)?.as_str().to_string()
    } else if let Some(caps) = CREATE_TASK_RE.captures(trimmed) {
        caps.get(1)?.as_str().to_string()
    } else if let Some(caps) = VERB_PHRASE_RE.captures(trimmed) {
        caps.get(1)?.as_str().to_string()
    } else {
        return None;
    };

    let cleaned = strip_time_talk(&candidate);
    let cleaned = cleaned.trim_end_matches(['.', '!', '?', ',']).trim();
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.to_string())
}

fn strip_time_talk(s: &str) -> String {
    let mut current = s.trim().to_string();
    // Several time fragments can stack at the end ("tomorrow at 6pm").
    loop {
        let stripped = TRAILING_TIME_RE.replace(&current, "").trim().to_string();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_add_to_list_object() {
        assert_eq!(
            extract_task("add milk to my todo list").as_deref(),
            Some("milk")
        );
        assert_eq!(
            extract_task("put eggs on the shopping list").as_deref(),
            Some("eggs")
        );
    }

    #[test]
    fn extracts_create_task_phrase() {
        assert_eq!(
            extract_task("create a task to call mom").as_deref(),
            Some("call mom")
        );
        assert_eq!(
            extract_task("add a todo: renew the car insurance").as_deref(),
            Some("renew the car insurance")
        );
    }

    #[test]
    fn extracts_remind_me_to_phrase() {
        assert_eq!(
            extract_task("remind me to water the plants").as_deref(),
            Some("water the plants")
        );
    }

    #[test]
    fn strips_trailing_time_expression() {
        assert_eq!(
            extract_task("remind me to call mom at 6pm").as_deref(),
            Some("call mom")
        );
        assert_eq!(
            extract_task("remind me to take out the bins tomorrow at 8am").as_deref(),
            Some("take out the bins")
        );
        assert_eq!(
            extract_task("i need to stretch in 30 minutes").as_deref(),
            Some("stretch")
        );
    }

    #[test]
    fn absent_when_no_description() {
        assert_eq!(extract_task("set a reminder for tomorrow"), None);
        assert_eq!(extract_task("show me my tasks"), None);
        assert_eq!(extract_task(""), None);
    }

    #[test]
    fn absent_when_only_time_remains() {
        assert_eq!(extract_task("remind me to at 6pm"), None);
    }

    #[test]
    fn trims_trailing_punctuation() {
        assert_eq!(
            extract_task("remember to feed the cat!").as_deref(),
            Some("feed the cat")
        );
    }

    #[test]
    fn deterministic_across_calls() {
        let text = "add milk to my todo list";
        assert_eq!(extract_task(text), extract_task(text));
    }
}
