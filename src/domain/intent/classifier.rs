//! Keyword-heuristic intent classifier.
//!
//! Maps an utterance to candidate intents via ordered keyword/pattern
//! groups. No ML model; matching is fast, deterministic, and auditable.
//! A message can match several intents at once; ranking encodes the
//! tie-break policy: vocabulary that names the thing being managed
//! ("todo", "task") outranks generic alert vocabulary ("remind") so that
//! task talk containing a time expression is not misread as a reminder.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::slots::{ListCategory, SlotValues};

use super::types::{Classification, IntentType};

/// "send a message to alice", "text bob", "tell carol that ..."
static RECIPIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:send\s+(?:a\s+)?message\s+to|message|text|email|tell|let)\s+([a-z][a-z0-9_-]*)\b")
        .unwrap()
});

/// Message body after "saying", "that", or a colon.
static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:saying|that)\s+(.+)$").unwrap());

/// Listing verbs that mark an enumeration request.
const LIST_VERBS: &[&str] = &[
    "show me",
    "show all",
    "show my",
    "list my",
    "list all",
    "list the",
    "what are my",
    "what's on my",
    "whats on my",
    "what do i have",
    "view my",
];

/// Task-management vocabulary. Explicitly names the managed thing, so it
/// outranks alert vocabulary on ties.
const TASK_TERMS: &[&str] = &["todo", "to-do", "task", "checklist"];

/// Generic alert/scheduling vocabulary.
const REMINDER_TERMS: &[&str] = &["remind", "reminder", "alarm", "alert", "wake me", "schedule"];

/// Correspondence vocabulary.
const MESSAGE_TERMS: &[&str] = &["send a message", "send message", "text ", "email ", "message "];

/// Classifies an utterance into candidate intents.
///
/// Returns candidates ordered best-first. Always non-empty: when no
/// pattern group matches, the single `none` classification is returned,
/// which is a valid outcome meaning "general-purpose handling", not an
/// error.
pub fn classify(text: &str) -> Vec<Classification> {
    let lowered = text.to_lowercase();
    let slots = SlotValues::extract(text);
    let mut candidates: Vec<Classification> = Vec::new();

    // Listing first: a dedicated, higher-priority pattern set because
    // enumeration bypasses conversational handling entirely.
    if let Some(category) = detect_listing(&lowered) {
        let mut list_slots = slots.clone();
        list_slots.list_category = Some(category);
        candidates.push(Classification::new(IntentType::ListItems, 0.95, list_slots));
    }

    let has_task_vocab = contains_any(&lowered, TASK_TERMS);
    let has_reminder_vocab = contains_any(&lowered, REMINDER_TERMS);

    if has_task_vocab {
        let mut confidence = 0.6;
        if slots.task.is_some() {
            confidence += 0.2;
        }
        // Naming the list outright is as explicit as it gets.
        if contains_any(&lowered, &["todo list", "to-do list", "task list"]) {
            confidence += 0.15;
        }
        candidates.push(Classification::new(
            IntentType::ManageTask,
            confidence,
            slots.clone(),
        ));
    }

    if has_reminder_vocab {
        // Base below the task base: when both vocabularies appear the
        // more specific task reading must win the tie.
        let mut confidence = 0.55;
        if slots.time.is_some() {
            confidence += 0.2;
        }
        if contains_any(&lowered, &["remind me", "set a reminder", "set an alarm"]) {
            confidence += 0.15;
        }
        if has_task_vocab {
            confidence -= 0.2;
        }
        candidates.push(Classification::new(
            IntentType::ScheduleReminder,
            confidence,
            slots.clone(),
        ));
    }

    let recipient = RECIPIENT_RE
        .captures(text)
        .map(|caps| caps[1].to_lowercase())
        .filter(|name| !is_pronoun(name));
    if contains_any(&lowered, MESSAGE_TERMS) || recipient.is_some() {
        // "message" alone is weak; an actionable verb phrase is required.
        let actionable = contains_any(
            &lowered,
            &["send", "text ", "email ", "tell ", "let ", "write to"],
        );
        if actionable {
            let mut message_slots = slots.clone();
            message_slots.recipient = recipient;
            if let Some(caps) = BODY_RE.captures(text) {
                message_slots.body = Some(caps[1].trim().to_string());
            }
            let mut confidence = 0.6;
            if message_slots.recipient.is_some() {
                confidence += 0.2;
            }
            candidates.push(Classification::new(
                IntentType::SendMessage,
                confidence,
                message_slots,
            ));
        }
    }

    if candidates.is_empty() {
        return vec![Classification::none()];
    }

    // Best first. Sort is stable, so candidates pushed in table order
    // (listing, task, reminder, message) keep that order on exact ties -
    // the specific-before-generic tie-break.
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

fn detect_listing(lowered: &str) -> Option<ListCategory> {
    let verb = contains_any(lowered, LIST_VERBS);
    if !verb {
        return None;
    }
    if contains_any(lowered, &["reminder", "reminders", "alarm", "alarms"]) {
        return Some(ListCategory::Reminders);
    }
    if contains_any(lowered, &["task", "tasks", "todo", "todos", "to-do"]) {
        return Some(ListCategory::Tasks);
    }
    if contains_any(lowered, &["message", "messages", "email", "emails", "text", "texts"]) {
        return Some(ListCategory::Messages);
    }
    // Listing verb with no recognizable category falls through to the
    // ordinary pattern groups.
    None
}

fn contains_any(s: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| s.contains(t))
}

fn is_pronoun(word: &str) -> bool {
    matches!(word, "me" | "us" | "him" | "her" | "them" | "you" | "it")
}
