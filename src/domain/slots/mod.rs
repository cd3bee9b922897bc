//! Slot extraction - deterministic text-pattern utilities.
//!
//! Slots are the named pieces of information an intent needs (a time, a
//! task description, a priority). Extractors are pure functions that return
//! "absent" rather than erroring when nothing matches.

mod priority;
mod task;
mod time;

pub use priority::{extract_priority, Priority};
pub use task::extract_task;
pub use time::{
    extract_time, AmbiguityPolicy, AppliedAssumption, ClockTime, DayRef, Meridiem, ResolvedTime,
    TimeExpr,
};

use serde::{Deserialize, Serialize};

/// Name of a slot an intent may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Time,
    Task,
    Priority,
    Recipient,
    Body,
    ListCategory,
}

impl SlotName {
    /// Returns the canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Time => "time",
            SlotName::Task => "task",
            SlotName::Priority => "priority",
            SlotName::Recipient => "recipient",
            SlotName::Body => "body",
            SlotName::ListCategory => "list_category",
        }
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of items a listing request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    Reminders,
    Tasks,
    Messages,
}

impl ListCategory {
    /// Returns the plural lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListCategory::Reminders => "reminders",
            ListCategory::Tasks => "tasks",
            ListCategory::Messages => "messages",
        }
    }
}

impl std::fmt::Display for ListCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The slots extracted from one utterance.
///
/// Serializable so it can ride along in a pending request's partial
/// context and be merged with slots from later turns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_category: Option<ListCategory>,
}

impl SlotValues {
    /// Runs every extractor against the text.
    pub fn extract(text: &str) -> Self {
        Self {
            time: extract_time(text),
            task: extract_task(text),
            priority: extract_priority(text),
            recipient: None,
            body: None,
            list_category: None,
        }
    }

    /// True when no slot carries a value.
    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.task.is_none()
            && self.priority.is_none()
            && self.recipient.is_none()
            && self.body.is_none()
            && self.list_category.is_none()
    }

    /// True when this set satisfies the named slot.
    ///
    /// A time expression only satisfies the time slot when it names an
    /// actual moment; a bare day reference is partial context, not a value.
    pub fn provides(&self, name: SlotName) -> bool {
        match name {
            SlotName::Time => self.time.as_ref().map(|t| t.is_complete()).unwrap_or(false),
            SlotName::Task => self.task.is_some(),
            SlotName::Priority => self.priority.is_some(),
            SlotName::Recipient => self.recipient.is_some(),
            SlotName::Body => self.body.is_some(),
            SlotName::ListCategory => self.list_category.is_some(),
        }
    }

    /// Fills any empty slot in `self` from `other`.
    ///
    /// Used when a later turn supplies missing slots: the newer values in
    /// `self` win, older partial context fills the gaps. A day-only time
    /// in `other` combines with a clock-only time in `self`.
    pub fn fill_missing_from(&mut self, other: &SlotValues) {
        if let (Some(mine), Some(theirs)) = (self.time.as_mut(), other.time.as_ref()) {
            if mine.day.is_none() {
                mine.day = theirs.day;
            }
        } else if self.time.is_none() {
            self.time = other.time.clone();
        }
        if self.task.is_none() {
            self.task = other.task.clone();
        }
        if self.priority.is_none() {
            self.priority = other.priority;
        }
        if self.recipient.is_none() {
            self.recipient = other.recipient.clone();
        }
        if self.body.is_none() {
            self.body = other.body.clone();
        }
        if self.list_category.is_none() {
            self.list_category = other.list_category;
        }
    }
}
