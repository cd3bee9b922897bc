//! Intent classification types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::HandlerId;
use crate::domain::slots::{ListCategory, SlotName, SlotValues};

/// Closed set of domain intents an utterance can classify to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    /// Schedule a reminder or alarm.
    ScheduleReminder,
    /// Add or change an entry on the task list.
    ManageTask,
    /// Send a message to someone.
    SendMessage,
    /// Enumerate existing items ("show me all my X").
    ListItems,
    /// No pattern matched; general-purpose handling applies.
    None,
}

impl IntentType {
    /// Returns the canonical snake_case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::ScheduleReminder => "schedule_reminder",
            IntentType::ManageTask => "manage_task",
            IntentType::SendMessage => "send_message",
            IntentType::ListItems => "list_items",
            IntentType::None => "none",
        }
    }

    /// Slots that must be present before the owning handler can complete
    /// the request without a follow-up question.
    pub fn required_slots(&self) -> &'static [SlotName] {
        match self {
            IntentType::ScheduleReminder => &[SlotName::Time],
            IntentType::ManageTask => &[SlotName::Task],
            IntentType::SendMessage => &[SlotName::Recipient],
            // A listing classification always carries its category.
            IntentType::ListItems => &[],
            IntentType::None => &[],
        }
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a listing category to the handler that owns those items.
pub fn handler_for_category(category: ListCategory) -> HandlerId {
    match category {
        ListCategory::Reminders => HandlerId::scheduling(),
        ListCategory::Tasks => HandlerId::tasks(),
        ListCategory::Messages => HandlerId::correspondence(),
    }
}

/// One candidate reading of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The classified intent.
    pub intent: IntentType,
    /// Match strength in [0, 1]; deterministic for identical input.
    pub confidence: f32,
    /// Slots extracted from the utterance.
    pub slots: SlotValues,
}

impl Classification {
    /// Creates a classification.
    pub fn new(intent: IntentType, confidence: f32, slots: SlotValues) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            slots,
        }
    }

    /// The `none` classification: valid output meaning "no specialized
    /// routing", not an error.
    pub fn none() -> Self {
        Self::new(IntentType::None, 0.0, SlotValues::default())
    }

    /// Required slots this classification is still missing.
    pub fn missing_slots(&self) -> Vec<SlotName> {
        self.intent
            .required_slots()
            .iter()
            .copied()
            .filter(|name| !self.slots.provides(*name))
            .collect()
    }

    /// True when every mandatory slot for the intent is present.
    pub fn has_required_info(&self) -> bool {
        self.missing_slots().is_empty()
    }

    /// The handler that owns this intent, if any.
    ///
    /// For listings the owner follows the category; `none` has no owner.
    pub fn target_handler(&self) -> Option<HandlerId> {
        match self.intent {
            IntentType::ScheduleReminder => Some(HandlerId::scheduling()),
            IntentType::ManageTask => Some(HandlerId::tasks()),
            IntentType::SendMessage => Some(HandlerId::correspondence()),
            IntentType::ListItems => self.slots.list_category.map(handler_for_category),
            IntentType::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_slots_match_intent() {
        assert_eq!(
            IntentType::ScheduleReminder.required_slots(),
            &[SlotName::Time]
        );
        assert_eq!(IntentType::ManageTask.required_slots(), &[SlotName::Task]);
        assert!(IntentType::None.required_slots().is_empty());
    }

    #[test]
    fn missing_slots_reflect_extraction() {
        let slots = SlotValues::extract("set a reminder for tomorrow");
        let c = Classification::new(IntentType::ScheduleReminder, 0.8, slots);
        assert_eq!(c.missing_slots(), vec![SlotName::Time]);
        assert!(!c.has_required_info());
    }

    #[test]
    fn complete_slots_have_required_info() {
        let slots = SlotValues::extract("remind me to stretch at 6am");
        let c = Classification::new(IntentType::ScheduleReminder, 0.8, slots);
        assert!(c.has_required_info());
    }

    #[test]
    fn target_handler_follows_intent() {
        let c = Classification::new(IntentType::ManageTask, 0.8, SlotValues::default());
        assert_eq!(c.target_handler(), Some(HandlerId::tasks()));
        assert_eq!(Classification::none().target_handler(), None);
    }

    #[test]
    fn listing_target_follows_category() {
        let mut slots = SlotValues::default();
        slots.list_category = Some(ListCategory::Reminders);
        let c = Classification::new(IntentType::ListItems, 0.9, slots);
        assert_eq!(c.target_handler(), Some(HandlerId::scheduling()));
    }

    #[test]
    fn confidence_is_clamped() {
        let c = Classification::new(IntentType::ManageTask, 1.7, SlotValues::default());
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn intent_serializes_to_snake_case() {
        let json = serde_json::to_string(&IntentType::ScheduleReminder).unwrap();
        assert_eq!(json, "\"schedule_reminder\"");
    }
}
