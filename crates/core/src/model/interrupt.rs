use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{LiveStreak, Topic, TopicQuizState};

/// A user intent that was blocked mid-flight and must be replayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterruptedAction {
    /// Open a topic (root search or chain navigation).
    ExploreTopic { topic: Topic },
    /// A branch option picked inside a branching dialogue.
    BranchChoice { topic: Topic, choice: String },
}

/// Everything a guest session needs to survive a login wall.
///
/// Captured at the moment an action requires authentication and destroyed as
/// soon as it has been restored; it must never outlive one interruption
/// cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSnapshot {
    pub streak: Option<LiveStreak>,
    pub quizzes: BTreeMap<Topic, TopicQuizState>,
    pub focus: Option<Topic>,
    pub cached_content: BTreeMap<Topic, String>,
    pub resume: Option<InterruptedAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let topic = Topic::new("cat").unwrap();
        let mut streak = LiveStreak::start(topic.clone());
        streak.extend(Topic::new("feline").unwrap());

        let snapshot = GuestSnapshot {
            streak: Some(streak),
            quizzes: BTreeMap::new(),
            focus: Some(topic.clone()),
            cached_content: BTreeMap::from([(topic.clone(), "A cat is...".to_string())]),
            resume: Some(InterruptedAction::ExploreTopic { topic }),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GuestSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn branch_choice_serializes_with_a_kind_tag() {
        let action = InterruptedAction::BranchChoice {
            topic: Topic::new("dragon").unwrap(),
            choice: "open the gate".to_string(),
        };

        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"kind\":\"branch_choice\""));
    }
}
