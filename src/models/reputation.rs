use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Qualifying actions and their fixed point awards. Votes, likes,
/// ratings and bookmarks carry no award, and there is no penalty path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationReason {
    QuestionCreated,
    DiscussionCreated,
    ReplyPosted,
    AnswerPosted,
    AnswerAccepted,
    ResourceUploaded,
    ResourceDownloaded,
}

impl ReputationReason {
    pub fn delta(self) -> i64 {
        match self {
            ReputationReason::QuestionCreated => 2,
            ReputationReason::DiscussionCreated => 2,
            ReputationReason::ReplyPosted => 1,
            ReputationReason::AnswerPosted => 3,
            ReputationReason::AnswerAccepted => 10,
            ReputationReason::ResourceUploaded => 5,
            ReputationReason::ResourceDownloaded => 1,
        }
    }
}

/// Outbox record for a pending reputation award. The triggering handler
/// appends one of these after its own document write commits; the
/// background worker applies it to the user document and marks it done.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub delta: i64,
    pub reason: ReputationReason,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub attempts: i32,
    pub created_at: BsonDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<BsonDateTime>,
}

impl ReputationEvent {
    pub fn new(user: ObjectId, reason: ReputationReason) -> Self {
        ReputationEvent {
            id: None,
            user,
            delta: reason.delta(),
            reason,
            applied: false,
            attempts: 0,
            created_at: BsonDateTime::now(),
            applied_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_table_is_fixed() {
        assert_eq!(ReputationReason::QuestionCreated.delta(), 2);
        assert_eq!(ReputationReason::DiscussionCreated.delta(), 2);
        assert_eq!(ReputationReason::ReplyPosted.delta(), 1);
        assert_eq!(ReputationReason::AnswerPosted.delta(), 3);
        assert_eq!(ReputationReason::AnswerAccepted.delta(), 10);
        assert_eq!(ReputationReason::ResourceUploaded.delta(), 5);
        assert_eq!(ReputationReason::ResourceDownloaded.delta(), 1);
    }

    #[test]
    fn no_negative_deltas_exist() {
        let all = [
            ReputationReason::QuestionCreated,
            ReputationReason::DiscussionCreated,
            ReputationReason::ReplyPosted,
            ReputationReason::AnswerPosted,
            ReputationReason::AnswerAccepted,
            ReputationReason::ResourceUploaded,
            ReputationReason::ResourceDownloaded,
        ];
        assert!(all.iter().all(|r| r.delta() > 0));
    }

    #[test]
    fn new_event_starts_pending() {
        let event = ReputationEvent::new(ObjectId::new(), ReputationReason::AnswerPosted);
        assert!(!event.applied);
        assert_eq!(event.attempts, 0);
        assert_eq!(event.delta, 3);
    }
}
