use super::interactions::{LikeOutcome, LikeSet};
use crate::utils::error::AppError;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Discussion boards have their own category set, separate from the
/// academic categories used by resources and questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscussionCategory {
    General,
    #[serde(rename = "Study Tips")]
    StudyTips,
    #[serde(rename = "Career Advice")]
    CareerAdvice,
    #[serde(rename = "Project Ideas")]
    ProjectIdeas,
    #[serde(rename = "Exam Preparation")]
    ExamPreparation,
    Technology,
    Research,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub author: ObjectId,
    #[serde(default)]
    pub likes: LikeSet,
    pub created_at: BsonDateTime,
}

impl Reply {
    pub fn new(content: String, author: ObjectId) -> Self {
        Reply {
            id: ObjectId::new(),
            content,
            author,
            likes: LikeSet::default(),
            created_at: BsonDateTime::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub category: DiscussionCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: ObjectId,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub likes: LikeSet,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_closed: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Discussion {
    pub fn new(
        title: String,
        content: String,
        category: DiscussionCategory,
        tags: Vec<String>,
        created_by: ObjectId,
    ) -> Self {
        let now = BsonDateTime::now();
        Discussion {
            id: None,
            title,
            content,
            category,
            tags,
            created_by,
            replies: vec![],
            likes: LikeSet::default(),
            views: 0,
            is_pinned: false,
            is_closed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn toggle_like(&mut self, user_id: &ObjectId) -> LikeOutcome {
        self.updated_at = BsonDateTime::now();
        self.likes.toggle(&user_id.to_hex())
    }

    /// Appends a reply unless the discussion is closed.
    pub fn post_reply(&mut self, content: String, author: ObjectId) -> Result<&Reply, AppError> {
        if self.is_closed {
            return Err(AppError::Closed("This discussion is closed".to_string()));
        }
        self.replies.push(Reply::new(content, author));
        self.updated_at = BsonDateTime::now();
        Ok(self.replies.last().unwrap())
    }

    pub fn reply_mut(&mut self, reply_id: &ObjectId) -> Result<&mut Reply, AppError> {
        self.replies
            .iter_mut()
            .find(|r| r.id == *reply_id)
            .ok_or_else(|| AppError::NotFound("Reply not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_discussion() -> Discussion {
        Discussion::new(
            "Best spaced-repetition setups?".to_string(),
            "What works for you?".to_string(),
            DiscussionCategory::StudyTips,
            vec![],
            ObjectId::new(),
        )
    }

    #[test]
    fn like_unlike_round_trip() {
        let mut discussion = sample_discussion();
        let user = ObjectId::new();

        let first = discussion.toggle_like(&user);
        assert!(first.liked);
        assert_eq!(first.count, 1);

        let second = discussion.toggle_like(&user);
        assert!(!second.liked);
        assert_eq!(second.count, 0);
    }

    #[test]
    fn closed_discussion_rejects_replies() {
        let mut discussion = sample_discussion();
        discussion.is_closed = true;

        let err = discussion
            .post_reply("late".to_string(), ObjectId::new())
            .unwrap_err();
        assert!(matches!(err, AppError::Closed(_)));
        assert!(discussion.replies.is_empty());
    }

    #[test]
    fn reply_likes_are_per_reply() {
        let mut discussion = sample_discussion();
        let user = ObjectId::new();
        discussion
            .post_reply("first".to_string(), ObjectId::new())
            .unwrap();
        discussion
            .post_reply("second".to_string(), ObjectId::new())
            .unwrap();
        let first_id = discussion.replies[0].id;

        let reply = discussion.reply_mut(&first_id).unwrap();
        let outcome = reply.likes.toggle(&user.to_hex());
        assert!(outcome.liked);
        assert_eq!(discussion.replies[1].likes.count(), 0);
    }

    #[test]
    fn missing_reply_is_not_found() {
        let mut discussion = sample_discussion();
        let err = discussion.reply_mut(&ObjectId::new()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
