use super::interactions::{VoteLedger, VoteType};
use super::Category;
use crate::utils::error::AppError;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user: ObjectId,
    pub content: String,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub answered_by: ObjectId,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub voted_by: VoteLedger,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: BsonDateTime,
}

impl Answer {
    pub fn new(content: String, answered_by: ObjectId) -> Self {
        Answer {
            id: ObjectId::new(),
            content,
            answered_by,
            votes: 0,
            voted_by: VoteLedger::default(),
            is_accepted: false,
            comments: vec![],
            created_at: BsonDateTime::now(),
        }
    }

    pub fn apply_vote(&mut self, user_id: &ObjectId, vote: VoteType) -> i64 {
        self.votes = self.voted_by.apply(&user_id.to_hex(), vote);
        self.votes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub asked_by: ObjectId,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub views: i64,
    /// Derived from `votedBy`; recounted on every vote so the two can
    /// never drift apart.
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub voted_by: VoteLedger,
    #[serde(default)]
    pub has_accepted_answer: bool,
    #[serde(default)]
    pub is_closed: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Question {
    pub fn new(
        title: String,
        content: String,
        category: Category,
        tags: Vec<String>,
        asked_by: ObjectId,
    ) -> Self {
        let now = BsonDateTime::now();
        Question {
            id: None,
            title,
            content,
            category,
            tags,
            asked_by,
            answers: vec![],
            views: 0,
            votes: 0,
            voted_by: VoteLedger::default(),
            has_accepted_answer: false,
            is_closed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_vote(&mut self, user_id: &ObjectId, vote: VoteType) -> i64 {
        self.votes = self.voted_by.apply(&user_id.to_hex(), vote);
        self.updated_at = BsonDateTime::now();
        self.votes
    }

    /// Appends an answer unless the question is closed.
    pub fn post_answer(
        &mut self,
        content: String,
        answered_by: ObjectId,
    ) -> Result<&Answer, AppError> {
        if self.is_closed {
            return Err(AppError::Closed(
                "This question is closed for answers".to_string(),
            ));
        }
        self.answers.push(Answer::new(content, answered_by));
        self.updated_at = BsonDateTime::now();
        Ok(self.answers.last().unwrap())
    }

    pub fn answer_mut(&mut self, answer_id: &ObjectId) -> Result<&mut Answer, AppError> {
        self.answers
            .iter_mut()
            .find(|a| a.id == *answer_id)
            .ok_or_else(|| AppError::NotFound("Answer not found".to_string()))
    }

    /// Accept-answer transition. Only the asker may trigger it; every
    /// answer is forced unaccepted before the target is marked, so at
    /// most one answer is ever accepted. Returns the accepted answer's
    /// author for the reputation award.
    pub fn accept_answer(
        &mut self,
        actor: &ObjectId,
        answer_id: &ObjectId,
    ) -> Result<ObjectId, AppError> {
        if self.asked_by != *actor {
            return Err(AppError::Forbidden(
                "Only the question owner can accept answers".to_string(),
            ));
        }
        if !self.answers.iter().any(|a| a.id == *answer_id) {
            return Err(AppError::NotFound("Answer not found".to_string()));
        }

        for answer in &mut self.answers {
            answer.is_accepted = answer.id == *answer_id;
        }
        self.has_accepted_answer = true;
        self.updated_at = BsonDateTime::now();

        let author = self
            .answers
            .iter()
            .find(|a| a.id == *answer_id)
            .map(|a| a.answered_by)
            .unwrap();
        Ok(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question(asker: ObjectId) -> Question {
        Question::new(
            "How does ownership work?".to_string(),
            "Confused about moves vs borrows".to_string(),
            Category::ComputerScience,
            vec!["rust".to_string()],
            asker,
        )
    }

    #[test]
    fn voting_twice_returns_to_baseline() {
        let asker = ObjectId::new();
        let voter = ObjectId::new();
        let mut question = sample_question(asker);

        assert_eq!(question.apply_vote(&voter, VoteType::Upvote), 1);
        assert_eq!(question.apply_vote(&voter, VoteType::Upvote), 0);
        assert!(question.voted_by.is_empty());
    }

    #[test]
    fn switching_vote_moves_score_by_two() {
        let mut question = sample_question(ObjectId::new());
        let voter = ObjectId::new();

        assert_eq!(question.apply_vote(&voter, VoteType::Upvote), 1);
        assert_eq!(question.apply_vote(&voter, VoteType::Downvote), -1);
    }

    #[test]
    fn closed_question_rejects_answers() {
        let mut question = sample_question(ObjectId::new());
        question.is_closed = true;

        let err = question
            .post_answer("too late".to_string(), ObjectId::new())
            .unwrap_err();
        assert!(matches!(err, AppError::Closed(_)));
        assert!(question.answers.is_empty());
    }

    #[test]
    fn accepting_a_then_b_leaves_exactly_one_accepted() {
        let asker = ObjectId::new();
        let mut question = sample_question(asker);
        question
            .post_answer("first".to_string(), ObjectId::new())
            .unwrap();
        question
            .post_answer("second".to_string(), ObjectId::new())
            .unwrap();
        let a = question.answers[0].id;
        let b = question.answers[1].id;

        question.accept_answer(&asker, &a).unwrap();
        assert!(question.has_accepted_answer);

        question.accept_answer(&asker, &b).unwrap();
        assert!(question.has_accepted_answer);
        let accepted: Vec<_> = question.answers.iter().filter(|x| x.is_accepted).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, b);
    }

    #[test]
    fn only_asker_can_accept() {
        let asker = ObjectId::new();
        let stranger = ObjectId::new();
        let mut question = sample_question(asker);
        question
            .post_answer("hi".to_string(), ObjectId::new())
            .unwrap();
        let answer_id = question.answers[0].id;

        let err = question.accept_answer(&stranger, &answer_id).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(!question.has_accepted_answer);
    }

    #[test]
    fn accept_returns_author_even_when_reaccepting() {
        // Re-accepting hands back the author again; the caller re-awards
        // the +10 with no de-duplication. Known quirk of the accept flow.
        let asker = ObjectId::new();
        let author = ObjectId::new();
        let mut question = sample_question(asker);
        question.post_answer("only".to_string(), author).unwrap();
        let answer_id = question.answers[0].id;

        assert_eq!(question.accept_answer(&asker, &answer_id).unwrap(), author);
        assert_eq!(question.accept_answer(&asker, &answer_id).unwrap(), author);
    }

    #[test]
    fn accepting_missing_answer_is_not_found() {
        let asker = ObjectId::new();
        let mut question = sample_question(asker);
        let err = question
            .accept_answer(&asker, &ObjectId::new())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn answer_votes_are_independent_of_question_votes() {
        let mut question = sample_question(ObjectId::new());
        let voter = ObjectId::new();
        question
            .post_answer("answer".to_string(), ObjectId::new())
            .unwrap();

        question.apply_vote(&voter, VoteType::Upvote);
        let answer_id = question.answers[0].id;
        let answer = question.answer_mut(&answer_id).unwrap();
        assert_eq!(answer.apply_vote(&voter, VoteType::Downvote), -1);
        assert_eq!(question.votes, 1);
    }
}
