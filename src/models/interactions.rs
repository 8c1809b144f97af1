use crate::utils::error::AppError;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Shared embedded structures for per-user interactions: the vote ledger
/// (questions and answers), the like set (discussions and replies) and the
/// rating book (resources).
///
/// All three are keyed by the acting user's id rendered as a hex string,
/// which is what keeps the "one action per user per item" rule an O(1)
/// map lookup instead of a scan over an embedded array.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    fn delta(self) -> i64 {
        match self {
            VoteType::Upvote => 1,
            VoteType::Downvote => -1,
        }
    }
}

/// One vote per user, toggling on repeat and flipping on the opposite type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger(HashMap<String, VoteType>);

impl VoteLedger {
    /// Applies one vote action and returns the new net score.
    ///
    /// Semantics: no prior vote appends the entry; the same vote again
    /// retracts it; the opposite vote flips the entry in place. The score
    /// is always recounted from the ledger itself, so `votes` can never
    /// drift away from `votedBy`.
    pub fn apply(&mut self, user_id: &str, vote: VoteType) -> i64 {
        match self.0.get(user_id) {
            Some(existing) if *existing == vote => {
                self.0.remove(user_id);
            }
            _ => {
                self.0.insert(user_id.to_string(), vote);
            }
        }
        self.score()
    }

    /// Net score: +1 per upvote, -1 per downvote.
    pub fn score(&self) -> i64 {
        self.0.values().map(|v| v.delta()).sum()
    }

    pub fn vote_of(&self, user_id: &str) -> Option<VoteType> {
        self.0.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub count: usize,
}

/// Pure membership toggle over user ids. Duplicates are impossible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikeSet(HashSet<String>);

impl LikeSet {
    pub fn toggle(&mut self, user_id: &str) -> LikeOutcome {
        let liked = if self.0.contains(user_id) {
            self.0.remove(user_id);
            false
        } else {
            self.0.insert(user_id.to_string());
            true
        };
        LikeOutcome {
            liked,
            count: self.0.len(),
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.0.contains(user_id)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// At most one rating per user; resubmission overwrites in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingBook(HashMap<String, RatingEntry>);

impl RatingBook {
    /// Upserts the user's rating and returns the recomputed aggregates.
    /// Values outside [1, 5] are rejected before any mutation happens.
    pub fn submit(
        &mut self,
        user_id: &str,
        rating: u8,
        review: Option<String>,
    ) -> Result<RatingSummary, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Please provide a rating between 1 and 5".to_string(),
            ));
        }

        match self.0.get_mut(user_id) {
            Some(entry) => {
                // Resubmission keeps the original timestamp.
                entry.rating = rating;
                entry.review = review;
            }
            None => {
                self.0.insert(
                    user_id.to_string(),
                    RatingEntry {
                        rating,
                        review,
                        created_at: BsonDateTime::now(),
                    },
                );
            }
        }

        Ok(self.summary())
    }

    /// Full recompute over the embedded entries, rounded to one decimal.
    /// Bounded by the actor population, so the linear pass is fine.
    pub fn summary(&self) -> RatingSummary {
        if self.0.is_empty() {
            return RatingSummary {
                average_rating: 0.0,
                total_ratings: 0,
            };
        }
        let sum: u64 = self.0.values().map(|e| e.rating as u64).sum();
        let mean = sum as f64 / self.0.len() as f64;
        RatingSummary {
            average_rating: (mean * 10.0).round() / 10.0,
            total_ratings: self.0.len() as i64,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_toggle_returns_to_baseline() {
        let mut ledger = VoteLedger::default();
        assert_eq!(ledger.apply("alice", VoteType::Upvote), 1);
        assert_eq!(ledger.apply("alice", VoteType::Upvote), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn vote_flip_moves_score_by_two() {
        let mut ledger = VoteLedger::default();
        assert_eq!(ledger.apply("alice", VoteType::Upvote), 1);
        assert_eq!(ledger.apply("alice", VoteType::Downvote), -1);
        assert_eq!(ledger.vote_of("alice"), Some(VoteType::Downvote));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn one_entry_per_user() {
        let mut ledger = VoteLedger::default();
        ledger.apply("alice", VoteType::Upvote);
        ledger.apply("alice", VoteType::Downvote);
        ledger.apply("bob", VoteType::Upvote);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.score(), 0);
    }

    #[test]
    fn score_is_sum_of_signed_contributions() {
        let mut ledger = VoteLedger::default();
        ledger.apply("a", VoteType::Upvote);
        ledger.apply("b", VoteType::Upvote);
        ledger.apply("c", VoteType::Downvote);
        assert_eq!(ledger.score(), 1);
    }

    #[test]
    fn like_toggle_is_an_involution() {
        let mut likes = LikeSet::default();
        let first = likes.toggle("alice");
        assert!(first.liked);
        assert_eq!(first.count, 1);
        let second = likes.toggle("alice");
        assert!(!second.liked);
        assert_eq!(second.count, 0);
    }

    #[test]
    fn likes_have_set_semantics() {
        let mut likes = LikeSet::default();
        likes.toggle("alice");
        likes.toggle("bob");
        likes.toggle("alice");
        assert_eq!(likes.count(), 1);
        assert!(likes.contains("bob"));
        assert!(!likes.contains("alice"));
    }

    #[test]
    fn rating_mean_over_distinct_users() {
        let mut book = RatingBook::default();
        book.submit("a", 5, None).unwrap();
        book.submit("b", 4, None).unwrap();
        book.submit("c", 2, None).unwrap();
        let summary = book.summary();
        assert_eq!(summary.total_ratings, 3);
        // mean(5, 4, 2) = 3.666..., rounded to one decimal
        assert_eq!(summary.average_rating, 3.7);
    }

    #[test]
    fn rating_resubmission_replaces_not_appends() {
        let mut book = RatingBook::default();
        book.submit("a", 2, Some("meh".into())).unwrap();
        let summary = book.submit("a", 5, Some("actually great".into())).unwrap();
        assert_eq!(summary.total_ratings, 1);
        assert_eq!(summary.average_rating, 5.0);
    }

    #[test]
    fn out_of_range_rating_rejected_before_mutation() {
        let mut book = RatingBook::default();
        assert!(book.submit("a", 0, None).is_err());
        assert!(book.submit("a", 6, None).is_err());
        assert!(book.is_empty());
        let summary = book.summary();
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_ratings, 0);
    }

    #[test]
    fn empty_book_resets_aggregates_to_zero() {
        let book = RatingBook::default();
        assert_eq!(
            book.summary(),
            RatingSummary {
                average_rating: 0.0,
                total_ratings: 0
            }
        );
    }
}
