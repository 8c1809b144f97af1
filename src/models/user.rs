use crate::utils::error::AppError;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Moderator,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            bio: None,
            avatar: default_avatar(),
            interests: vec![],
            expertise: vec![],
            institution: None,
            year_of_study: None,
        }
    }
}

fn default_avatar() -> String {
    "default-avatar.png".to_string()
}

fn default_is_active() -> bool {
    true
}

/// Which bookmark set a toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkKind {
    Resource,
    Question,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    /// bcrypt hash; stripped via `sanitized()` before anything leaves
    /// the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub bookmarked_resources: HashSet<ObjectId>,
    #[serde(default)]
    pub bookmarked_questions: HashSet<ObjectId>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = BsonDateTime::now();
        User {
            id: None,
            username,
            email,
            password: Some(password_hash),
            profile: Profile::default(),
            reputation: 0,
            bookmarked_resources: HashSet::new(),
            bookmarked_questions: HashSet::new(),
            role: Role::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Drops the password hash so the document can be serialized into a
    /// response body.
    pub fn sanitized(mut self) -> Self {
        self.password = None;
        self
    }

    /// Set-toggle over the bookmark registry. Returns true when the id is
    /// now bookmarked, false when the toggle removed it.
    pub fn toggle_bookmark(&mut self, kind: BookmarkKind, target: ObjectId) -> bool {
        let set = match kind {
            BookmarkKind::Resource => &mut self.bookmarked_resources,
            BookmarkKind::Question => &mut self.bookmarked_questions,
        };
        if set.remove(&target) {
            false
        } else {
            set.insert(target);
            true
        }
    }

    pub fn is_bookmarked(&self, kind: BookmarkKind, target: &ObjectId) -> bool {
        match kind {
            BookmarkKind::Resource => self.bookmarked_resources.contains(target),
            BookmarkKind::Question => self.bookmarked_questions.contains(target),
        }
    }
}

/// Field constraints applied at registration time.
pub fn validate_new_user(username: &str, email: &str, password: &str) -> Result<(), AppError> {
    if username.trim().len() < 3 || username.trim().len() > 30 {
        return Err(AppError::Validation(
            "Username must be between 3 and 30 characters".to_string(),
        ));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(AppError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "alice".to_string(),
            "alice@example.edu".to_string(),
            "$2b$10$hash".to_string(),
        )
    }

    #[test]
    fn bookmark_toggle_is_an_involution() {
        let mut user = sample_user();
        let target = ObjectId::new();

        assert!(user.toggle_bookmark(BookmarkKind::Resource, target));
        assert!(user.is_bookmarked(BookmarkKind::Resource, &target));

        assert!(!user.toggle_bookmark(BookmarkKind::Resource, target));
        assert!(!user.is_bookmarked(BookmarkKind::Resource, &target));
    }

    #[test]
    fn bookmark_sets_are_independent() {
        let mut user = sample_user();
        let target = ObjectId::new();

        user.toggle_bookmark(BookmarkKind::Question, target);
        assert!(user.is_bookmarked(BookmarkKind::Question, &target));
        assert!(!user.is_bookmarked(BookmarkKind::Resource, &target));
    }

    #[test]
    fn sanitized_drops_password() {
        let user = sample_user().sanitized();
        assert!(user.password.is_none());
    }

    #[test]
    fn registration_constraints() {
        assert!(validate_new_user("al", "a@b.com", "secret1").is_err());
        assert!(validate_new_user("alice", "not-an-email", "secret1").is_err());
        assert!(validate_new_user("alice", "a@b.com", "short").is_err());
        assert!(validate_new_user("alice", "a@b.com", "secret1").is_ok());
    }
}
