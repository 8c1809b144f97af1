use super::interactions::RatingBook;
use super::Category;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Pdf,
    Document,
    Link,
    Video,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Intermediate
    }
}

pub fn default_thumbnail() -> String {
    "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub resource_type: ResourceType,
    pub file_url: String,
    #[serde(default = "default_thumbnail")]
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
    pub uploaded_by: ObjectId,
    #[serde(default)]
    pub ratings: RatingBook,
    /// Derived from `ratings`, one decimal. Recomputed on every rating
    /// mutation, never adjusted incrementally.
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: i64,
    #[serde(default)]
    pub downloads: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default = "default_is_approved")]
    pub is_approved: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

fn default_is_approved() -> bool {
    true
}

impl Resource {
    /// Upserts one user's rating and refreshes the derived aggregates.
    pub fn submit_rating(
        &mut self,
        user_id: &ObjectId,
        rating: u8,
        review: Option<String>,
    ) -> Result<(), crate::utils::error::AppError> {
        let summary = self.ratings.submit(&user_id.to_hex(), rating, review)?;
        self.average_rating = summary.average_rating;
        self.total_ratings = summary.total_ratings;
        self.updated_at = BsonDateTime::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resource() -> Resource {
        let now = BsonDateTime::now();
        Resource {
            id: Some(ObjectId::new()),
            title: "Intro to Graph Theory".to_string(),
            description: "Lecture notes".to_string(),
            category: Category::Mathematics,
            tags: vec!["graphs".to_string()],
            resource_type: ResourceType::Pdf,
            file_url: "/uploads/graphs.pdf".to_string(),
            thumbnail: default_thumbnail(),
            file_name: None,
            file_size: None,
            difficulty_level: DifficultyLevel::default(),
            uploaded_by: ObjectId::new(),
            ratings: RatingBook::default(),
            average_rating: 0.0,
            total_ratings: 0,
            downloads: 0,
            views: 0,
            is_approved: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rating_refreshes_derived_aggregates() {
        let mut resource = sample_resource();
        let alice = ObjectId::new();
        let bob = ObjectId::new();

        resource.submit_rating(&alice, 4, None).unwrap();
        resource.submit_rating(&bob, 5, Some("great".into())).unwrap();

        assert_eq!(resource.total_ratings, 2);
        assert_eq!(resource.average_rating, 4.5);
    }

    #[test]
    fn re_rating_same_user_keeps_count() {
        let mut resource = sample_resource();
        let alice = ObjectId::new();

        resource.submit_rating(&alice, 2, None).unwrap();
        resource.submit_rating(&alice, 4, None).unwrap();

        assert_eq!(resource.total_ratings, 1);
        assert_eq!(resource.average_rating, 4.0);
    }

    #[test]
    fn invalid_rating_leaves_resource_untouched() {
        let mut resource = sample_resource();
        let alice = ObjectId::new();

        assert!(resource.submit_rating(&alice, 6, None).is_err());
        assert!(resource.ratings.is_empty());
        assert_eq!(resource.average_rating, 0.0);
        assert_eq!(resource.total_ratings, 0);
    }
}
