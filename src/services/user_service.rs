use crate::database::{MongoDB, QUESTIONS, RESOURCES, USERS};
use crate::models::{BookmarkKind, User};
use crate::utils::error::AppError;
use mongodb::bson::{doc, oid::ObjectId, Document};

pub async fn fetch_user(db: &MongoDB, id: &ObjectId) -> Result<User, AppError> {
    db.collection::<User>(USERS)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn persist_user(db: &MongoDB, user: &User) -> Result<(), AppError> {
    let id = user
        .id
        .ok_or_else(|| AppError::Database("User has no id".to_string()))?;
    db.collection::<User>(USERS)
        .replace_one(doc! { "_id": id }, user)
        .await?;
    Ok(())
}

/// Toggles a bookmark on the acting user's registry. Adding validates
/// that the target entity exists; removing does not.
pub async fn toggle_bookmark(
    db: &MongoDB,
    user_id: &ObjectId,
    kind: BookmarkKind,
    target: &ObjectId,
) -> Result<bool, AppError> {
    let mut user = fetch_user(db, user_id).await?;

    if !user.is_bookmarked(kind, target) {
        ensure_target_exists(db, kind, target).await?;
    }

    let bookmarked = user.toggle_bookmark(kind, *target);
    persist_user(db, &user).await?;
    Ok(bookmarked)
}

async fn ensure_target_exists(
    db: &MongoDB,
    kind: BookmarkKind,
    target: &ObjectId,
) -> Result<(), AppError> {
    let (collection, label) = match kind {
        BookmarkKind::Resource => (RESOURCES, "Resource"),
        BookmarkKind::Question => (QUESTIONS, "Question"),
    };
    let found = db
        .collection::<Document>(collection)
        .find_one(doc! { "_id": target })
        .await?;
    if found.is_none() {
        return Err(AppError::NotFound(format!("{} not found", label)));
    }
    Ok(())
}
