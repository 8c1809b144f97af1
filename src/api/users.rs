use crate::database::{MongoDB, QUESTIONS, RESOURCES};
use crate::middleware::AuthUser;
use crate::models::{BookmarkKind, Question, Resource};
use crate::services::user_service;
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

/// GET /api/users/{id} - public profile with contribution counts
pub async fn get_user_profile(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user = user_service::fetch_user(&db, &id).await?;

    let resources_count = db
        .collection::<Resource>(RESOURCES)
        .count_documents(doc! { "uploadedBy": id })
        .await?;
    let questions_count = db
        .collection::<Question>(QUESTIONS)
        .count_documents(doc! { "askedBy": id })
        .await?;
    // Questions containing at least one answer by this user.
    let answers_count = db
        .collection::<Question>(QUESTIONS)
        .count_documents(doc! { "answers.answeredBy": id })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "user": user.sanitized(),
            "stats": {
                "resources": resources_count,
                "questions": questions_count,
                "answers": answers_count,
            },
        },
    })))
}

/// GET /api/users/{id}/resources - everything this user uploaded
pub async fn get_user_resources(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let resources: Vec<Resource> = db
        .collection::<Resource>(RESOURCES)
        .find(doc! { "uploadedBy": id })
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": resources.len(),
        "data": resources,
    })))
}

/// GET /api/users/{id}/questions - everything this user asked
pub async fn get_user_questions(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let questions: Vec<Question> = db
        .collection::<Question>(QUESTIONS)
        .find(doc! { "askedBy": id })
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": questions.len(),
        "data": questions,
    })))
}

/// POST /api/users/bookmark/resource/{id} - explicit add, rejected when
/// already bookmarked. Validates that the resource exists.
pub async fn bookmark_resource(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let resource_id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;

    let mut account = user_service::fetch_user(&db, &user_id).await?;
    if account.is_bookmarked(BookmarkKind::Resource, &resource_id) {
        return Err(AppError::Validation(
            "Resource already bookmarked".to_string(),
        ));
    }

    let found = db
        .collection::<Resource>(RESOURCES)
        .find_one(doc! { "_id": resource_id })
        .await?;
    if found.is_none() {
        return Err(AppError::NotFound("Resource not found".to_string()));
    }

    account.toggle_bookmark(BookmarkKind::Resource, resource_id);
    user_service::persist_user(&db, &account).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Resource bookmarked successfully",
        "data": account.bookmarked_resources,
    })))
}

/// DELETE /api/users/bookmark/resource/{id} - explicit remove; no
/// existence check, removing a stale id is fine
pub async fn unbookmark_resource(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let resource_id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;

    let mut account = user_service::fetch_user(&db, &user_id).await?;
    if account.is_bookmarked(BookmarkKind::Resource, &resource_id) {
        account.toggle_bookmark(BookmarkKind::Resource, resource_id);
        user_service::persist_user(&db, &account).await?;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Resource removed from bookmarks",
        "data": account.bookmarked_resources,
    })))
}

/// GET /api/users/bookmarks/resources - the caller's bookmarked
/// resources, resolved to full documents. Orphaned ids (hard-deleted
/// resources) are silently skipped.
pub async fn get_bookmarked_resources(
    user: AuthUser,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().user_oid()?;
    let account = user_service::fetch_user(&db, &user_id).await?;

    let ids: Vec<ObjectId> = account.bookmarked_resources.iter().copied().collect();
    let resources: Vec<Resource> = db
        .collection::<Resource>(RESOURCES)
        .find(doc! { "_id": { "$in": ids } })
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": resources.len(),
        "data": resources,
    })))
}
