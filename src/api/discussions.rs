use crate::api::{page_count, pagination, require_max_len, TagsField};
use crate::database::{MongoDB, DISCUSSIONS};
use crate::middleware::AuthUser;
use crate::models::{Discussion, DiscussionCategory, ReputationReason};
use crate::services::reputation_service;
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn build_filter(query: &ListQuery) -> Document {
    let mut filter = doc! {};

    if let Some(category) = &query.category {
        filter.insert("category", category);
    }
    if let Some(search) = &query.search {
        let regex = doc! { "$regex": search, "$options": "i" };
        filter.insert(
            "$or",
            vec![
                doc! { "title": regex.clone() },
                doc! { "content": regex.clone() },
                doc! { "tags": regex },
            ],
        );
    }

    filter
}

/// GET /api/discussions - paginated list, pinned threads first by default
pub async fn get_discussions(
    query: web::Query<ListQuery>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let filter = build_filter(&query);
    let sort = match query.sort.as_deref() {
        Some("newest") => doc! { "createdAt": -1 },
        Some("views") | Some("popular") => doc! { "views": -1 },
        _ => doc! { "isPinned": -1, "createdAt": -1 },
    };
    let (page, limit, skip) = pagination(query.page, query.limit);

    let discussions: Vec<Discussion> = collection
        .find(filter.clone())
        .sort(sort)
        .skip(skip)
        .limit(limit)
        .await?
        .try_collect()
        .await?;

    let total = collection.count_documents(filter).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": discussions.len(),
        "total": total,
        "pages": page_count(total, limit),
        "currentPage": page,
        "data": discussions,
    })))
}

/// GET /api/discussions/{id} - single discussion, increments views
pub async fn get_discussion(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let discussion = db
        .collection::<Discussion>(DISCUSSIONS)
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": discussion,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateDiscussionRequest {
    pub title: String,
    pub content: String,
    pub category: DiscussionCategory,
    pub tags: Option<TagsField>,
}

/// POST /api/discussions - create; creator earns +2 reputation
pub async fn create_discussion(
    user: AuthUser,
    body: web::Json<CreateDiscussionRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().user_oid()?;
    let body = body.into_inner();

    require_max_len("title", &body.title, 200)?;
    require_max_len("content", &body.content, 5000)?;

    let mut discussion = Discussion::new(
        body.title.trim().to_string(),
        body.content,
        body.category,
        body.tags.map(TagsField::into_vec).unwrap_or_default(),
        user_id,
    );

    let result = db
        .collection::<Discussion>(DISCUSSIONS)
        .insert_one(&discussion)
        .await?;
    discussion.id = result.inserted_id.as_object_id();

    reputation_service::record(&db, user_id, ReputationReason::DiscussionCreated).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": discussion,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDiscussionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<DiscussionCategory>,
    pub tags: Option<TagsField>,
}

/// PUT /api/discussions/{id} - owner or admin only
pub async fn update_discussion(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateDiscussionRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let mut discussion = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    if discussion.created_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to update this discussion".to_string(),
        ));
    }

    let body = body.into_inner();
    if let Some(title) = body.title {
        require_max_len("title", &title, 200)?;
        discussion.title = title.trim().to_string();
    }
    if let Some(content) = body.content {
        require_max_len("content", &content, 5000)?;
        discussion.content = content;
    }
    if let Some(category) = body.category {
        discussion.category = category;
    }
    if let Some(tags) = body.tags {
        discussion.tags = tags.into_vec();
    }
    discussion.updated_at = BsonDateTime::now();

    collection
        .replace_one(doc! { "_id": id }, &discussion)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": discussion,
    })))
}

/// DELETE /api/discussions/{id} - hard delete, owner or admin only
pub async fn delete_discussion(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let discussion = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    if discussion.created_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this discussion".to_string(),
        ));
    }

    collection.delete_one(doc! { "_id": id }).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Discussion deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

/// POST /api/discussions/{id}/replies - rejected when the discussion is
/// closed; replier earns +1 reputation
pub async fn post_reply(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ReplyRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let body = body.into_inner();
    require_max_len("content", &body.content, 2000)?;

    let mut discussion = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    discussion.post_reply(body.content, user_id)?;

    collection
        .replace_one(doc! { "_id": id }, &discussion)
        .await?;

    reputation_service::record(&db, user_id, ReputationReason::ReplyPosted).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": discussion,
    })))
}

/// PUT /api/discussions/{id}/like - membership toggle, no reputation
/// side effect
pub async fn like_discussion(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let mut discussion = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    let outcome = discussion.toggle_like(&user_id);

    collection
        .replace_one(doc! { "_id": id }, &discussion)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "liked": outcome.liked,
        "likesCount": outcome.count,
    })))
}

/// PUT /api/discussions/{discussion_id}/replies/{reply_id}/like
pub async fn like_reply(
    user: AuthUser,
    path: web::Path<(String, String)>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let (discussion_id, reply_id) = path.into_inner();
    let discussion_id = ObjectId::parse_str(discussion_id)?;
    let reply_id = ObjectId::parse_str(reply_id)?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Discussion>(DISCUSSIONS);

    let mut discussion = collection
        .find_one(doc! { "_id": discussion_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".to_string()))?;

    let outcome = discussion
        .reply_mut(&reply_id)?
        .likes
        .toggle(&user_id.to_hex());
    discussion.updated_at = BsonDateTime::now();

    collection
        .replace_one(doc! { "_id": discussion_id }, &discussion)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "liked": outcome.liked,
        "likesCount": outcome.count,
    })))
}
