use crate::api::{page_count, pagination, require_max_len, TagsField};
use crate::database::{MongoDB, RESOURCES};
use crate::middleware::AuthUser;
use crate::models::{
    default_thumbnail, BookmarkKind, Category, DifficultyLevel, ReputationReason, Resource,
    ResourceType,
};
use crate::services::{reputation_service, user_service};
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::ReturnDocument;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub difficulty: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn build_filter(query: &ListQuery) -> Document {
    let mut filter = doc! { "isApproved": true };

    if let Some(category) = &query.category {
        filter.insert("category", category);
    }
    if let Some(tags) = &query.tags {
        let tags: Vec<String> = tags.split(',').map(|t| t.trim().to_string()).collect();
        filter.insert("tags", doc! { "$in": tags });
    }
    if let Some(difficulty) = &query.difficulty {
        filter.insert("difficultyLevel", difficulty);
    }
    if let Some(search) = &query.search {
        let regex = doc! { "$regex": search, "$options": "i" };
        filter.insert(
            "$or",
            vec![
                doc! { "title": regex.clone() },
                doc! { "description": regex.clone() },
                doc! { "tags": regex },
            ],
        );
    }

    filter
}

/// GET /api/resources - paginated, filterable list
pub async fn get_resources(
    query: web::Query<ListQuery>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let collection = db.collection::<Resource>(RESOURCES);

    let filter = build_filter(&query);
    let sort = match query.sort.as_deref() {
        Some("popular") => doc! { "downloads": -1 },
        Some("rating") => doc! { "averageRating": -1 },
        _ => doc! { "createdAt": -1 },
    };
    let (page, limit, skip) = pagination(query.page, query.limit);

    let resources: Vec<Resource> = collection
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
        "count": resources.len(),
        "total": total,
        "pages": page_count(total, limit),
        "currentPage": page,
        "data": resources,
    })))
}

/// GET /api/resources/{id} - single resource, increments views
pub async fn get_resource(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let resource = db
        .collection::<Resource>(RESOURCES)
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": resource,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub tags: Option<TagsField>,
    pub resource_type: ResourceType,
    pub file_url: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
}

/// POST /api/resources - create; uploader earns +5 reputation
pub async fn create_resource(
    user: AuthUser,
    body: web::Json<CreateResourceRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().user_oid()?;
    let body = body.into_inner();

    require_max_len("title", &body.title, 200)?;
    require_max_len("description", &body.description, 2000)?;
    let file_url = body
        .file_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Please provide a file or URL".to_string()))?;

    let now = BsonDateTime::now();
    let mut resource = Resource {
        id: None,
        title: body.title.trim().to_string(),
        description: body.description,
        category: body.category,
        tags: body.tags.map(TagsField::into_vec).unwrap_or_default(),
        resource_type: body.resource_type,
        file_url,
        thumbnail: default_thumbnail(),
        file_name: None,
        file_size: None,
        difficulty_level: body.difficulty_level.unwrap_or_default(),
        uploaded_by: user_id,
        ratings: Default::default(),
        average_rating: 0.0,
        total_ratings: 0,
        downloads: 0,
        views: 0,
        is_approved: true,
        created_at: now,
        updated_at: now,
    };

    let result = db
        .collection::<Resource>(RESOURCES)
        .insert_one(&resource)
        .await?;
    resource.id = result.inserted_id.as_object_id();

    reputation_service::record(&db, user_id, ReputationReason::ResourceUploaded).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": resource,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<TagsField>,
    pub difficulty_level: Option<DifficultyLevel>,
}

/// PUT /api/resources/{id} - owner or admin only
pub async fn update_resource(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateResourceRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Resource>(RESOURCES);

    let mut resource = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    if resource.uploaded_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to update this resource".to_string(),
        ));
    }

    let body = body.into_inner();
    if let Some(title) = body.title {
        require_max_len("title", &title, 200)?;
        resource.title = title.trim().to_string();
    }
    if let Some(description) = body.description {
        require_max_len("description", &description, 2000)?;
        resource.description = description;
    }
    if let Some(category) = body.category {
        resource.category = category;
    }
    if let Some(tags) = body.tags {
        resource.tags = tags.into_vec();
    }
    if let Some(difficulty) = body.difficulty_level {
        resource.difficulty_level = difficulty;
    }
    resource.updated_at = BsonDateTime::now();

    collection.replace_one(doc! { "_id": id }, &resource).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": resource,
    })))
}

/// DELETE /api/resources/{id} - hard delete, owner or admin only
pub async fn delete_resource(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Resource>(RESOURCES);

    let resource = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    if resource.uploaded_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this resource".to_string(),
        ));
    }

    collection.delete_one(doc! { "_id": id }).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Resource deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: u8,
    pub review: Option<String>,
}

/// POST /api/resources/{id}/rate - one rating per user, upsert in place
pub async fn rate_resource(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<RateRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Resource>(RESOURCES);

    let mut resource = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    let body = body.into_inner();
    resource.submit_rating(&user_id, body.rating, body.review)?;

    collection.replace_one(doc! { "_id": id }, &resource).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": resource,
    })))
}

/// POST /api/resources/{id}/bookmark - set-toggle on the caller's registry
pub async fn bookmark_resource(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;

    let bookmarked =
        user_service::toggle_bookmark(&db, &user_id, BookmarkKind::Resource, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "bookmarked": bookmarked,
        "message": if bookmarked { "Resource bookmarked" } else { "Bookmark removed" },
    })))
}

/// GET /api/resources/{id}/download - increments the counter and awards
/// the uploader +1 per download event
pub async fn download_resource(
    _user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let resource = db
        .collection::<Resource>(RESOURCES)
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "downloads": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    reputation_service::record(&db, resource.uploaded_by, ReputationReason::ResourceDownloaded)
        .await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "fileUrl": resource.file_url,
            "fileName": resource.file_name,
        },
    })))
}
