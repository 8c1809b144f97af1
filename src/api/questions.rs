use crate::api::{page_count, pagination, require_max_len, TagsField};
use crate::database::{MongoDB, QUESTIONS};
use crate::middleware::AuthUser;
use crate::models::{BookmarkKind, Category, Question, ReputationReason, VoteType};
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
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn build_filter(query: &ListQuery) -> Document {
    let mut filter = doc! {};

    if let Some(category) = &query.category {
        filter.insert("category", category);
    }
    if let Some(tags) = &query.tags {
        let tags: Vec<String> = tags.split(',').map(|t| t.trim().to_string()).collect();
        filter.insert("tags", doc! { "$in": tags });
    }
    match query.status.as_deref() {
        Some("answered") => {
            filter.insert("hasAcceptedAnswer", true);
        }
        Some("unanswered") => {
            filter.insert("answers.0", doc! { "$exists": false });
        }
        _ => {}
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

/// GET /api/questions - paginated, filterable list
pub async fn get_questions(
    query: web::Query<ListQuery>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let collection = db.collection::<Question>(QUESTIONS);

    let filter = build_filter(&query);
    let sort = match query.sort.as_deref() {
        Some("votes") => doc! { "votes": -1 },
        Some("views") => doc! { "views": -1 },
        _ => doc! { "createdAt": -1 },
    };
    let (page, limit, skip) = pagination(query.page, query.limit);

    let questions: Vec<Question> = collection
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
        "count": questions.len(),
        "total": total,
        "pages": page_count(total, limit),
        "currentPage": page,
        "data": questions,
    })))
}

/// GET /api/questions/{id} - single question, increments views
pub async fn get_question(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;

    let question = db
        .collection::<Question>(QUESTIONS)
        .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1 } })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub tags: Option<TagsField>,
}

/// POST /api/questions - create; asker earns +2 reputation
pub async fn create_question(
    user: AuthUser,
    body: web::Json<CreateQuestionRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().user_oid()?;
    let body = body.into_inner();

    require_max_len("title", &body.title, 300)?;
    require_max_len("content", &body.content, 5000)?;

    let mut question = Question::new(
        body.title.trim().to_string(),
        body.content,
        body.category,
        body.tags.map(TagsField::into_vec).unwrap_or_default(),
        user_id,
    );

    let result = db
        .collection::<Question>(QUESTIONS)
        .insert_one(&question)
        .await?;
    question.id = result.inserted_id.as_object_id();

    reputation_service::record(&db, user_id, ReputationReason::QuestionCreated).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<TagsField>,
}

/// PUT /api/questions/{id} - owner or admin only
pub async fn update_question(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateQuestionRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let mut question = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.asked_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to update this question".to_string(),
        ));
    }

    let body = body.into_inner();
    if let Some(title) = body.title {
        require_max_len("title", &title, 300)?;
        question.title = title.trim().to_string();
    }
    if let Some(content) = body.content {
        require_max_len("content", &content, 5000)?;
        question.content = content;
    }
    if let Some(category) = body.category {
        question.category = category;
    }
    if let Some(tags) = body.tags {
        question.tags = tags.into_vec();
    }
    question.updated_at = BsonDateTime::now();

    collection.replace_one(doc! { "_id": id }, &question).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

/// DELETE /api/questions/{id} - hard delete, owner or admin only
pub async fn delete_question(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let question = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.asked_by != user_id && !user.claims().is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this question".to_string(),
        ));
    }

    collection.delete_one(doc! { "_id": id }).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Question deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: VoteType,
}

/// PUT /api/questions/{id}/vote - one vote per user; repeating retracts,
/// the opposite type flips. No reputation side effect.
pub async fn vote_question(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<VoteRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let mut question = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    question.apply_vote(&user_id, body.vote_type);

    collection.replace_one(doc! { "_id": id }, &question).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub content: String,
}

/// POST /api/questions/{id}/answers - rejected when the question is
/// closed; answerer earns +3 reputation
pub async fn post_answer(
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<AnswerRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let body = body.into_inner();
    require_max_len("content", &body.content, 5000)?;

    let mut question = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    question.post_answer(body.content, user_id)?;

    collection.replace_one(doc! { "_id": id }, &question).await?;

    reputation_service::record(&db, user_id, ReputationReason::AnswerPosted).await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

/// PUT /api/questions/{question_id}/answers/{answer_id}/vote
pub async fn vote_answer(
    user: AuthUser,
    path: web::Path<(String, String)>,
    body: web::Json<VoteRequest>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let (question_id, answer_id) = path.into_inner();
    let question_id = ObjectId::parse_str(question_id)?;
    let answer_id = ObjectId::parse_str(answer_id)?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let mut question = collection
        .find_one(doc! { "_id": question_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    question.answer_mut(&answer_id)?.apply_vote(&user_id, body.vote_type);

    collection
        .replace_one(doc! { "_id": question_id }, &question)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

/// PUT /api/questions/{question_id}/answers/{answer_id}/accept - asker
/// only; the accepted answer's author earns +10, re-awarded on every
/// accept call
pub async fn accept_answer(
    user: AuthUser,
    path: web::Path<(String, String)>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let (question_id, answer_id) = path.into_inner();
    let question_id = ObjectId::parse_str(question_id)?;
    let answer_id = ObjectId::parse_str(answer_id)?;
    let user_id = user.claims().user_oid()?;
    let collection = db.collection::<Question>(QUESTIONS);

    let mut question = collection
        .find_one(doc! { "_id": question_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    let author = question.accept_answer(&user_id, &answer_id)?;

    collection
        .replace_one(doc! { "_id": question_id }, &question)
        .await?;

    reputation_service::record(&db, author, ReputationReason::AnswerAccepted).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": question,
    })))
}

/// POST /api/questions/{id}/bookmark - set-toggle on the caller's registry
pub async fn bookmark_question(
    user: AuthUser,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    let user_id = user.claims().user_oid()?;

    let bookmarked =
        user_service::toggle_bookmark(&db, &user_id, BookmarkKind::Question, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "bookmarked": bookmarked,
        "message": if bookmarked { "Question bookmarked" } else { "Bookmark removed" },
    })))
}
