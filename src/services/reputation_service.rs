use crate::database::{MongoDB, REPUTATION_EVENTS, USERS};
use crate::models::{ReputationEvent, ReputationReason};
use crate::utils::error::AppError;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};

/// Events that keep failing (e.g. the awarded user was deleted) are
/// retried this many times before the worker stops picking them up.
const MAX_ATTEMPTS: i32 = 5;

/// Appends a reputation award to the outbox. This runs after the
/// triggering document write has committed; an enqueue failure is logged
/// and swallowed so it never turns a successful action into an error for
/// the caller.
pub async fn record(db: &MongoDB, user: ObjectId, reason: ReputationReason) {
    let event = ReputationEvent::new(user, reason);
    let collection = db.collection::<ReputationEvent>(REPUTATION_EVENTS);
    if let Err(e) = collection.insert_one(&event).await {
        log::error!(
            "Failed to enqueue reputation event {:?} (+{}) for user {}: {}",
            reason,
            event.delta,
            user,
            e
        );
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ApplyReport {
    pub pending: usize,
    pub applied: usize,
    pub failed: usize,
}

/// Drains pending outbox events, applying each delta to the user's
/// reputation counter. Called by the background worker; each event is
/// applied at most once and retried up to `MAX_ATTEMPTS` on failure.
pub async fn apply_pending(db: &MongoDB) -> Result<ApplyReport, AppError> {
    let events = db.collection::<ReputationEvent>(REPUTATION_EVENTS);
    let users = db.collection::<Document>(USERS);

    let pending: Vec<ReputationEvent> = events
        .find(doc! { "applied": false, "attempts": { "$lt": MAX_ATTEMPTS } })
        .await?
        .try_collect()
        .await?;

    let mut report = ApplyReport {
        pending: pending.len(),
        ..Default::default()
    };

    for event in pending {
        let event_id = match event.id {
            Some(id) => id,
            None => continue,
        };

        let result = users
            .update_one(
                doc! { "_id": event.user },
                doc! { "$inc": { "reputation": event.delta } },
            )
            .await;

        match result {
            Ok(update) if update.matched_count == 1 => {
                events
                    .update_one(
                        doc! { "_id": event_id },
                        doc! { "$set": {
                            "applied": true,
                            "appliedAt": BsonDateTime::now(),
                        }},
                    )
                    .await?;
                report.applied += 1;
            }
            Ok(_) => {
                // Awarded user no longer exists; count the attempt and
                // let the cap retire the event.
                events
                    .update_one(doc! { "_id": event_id }, doc! { "$inc": { "attempts": 1 } })
                    .await?;
                report.failed += 1;
                log::warn!(
                    "Reputation event {} targets missing user {}",
                    event_id,
                    event.user
                );
            }
            Err(e) => {
                events
                    .update_one(doc! { "_id": event_id }, doc! { "$inc": { "attempts": 1 } })
                    .await?;
                report.failed += 1;
                log::error!("Failed to apply reputation event {}: {}", event_id, e);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn outbox_round_trip_applies_delta() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/peerlearn_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let users = db.collection::<User>(USERS);
        let mut user = User::new(
            format!("outbox-{}", ObjectId::new().to_hex()),
            format!("{}@test.local", ObjectId::new().to_hex()),
            "$2b$10$hash".to_string(),
        );
        let inserted = users.insert_one(&user).await.unwrap();
        user.id = inserted.inserted_id.as_object_id();
        let user_id = user.id.unwrap();

        record(&db, user_id, ReputationReason::AnswerPosted).await;
        let report = apply_pending(&db).await.unwrap();
        assert!(report.applied >= 1);

        let reloaded = users
            .find_one(doc! { "_id": user_id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.reputation, 3);

        users.delete_one(doc! { "_id": user_id }).await.unwrap();
    }
}
