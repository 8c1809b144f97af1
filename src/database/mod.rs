use mongodb::{Client, Collection, Database};
use std::error::Error;

pub const USERS: &str = "users";
pub const RESOURCES: &str = "resources";
pub const QUESTIONS: &str = "questions";
pub const DISCUSSIONS: &str = "discussions";
pub const REPUTATION_EVENTS: &str = "reputation_events";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("peerlearn");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the query paths rely on.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);
        for field in ["email", "username"] {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            match users.create_index(index).await {
                Ok(_) => log::info!("  Index created: users({}) unique", field),
                Err(e) => log::debug!("  Index already exists: {}", e),
            }
        }

        let resources = self.collection::<mongodb::bson::Document>(RESOURCES);
        for keys in [doc! { "uploadedBy": 1 }, doc! { "category": 1 }] {
            let index = IndexModel::builder().keys(keys.clone()).build();
            match resources.create_index(index).await {
                Ok(_) => log::info!("  Index created: resources({:?})", keys),
                Err(e) => log::debug!("  Index already exists: {}", e),
            }
        }

        let questions = self.collection::<mongodb::bson::Document>(QUESTIONS);
        let index = IndexModel::builder().keys(doc! { "askedBy": 1 }).build();
        match questions.create_index(index).await {
            Ok(_) => log::info!("  Index created: questions(askedBy)"),
            Err(e) => log::debug!("  Index already exists: {}", e),
        }

        let discussions = self.collection::<mongodb::bson::Document>(DISCUSSIONS);
        let index = IndexModel::builder().keys(doc! { "createdBy": 1 }).build();
        match discussions.create_index(index).await {
            Ok(_) => log::info!("  Index created: discussions(createdBy)"),
            Err(e) => log::debug!("  Index already exists: {}", e),
        }

        // The outbox worker polls on (applied, attempts)
        let events = self.collection::<mongodb::bson::Document>(REPUTATION_EVENTS);
        let index = IndexModel::builder()
            .keys(doc! { "applied": 1, "attempts": 1 })
            .build();
        match events.create_index(index).await {
            Ok(_) => log::info!("  Index created: reputation_events(applied, attempts)"),
            Err(e) => log::debug!("  Index already exists: {}", e),
        }

        log::info!("Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn connects_and_creates_indexes() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/peerlearn_test".to_string());
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
