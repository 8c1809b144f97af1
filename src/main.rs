mod api;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/peerlearn".to_string());

    log::info!("Starting PeerLearn Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("MongoDB connected successfully");

    // Reputation awards are applied by a background consumer, not by the
    // request handlers themselves
    jobs::reputation_worker::start_reputation_worker(db.clone()).await;

    log::info!("Server starting on {}:{}", host, port);
    log::info!(
        "Swagger UI available at: http://{}:{}/swagger-ui/",
        host,
        port
    );

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth: register/login are public, /me requires a JWT
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .route("/me", web::get().to(api::auth::get_me)),
            )
            // Users: public profiles plus the caller's bookmark registry.
            // The /bookmarks and /bookmark routes must register before the
            // /{id} catch-alls.
            .service(
                web::scope("/api/users")
                    .route(
                        "/bookmarks/resources",
                        web::get().to(api::users::get_bookmarked_resources),
                    )
                    .route(
                        "/bookmark/resource/{id}",
                        web::post().to(api::users::bookmark_resource),
                    )
                    .route(
                        "/bookmark/resource/{id}",
                        web::delete().to(api::users::unbookmark_resource),
                    )
                    .route("/{id}", web::get().to(api::users::get_user_profile))
                    .route(
                        "/{id}/resources",
                        web::get().to(api::users::get_user_resources),
                    )
                    .route(
                        "/{id}/questions",
                        web::get().to(api::users::get_user_questions),
                    ),
            )
            // Resources: shared study material with ratings and downloads
            .service(
                web::scope("/api/resources")
                    .route("", web::get().to(api::resources::get_resources))
                    .route("", web::post().to(api::resources::create_resource))
                    .route("/{id}", web::get().to(api::resources::get_resource))
                    .route("/{id}", web::put().to(api::resources::update_resource))
                    .route("/{id}", web::delete().to(api::resources::delete_resource))
                    .route("/{id}/rate", web::post().to(api::resources::rate_resource))
                    .route(
                        "/{id}/bookmark",
                        web::post().to(api::resources::bookmark_resource),
                    )
                    .route(
                        "/{id}/download",
                        web::get().to(api::resources::download_resource),
                    ),
            )
            // Questions: Q&A with voting and accepted answers
            .service(
                web::scope("/api/questions")
                    .route("", web::get().to(api::questions::get_questions))
                    .route("", web::post().to(api::questions::create_question))
                    .route("/{id}", web::get().to(api::questions::get_question))
                    .route("/{id}", web::put().to(api::questions::update_question))
                    .route("/{id}", web::delete().to(api::questions::delete_question))
                    .route("/{id}/vote", web::put().to(api::questions::vote_question))
                    .route("/{id}/answers", web::post().to(api::questions::post_answer))
                    .route(
                        "/{question_id}/answers/{answer_id}/vote",
                        web::put().to(api::questions::vote_answer),
                    )
                    .route(
                        "/{question_id}/answers/{answer_id}/accept",
                        web::put().to(api::questions::accept_answer),
                    )
                    .route(
                        "/{id}/bookmark",
                        web::post().to(api::questions::bookmark_question),
                    ),
            )
            // Discussions: threads with likes and replies
            .service(
                web::scope("/api/discussions")
                    .route("", web::get().to(api::discussions::get_discussions))
                    .route("", web::post().to(api::discussions::create_discussion))
                    .route("/{id}", web::get().to(api::discussions::get_discussion))
                    .route("/{id}", web::put().to(api::discussions::update_discussion))
                    .route(
                        "/{id}",
                        web::delete().to(api::discussions::delete_discussion),
                    )
                    .route(
                        "/{id}/replies",
                        web::post().to(api::discussions::post_reply),
                    )
                    .route("/{id}/like", web::put().to(api::discussions::like_discussion))
                    .route(
                        "/{discussion_id}/replies/{reply_id}/like",
                        web::put().to(api::discussions::like_reply),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
