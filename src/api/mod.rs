pub mod handlers;
pub mod models;
pub mod openapi;

use crate::core::errors::GifterError;
use crate::core::models::UserId;
use crate::core::services::GroupDirectory;
use crate::infrastructure::identity::in_memory::InMemoryIdentity;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use axum::{Router, http::header, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub type Directory = GroupDirectory<InMemoryStorage, InMemoryIdentity, InMemoryLogging>;

/// Shared handler state. The identity directory is kept alongside so users
/// issued by the identity provider can be registered.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub identity: InMemoryIdentity,
}

impl AppState {
    pub fn in_memory() -> Self {
        let identity = InMemoryIdentity::new();
        let directory = GroupDirectory::new(InMemoryStorage::new(), identity.clone(), InMemoryLogging::new());
        AppState {
            directory: Arc::new(directory),
            identity,
        }
    }

    /// Drops the user from the identity directory and clears their
    /// memberships. Calling it again after a failed cleanup finishes the job.
    pub async fn remove_user(&self, user_id: &UserId) -> Result<(), GifterError> {
        let removed = self.identity.remove_user(user_id).await;
        let groups = self.directory.members().forget_user(user_id).await?;
        if removed.is_none() && groups.is_empty() {
            return Err(GifterError::UserNotFound(user_id.clone()));
        }
        Ok(())
    }
}

/// Full application: health check, `/api` routes, OpenAPI docs and the HTTP layers.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", handlers::api_routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}
