use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use blob_store::{BlobStore, UserStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::ServerConfig,
    http_objects::{
        BlobApiError, BlobMetadata, CreateBlobResponse, DeleteBlobResponse, DeleteUserResponse,
        UpdateBlobResponse, User, UserRequest,
    },
};

pub(crate) mod blobs;
pub(crate) mod payload;
pub(crate) mod users;

#[derive(OpenApi)]
#[openapi(
        paths(
            blobs::list_blobs,
            blobs::download_blob_file,
            blobs::get_blob,
            blobs::create_blob,
            blobs::update_blob,
            blobs::delete_blob,
            users::list_users,
            users::get_user,
            users::create_user,
            users::update_user,
            users::delete_user,
        ),
        components(
            schemas(
                BlobApiError,
                BlobMetadata,
                CreateBlobResponse,
                UpdateBlobResponse,
                DeleteBlobResponse,
                payload::CreateBlobRequest,
                payload::UpdateBlobRequest,
                User,
                UserRequest,
                DeleteUserResponse,
            )
        ),
        tags(
            (name = "blobs", description = "Binary blob storage API"),
            (name = "users", description = "User records API")
        )
    )]
struct ApiDoc;

#[derive(Clone)]
pub struct RouteState {
    pub blob_store: Arc<BlobStore>,
    pub user_store: Arc<UserStore>,
}

pub fn create_routes(route_state: RouteState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs/swagger").url("/docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index))
        .route(
            "/api/blobs",
            get(blobs::list_blobs).with_state(route_state.clone()),
        )
        .route(
            "/api/blobs",
            post(blobs::create_blob).with_state(route_state.clone()),
        )
        .route(
            "/api/blobs/{uuid}/file",
            get(blobs::download_blob_file).with_state(route_state.clone()),
        )
        .route(
            "/api/blobs/{uuid}",
            get(blobs::get_blob).with_state(route_state.clone()),
        )
        .route(
            "/api/blobs/{uuid}",
            put(blobs::update_blob).with_state(route_state.clone()),
        )
        .route(
            "/api/blobs/{uuid}",
            delete(blobs::delete_blob).with_state(route_state.clone()),
        )
        .route(
            "/api/users",
            get(users::list_users).with_state(route_state.clone()),
        )
        .route(
            "/api/users",
            post(users::create_user).with_state(route_state.clone()),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user).with_state(route_state.clone()),
        )
        .route(
            "/api/users/{id}",
            put(users::update_user).with_state(route_state.clone()),
        )
        .route(
            "/api/users/{id}",
            delete(users::delete_user).with_state(route_state.clone()),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                .on_failure(()),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.max_body_size_mb * 1024 * 1024))
}

async fn index() -> &'static str {
    "Blob Store Server"
}
