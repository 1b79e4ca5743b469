use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{blog, contacts, gallery, reports, users};
use crate::state::AppState;
use crate::{auth, request_context};

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public site surface
    let public = Router::new()
        .route("/api/posts", get(blog::list_published))
        .route("/api/posts/featured", get(blog::featured))
        .route("/api/posts/:slug", get(blog::by_slug))
        .route("/api/posts/:slug/related", get(blog::related))
        .route("/api/categories", get(blog::categories))
        .route("/api/gallery", get(gallery::list))
        .route("/api/leads", post(contacts::submit_lead));

    // Dashboard surface, behind the session middleware
    let admin = Router::new()
        .route("/api/admin/posts", get(blog::admin_list).post(blog::admin_create))
        .route("/api/admin/posts/stats", get(blog::admin_stats))
        .route(
            "/api/admin/posts/:id",
            patch(blog::admin_update).delete(blog::admin_delete),
        )
        .route("/api/admin/editor/render", post(blog::editor_render))
        .route(
            "/api/admin/contacts",
            get(contacts::admin_list).post(contacts::admin_create),
        )
        .route("/api/admin/contacts/stats", get(contacts::admin_stats))
        .route(
            "/api/admin/contacts/:id",
            patch(contacts::admin_update).delete(contacts::admin_delete),
        )
        .route(
            "/api/admin/gallery",
            get(gallery::admin_list).post(gallery::admin_upload),
        )
        .route("/api/admin/gallery/:id", delete(gallery::admin_delete))
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/users/invite", post(users::invite))
        .route(
            "/api/admin/users/:id",
            patch(users::update).delete(users::remove),
        )
        .route("/api/admin/users/:id/ban", post(users::ban))
        .route("/api/admin/users/:id/unban", post(users::unban))
        .route("/api/admin/reports", get(reports::overview))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_operator,
        ));

    public
        .merge(admin)
        .with_state(state)
        .layer(middleware::from_fn(request_context::request_context_middleware))
        .layer(cors)
}
