//! Blog endpoints: the public reading surface and the dashboard CRUD.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::Operator;
use crate::document::Document;
use crate::handlers::{not_found, require, store_error, Acknowledgement, ApiError};
use crate::permissions::Permission;
use crate::state::AppState;
use ledgerpress_shared::{BlogPost, BlogPostSummary, BlogPostUpdate, BlogStats, NewBlogPost};

/// How many related posts the article page shows.
const RELATED_LIMIT: usize = 3;

/// Published post plus its rendered body, as served to the article page.
#[derive(Debug, Serialize)]
pub struct RenderedPost {
    #[serde(flatten)]
    pub post: BlogPost,
    pub html: String,
}

impl RenderedPost {
    fn new(post: BlogPost) -> Self {
        let html = Document::parse(&post.content).to_html();
        RenderedPost { post, html }
    }
}

pub async fn list_published(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostSummary>>, ApiError> {
    let posts = state
        .posts
        .published()
        .await
        .map_err(|e| store_error("list published posts", e))?;
    Ok(Json(posts.into_iter().map(BlogPostSummary::from).collect()))
}

/// Newest published featured post; 404 when none is flagged.
pub async fn featured(
    State(state): State<AppState>,
) -> Result<Json<BlogPostSummary>, ApiError> {
    let post = state
        .posts
        .featured()
        .await
        .map_err(|e| store_error("fetch featured post", e))?
        .ok_or_else(not_found)?;
    Ok(Json(BlogPostSummary::from(post)))
}

pub async fn by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RenderedPost>, ApiError> {
    let post = state
        .posts
        .by_slug(&slug)
        .await
        .map_err(|e| store_error("fetch post by slug", e))?
        .ok_or_else(not_found)?;
    Ok(Json(RenderedPost::new(post)))
}

/// Other published posts in the same category, capped at the article
/// page's slot count.
pub async fn related(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<BlogPostSummary>>, ApiError> {
    let post = state
        .posts
        .by_slug(&slug)
        .await
        .map_err(|e| store_error("fetch post by slug", e))?
        .ok_or_else(not_found)?;

    let related = state
        .posts
        .related(&post.slug, &post.category, RELATED_LIMIT)
        .await
        .map_err(|e| store_error("fetch related posts", e))?;
    Ok(Json(related.into_iter().map(BlogPostSummary::from).collect()))
}

/// Distinct categories of published posts, in first-seen order.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let posts = state
        .posts
        .published()
        .await
        .map_err(|e| store_error("list categories", e))?;

    let mut seen = Vec::new();
    for post in posts {
        if !seen.contains(&post.category) {
            seen.push(post.category);
        }
    }
    Ok(Json(seen))
}

/// Dashboard list filters.
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

/// Dashboard listing: drafts included, optionally filtered by a search
/// term and published state.
pub async fn admin_list(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    let posts = match (query.q.as_deref(), query.published) {
        (None, None) => state.posts.all().await,
        (term, published) => state.posts.search(term.unwrap_or(""), published).await,
    }
    .map_err(|e| store_error("list posts", e))?;
    Ok(Json(posts))
}

pub async fn admin_create(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Json(input): Json<NewBlogPost>,
) -> Result<Json<BlogPost>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    let post = state
        .posts
        .create(input)
        .await
        .map_err(|e| store_error("create post", e))?;
    tracing::info!(operator = %operator.id, post = %post.id, slug = %post.slug, "post created");
    Ok(Json(post))
}

pub async fn admin_update(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BlogPostUpdate>,
) -> Result<Json<BlogPost>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    let post = state
        .posts
        .update(&id, update)
        .await
        .map_err(|e| store_error("update post", e))?;
    tracing::info!(operator = %operator.id, post = %post.id, "post updated");
    Ok(Json(post))
}

pub async fn admin_delete(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    state
        .posts
        .delete(&id)
        .await
        .map_err(|e| store_error("delete post", e))?;
    tracing::info!(operator = %operator.id, post = %id, "post deleted");
    Ok(Json(Acknowledgement::new("post deleted")))
}

pub async fn admin_stats(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
) -> Result<Json<BlogStats>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    let stats = state
        .posts
        .stats()
        .await
        .map_err(|e| store_error("post stats", e))?;
    Ok(Json(stats))
}

/// Editor render request: raw markdown in, preview out.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub content: String,
}

/// Preview payload: display HTML plus the parsed block model, so the
/// editor can show both views from one round trip.
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub document: Document,
}

/// Deterministic preview of editor content. Pure transform; nothing is
/// stored.
pub async fn editor_render(
    Extension(operator): Extension<Operator>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    require(&operator, Permission::ManageBlog)?;

    let document = Document::parse(&request.content);
    Ok(Json(RenderResponse {
        html: document.to_html(),
        document,
    }))
}
