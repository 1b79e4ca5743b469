//! Blog post store and lifecycle rules.
//!
//! The lifecycle helpers ([`build_post_record`], [`apply_post_update`])
//! are pure so the slug/read-time/publish-timestamp rules can be tested
//! without a provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{read_time, slugify};
use crate::error::{StoreError, ValidationError};
use crate::rest::RestClient;
use crate::{BlogPost, BlogPostUpdate, BlogStats, NewBlogPost};

const POSTS_TABLE: &str = "blog_posts";

/// Row sent to the provider when creating a post. Identifier and
/// created/updated timestamps are assigned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: u32,
    pub published: bool,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// Sparse patch for an existing post; only touched columns serialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a creation input and assemble the record to insert.
///
/// Slug: explicit slug wins; otherwise derived from the title. Read time
/// is always derived from the content. `published_at` is set iff the post
/// is created already published.
pub fn build_post_record(
    input: NewBlogPost,
    now: DateTime<Utc>,
) -> Result<PostRecord, ValidationError> {
    require_non_blank("title", &input.title)?;
    require_non_blank("excerpt", &input.excerpt)?;
    require_non_blank("content", &input.content)?;
    require_non_blank("category", &input.category)?;

    let slug = match input.slug {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => slugify(&input.title),
    };
    if slug.is_empty() {
        return Err(ValidationError::new("slug", "title does not yield a usable slug"));
    }

    Ok(PostRecord {
        read_time: read_time(&input.content),
        published_at: input.published.then_some(now),
        title: input.title,
        slug,
        excerpt: input.excerpt,
        content: input.content,
        image: input.image,
        author: input.author,
        category: input.category,
        tags: input.tags,
        published: input.published,
        featured: input.featured,
    })
}

/// Merge a partial update against the stored post.
///
/// Read time is recomputed iff the content changed. `published_at` is set
/// only on the false→true publish transition and only when not already
/// set; unpublishing never clears it, so a later republish keeps the
/// original timestamp. The slug is never re-derived from a title change.
pub fn apply_post_update(
    existing: &BlogPost,
    update: BlogPostUpdate,
    now: DateTime<Utc>,
) -> Result<PostPatch, ValidationError> {
    let mut patch = PostPatch {
        updated_at: now,
        ..PostPatch::default()
    };

    patch.title = updated_field("title", update.title, &existing.title)?;
    patch.slug = updated_field("slug", update.slug, &existing.slug)?;
    patch.excerpt = updated_field("excerpt", update.excerpt, &existing.excerpt)?;
    patch.category = updated_field("category", update.category, &existing.category)?;
    patch.author = updated_field("author", update.author, &existing.author)?;

    if let Some(content) = update.content {
        require_non_blank("content", &content)?;
        if content != existing.content {
            patch.read_time = Some(read_time(&content));
            patch.content = Some(content);
        }
    }
    if let Some(image) = update.image {
        if existing.image.as_deref() != Some(image.as_str()) {
            patch.image = Some(image);
        }
    }
    if let Some(tags) = update.tags {
        if tags != existing.tags {
            patch.tags = Some(tags);
        }
    }
    if let Some(featured) = update.featured {
        if featured != existing.featured {
            patch.featured = Some(featured);
        }
    }
    if let Some(published) = update.published {
        if published != existing.published {
            patch.published = Some(published);
            if published && existing.published_at.is_none() {
                patch.published_at = Some(now);
            }
        }
    }

    Ok(patch)
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Mandatory text field: accepted only when non-blank, emitted only when
/// actually different from the stored value.
fn updated_field(
    field: &'static str,
    update: Option<String>,
    existing: &str,
) -> Result<Option<String>, ValidationError> {
    match update {
        Some(value) => {
            require_non_blank(field, &value)?;
            Ok((value != existing).then_some(value))
        },
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct PublishedColumn {
    published: bool,
}

/// Store for blog posts, backed by the provider's `blog_posts` table.
#[derive(Debug, Clone)]
pub struct PostStore {
    rest: RestClient,
}

impl PostStore {
    /// Build a store over `rest`.
    pub fn new(rest: RestClient) -> Self {
        PostStore { rest }
    }

    /// Published posts, newest publication first (public blog index).
    pub async fn published(&self) -> Result<Vec<BlogPost>, StoreError> {
        self.rest
            .select(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("published", "eq.true".to_string()),
                ("order", "published_at.desc".to_string()),
            ])
            .await
    }

    /// Published post by slug, if any.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        self.rest
            .select_one(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("slug", format!("eq.{slug}")),
                ("published", "eq.true".to_string()),
            ])
            .await
    }

    /// Most recently published featured post, if any.
    pub async fn featured(&self) -> Result<Option<BlogPost>, StoreError> {
        self.rest
            .select_one(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("published", "eq.true".to_string()),
                ("featured", "eq.true".to_string()),
                ("order", "published_at.desc".to_string()),
            ])
            .await
    }

    /// Up to `limit` other published posts in the same category.
    pub async fn related(
        &self,
        slug: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<BlogPost>, StoreError> {
        self.rest
            .select(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("published", "eq.true".to_string()),
                ("category", format!("eq.{category}")),
                ("slug", format!("neq.{slug}")),
                ("order", "published_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .await
    }

    /// Every post including drafts, newest creation first (dashboard).
    pub async fn all(&self) -> Result<Vec<BlogPost>, StoreError> {
        self.rest
            .select(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .await
    }

    /// Dashboard search over title/excerpt/category, optionally filtered
    /// by published state.
    pub async fn search(
        &self,
        term: &str,
        published: Option<bool>,
    ) -> Result<Vec<BlogPost>, StoreError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        let term = sanitize_like_term(term);
        if !term.is_empty() {
            params.push((
                "or",
                format!("(title.ilike.*{term}*,excerpt.ilike.*{term}*,category.ilike.*{term}*)"),
            ));
        }
        if let Some(published) = published {
            params.push(("published", format!("eq.{published}")));
        }
        self.rest.select(POSTS_TABLE, &params).await
    }

    /// Validate and create a post; the stored representation is returned.
    pub async fn create(&self, input: NewBlogPost) -> Result<BlogPost, StoreError> {
        let record = build_post_record(input, Utc::now())?;
        self.rest.insert(POSTS_TABLE, &record).await
    }

    /// Apply a partial update to the post with `id`.
    pub async fn update(&self, id: &str, update: BlogPostUpdate) -> Result<BlogPost, StoreError> {
        let existing: BlogPost = self
            .rest
            .select_one(POSTS_TABLE, &[
                ("select", "*".to_string()),
                ("id", format!("eq.{id}")),
            ])
            .await?
            .ok_or(StoreError::NotFound)?;

        let patch = apply_post_update(&existing, update, Utc::now())?;
        self.rest.update(POSTS_TABLE, id, &patch).await
    }

    /// Delete the post with `id`.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.rest.delete(POSTS_TABLE, id).await
    }

    /// Post counts for the dashboard, computed from a published-only
    /// projection.
    pub async fn stats(&self) -> Result<BlogStats, StoreError> {
        let rows: Vec<PublishedColumn> = self
            .rest
            .select(POSTS_TABLE, &[("select", "published".to_string())])
            .await?;
        let total = rows.len();
        let published = rows.iter().filter(|r| r.published).count();
        Ok(BlogStats {
            total,
            published,
            drafts: total - published,
        })
    }
}

/// Strip characters that would break the PostgREST `or=(...)` syntax.
fn sanitize_like_term(term: &str) -> String {
    term.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{apply_post_update, build_post_record, sanitize_like_term};
    use crate::{BlogPost, BlogPostUpdate, NewBlogPost};

    fn new_post() -> NewBlogPost {
        NewBlogPost {
            title: "Contabilidade para MEI: Guia 2024!".to_string(),
            slug: None,
            excerpt: "Tudo sobre o MEI em 2024.".to_string(),
            content: vec!["palavra"; 450].join(" "),
            image: None,
            author: "Equipe LedgerPress".to_string(),
            category: "MEI".to_string(),
            tags: vec!["mei".to_string()],
            published: false,
            featured: false,
        }
    }

    fn stored_post() -> BlogPost {
        let t = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        BlogPost {
            id: "post-1".to_string(),
            title: "Contabilidade para MEI: Guia 2024!".to_string(),
            slug: "contabilidade-para-mei-guia-2024".to_string(),
            excerpt: "Tudo sobre o MEI em 2024.".to_string(),
            content: "conteúdo original".to_string(),
            image: None,
            author: "Equipe LedgerPress".to_string(),
            category: "MEI".to_string(),
            tags: vec!["mei".to_string()],
            read_time: 1,
            published: false,
            featured: false,
            created_at: t,
            updated_at: t,
            published_at: None,
        }
    }

    #[test]
    fn create_derives_slug_and_read_time() {
        let now = Utc::now();
        let record = build_post_record(new_post(), now).expect("valid input");
        assert_eq!(record.slug, "contabilidade-para-mei-guia-2024");
        assert_eq!(record.read_time, 3);
        assert_eq!(record.published_at, None);
    }

    #[test]
    fn create_honors_explicit_slug() {
        let mut input = new_post();
        input.slug = Some("guia-mei".to_string());
        let record = build_post_record(input, Utc::now()).expect("valid input");
        assert_eq!(record.slug, "guia-mei");
    }

    #[test]
    fn create_published_sets_publish_timestamp() {
        let now = Utc::now();
        let mut input = new_post();
        input.published = true;
        let record = build_post_record(input, now).expect("valid input");
        assert_eq!(record.published_at, Some(now));
    }

    #[test]
    fn create_rejects_each_blank_mandatory_field() {
        for field in ["title", "excerpt", "content", "category"] {
            let mut input = new_post();
            match field {
                "title" => input.title = "  ".to_string(),
                "excerpt" => input.excerpt = String::new(),
                "content" => input.content = "\n".to_string(),
                _ => input.category = String::new(),
            }
            let err = build_post_record(input, Utc::now()).expect_err("must fail");
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn create_rejects_title_with_empty_slug() {
        let mut input = new_post();
        input.title = "!!!".to_string();
        let err = build_post_record(input, Utc::now()).expect_err("must fail");
        assert_eq!(err.field, "slug");
    }

    #[test]
    fn update_recomputes_read_time_only_when_content_changes() {
        let existing = stored_post();
        let now = Utc::now();

        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                content: Some(vec!["palavra"; 450].join(" ")),
                ..BlogPostUpdate::default()
            },
            now,
        )
        .expect("valid update");
        assert_eq!(patch.read_time, Some(3));

        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                title: Some("Novo título".to_string()),
                ..BlogPostUpdate::default()
            },
            now,
        )
        .expect("valid update");
        assert_eq!(patch.read_time, None);
        assert_eq!(patch.content, None);
        // Title edits never regenerate the slug.
        assert_eq!(patch.slug, None);
    }

    #[test]
    fn publish_transition_sets_timestamp_once() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let mut existing = stored_post();

        // Draft → published: timestamp set.
        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                published: Some(true),
                ..BlogPostUpdate::default()
            },
            now,
        )
        .expect("valid update");
        assert_eq!(patch.published, Some(true));
        assert_eq!(patch.published_at, Some(now));

        // Published → draft: timestamp untouched.
        existing.published = true;
        existing.published_at = Some(now);
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                published: Some(false),
                ..BlogPostUpdate::default()
            },
            later,
        )
        .expect("valid update");
        assert_eq!(patch.published, Some(false));
        assert_eq!(patch.published_at, None);

        // Re-publish: the original timestamp is preserved.
        existing.published = false;
        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                published: Some(true),
                ..BlogPostUpdate::default()
            },
            later,
        )
        .expect("valid update");
        assert_eq!(patch.published, Some(true));
        assert_eq!(patch.published_at, None);
    }

    #[test]
    fn update_rejects_blanked_mandatory_fields() {
        let existing = stored_post();
        let err = apply_post_update(
            &existing,
            BlogPostUpdate {
                excerpt: Some("   ".to_string()),
                ..BlogPostUpdate::default()
            },
            Utc::now(),
        )
        .expect_err("must fail");
        assert_eq!(err.field, "excerpt");
    }

    #[test]
    fn unchanged_fields_do_not_serialize_into_the_patch() {
        let existing = stored_post();
        let patch = apply_post_update(
            &existing,
            BlogPostUpdate {
                title: Some(existing.title.clone()),
                featured: Some(false),
                ..BlogPostUpdate::default()
            },
            Utc::now(),
        )
        .expect("valid update");
        let body = serde_json::to_value(&patch).expect("serializable");
        let keys: Vec<&String> = body.as_object().expect("object").keys().collect();
        assert_eq!(keys, ["updated_at"]);
    }

    #[test]
    fn like_terms_lose_postgrest_metacharacters() {
        assert_eq!(sanitize_like_term(" mei, (2024)* "), "mei 2024");
    }
}
