//! Shared data model and hosted-provider stores for the LedgerPress site.
//!
//! Every record here is owned by the hosted storage provider; this crate
//! only moves transient copies between the HTTP layer and the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod contact_store;
pub mod content;
pub mod error;
pub mod gallery_store;
pub mod post_store;
pub mod rest;

pub use error::{StoreError, ValidationError};

/// Full blog post record as persisted by the storage provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    /// Unique, URL-safe identifier. Derived once at creation, never
    /// re-derived from later title edits.
    pub slug: String,
    pub excerpt: String,
    /// Markdown body.
    pub content: String,
    pub image: Option<String>,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Estimated reading minutes, recomputed whenever content changes.
    pub read_time: u32,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set on the first false→true publish transition, then preserved
    /// across unpublish/republish cycles.
    pub published_at: Option<DateTime<Utc>>,
}

/// List projection of [`BlogPost`] (content omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: u32,
    pub published: bool,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<BlogPost> for BlogPostSummary {
    fn from(p: BlogPost) -> Self {
        BlogPostSummary {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            image: p.image,
            author: p.author,
            category: p.category,
            tags: p.tags,
            read_time: p.read_time,
            published: p.published,
            featured: p.featured,
            published_at: p.published_at,
        }
    }
}

/// Operator input for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    /// Explicit slug override; derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

/// Partial update for a post; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPostUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
}

/// Post counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogStats {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
}

/// Lead status. A flat enumeration: any status may follow any other,
/// and transitions happen only by explicit operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Customer,
    Lost,
}

impl LeadStatus {
    /// All statuses, in dashboard display order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Customer,
        LeadStatus::Lost,
    ];

    /// Wire value of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Customer => "customer",
            LeadStatus::Lost => "lost",
        }
    }

    /// Parse an operator-supplied status value.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "customer" => Ok(LeadStatus::Customer),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(ValidationError::new(
                "status",
                format!("unknown lead status `{other}`"),
            )),
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal/size category of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactCategory {
    /// Private individual (no company).
    Individual,
    /// Brazilian individual micro-entrepreneur.
    Mei,
    Micro,
    Small,
    Medium,
    Large,
}

/// Employee-count bracket reported on the lead form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeBracket {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1-5")]
    OneToFive,
    #[serde(rename = "6-10")]
    SixToTen,
    #[serde(rename = "11-20")]
    ElevenToTwenty,
    #[serde(rename = "21-50")]
    TwentyOneToFifty,
    #[serde(rename = "51-100")]
    FiftyOneToHundred,
    #[serde(rename = "100+")]
    OverHundred,
}

/// Contact (lead) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    /// Person or company name.
    pub name: String,
    pub email: String,
    pub category: ContactCategory,
    pub employees: EmployeeBracket,
    pub status: LeadStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input from the public lead form or a manual dashboard entry.
/// Status is not accepted here: every new lead starts as `new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub category: ContactCategory,
    pub employees: EmployeeBracket,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for a contact. The status travels as a string so a
/// bad value surfaces as a field validation error, not a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub category: Option<ContactCategory>,
    #[serde(default)]
    pub employees: Option<EmployeeBracket>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Lead counts by status for the dashboard and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactStats {
    pub total: usize,
    pub new: usize,
    pub contacted: usize,
    pub customers: usize,
    pub lost: usize,
}

/// Gallery image metadata mirrored from the blob bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    /// Stored filename, unique within the bucket.
    pub filename: String,
    pub original_name: String,
    /// Bucket-relative object path.
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    /// Attached at read time from the blob API; never persisted.
    #[serde(default)]
    pub public_url: String,
}
