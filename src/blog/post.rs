// Post domain types and the pure derivations the store applies on save.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Average reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One blog entry, as persisted in either collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    /// Empty when the author gave none.
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
    pub reading_time: u32,
}

impl Post {
    /// Blank in-memory draft. Nothing is persisted until it is saved.
    pub fn new_draft(now: DateTime<Utc>) -> Self {
        Self {
            id: PostId::generate(),
            title: String::new(),
            slug: String::new(),
            excerpt: String::new(),
            content: String::new(),
            cover_image: None,
            tags: Vec::new(),
            published_at: None,
            updated_at: now,
            created_at: now,
            status: PostStatus::Draft,
            reading_time: 0,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Editing the title always re-derives the slug.
    pub fn set_title(&mut self, title: impl Into<String>, now: DateTime<Utc>) {
        self.title = title.into();
        self.slug = derive_slug(&self.title);
        self.touch(now);
    }

    pub fn set_content(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        self.content = content.into();
        self.reading_time = reading_time(&self.content);
        self.touch(now);
    }

    /// Adds a trimmed tag. Returns false for blank or already-present tags.
    pub fn add_tag(&mut self, tag: &str, now: DateTime<Utc>) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.touch(now);
        true
    }

    pub fn remove_tag(&mut self, tag: &str, now: DateTime<Utc>) {
        self.tags.retain(|t| t != tag);
        self.touch(now);
    }

    /// The date shown under the title: publication date if published,
    /// creation date otherwise.
    pub fn display_date(&self) -> String {
        format_date(self.published_at.unwrap_or(self.created_at))
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Lowercase the title, collapse every run of characters outside `[a-z0-9]`
/// into one `-`, and trim dashes from both ends.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Whole minutes to read `content`, rounded up. Blank content reads in 0.
pub fn reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// `October 16, 2026`
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%B %-d, %Y").to_string()
}
