use std::sync::Arc;

use crate::blog::post::{derive_slug, reading_time, Post, PostStatus};
use crate::clock::Clock;
use crate::error::StoreResult;
use crate::storage::{KeyValueStore, DRAFTS_KEY, PUBLISHED_KEY};

/// Draft and published posts, each collection one JSON array in the backend.
///
/// The store performs no authorization. Deciding who may call the write
/// operations belongs to the caller (see `visibility`).
#[derive(Clone)]
pub struct ContentStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ContentStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Published collection in storage order. Unreadable or corrupt storage
    /// reads as empty.
    pub fn list_published(&self) -> Vec<Post> {
        self.load_or_empty(PUBLISHED_KEY)
    }

    pub fn list_drafts(&self) -> Vec<Post> {
        self.load_or_empty(DRAFTS_KEY)
    }

    /// Published followed by drafts.
    pub fn list_all(&self) -> Vec<Post> {
        let mut posts = self.list_published();
        posts.extend(self.list_drafts());
        posts
    }

    /// First post with this slug. Slugs are not unique; published posts are
    /// searched before drafts.
    pub fn find_by_slug(&self, slug: &str) -> Option<Post> {
        self.list_all().into_iter().find(|p| p.slug == slug)
    }

    pub fn find_by_id(&self, id: &str) -> Option<Post> {
        self.list_all().into_iter().find(|p| p.id.as_str() == id)
    }

    /// Fresh in-memory draft. Not persisted until saved.
    pub fn create(&self) -> Post {
        Post::new_draft(self.clock.now())
    }

    /// Persist `post` into the collection its status names and return it as
    /// stored.
    ///
    /// Both collections are read before anything is written. Publishing
    /// upserts the published copy first, then drops the draft copy, so a
    /// failure between the two writes leaves the post in both collections
    /// rather than neither. Saving a published post back as a draft only
    /// writes the draft collection; the published copy stays.
    pub fn save(&self, post: Post) -> StoreResult<Post> {
        let now = self.clock.now();

        let mut post = post;
        if post.slug.is_empty() {
            post.slug = derive_slug(&post.title);
        }
        post.reading_time = reading_time(&post.content);
        if now > post.updated_at {
            post.updated_at = now;
        }

        match post.status {
            PostStatus::Published => {
                let mut drafts = self.load(DRAFTS_KEY)?;
                let mut published = self.load(PUBLISHED_KEY)?;
                let existing = published.iter().position(|p| p.id == post.id);

                post.published_at = existing
                    .and_then(|i| published[i].published_at)
                    .or(post.published_at)
                    .or(Some(now));
                if let Some(prev) = existing.map(|i| published[i].updated_at) {
                    if prev > post.updated_at {
                        post.updated_at = prev;
                    }
                }

                match existing {
                    Some(i) => published[i] = post.clone(),
                    None => published.push(post.clone()),
                }
                self.store(PUBLISHED_KEY, &published)?;

                let before = drafts.len();
                drafts.retain(|d| d.id != post.id);
                if drafts.len() != before {
                    self.store(DRAFTS_KEY, &drafts)?;
                }

                tracing::info!("Published post {} ({})", post.id, post.slug);
            }
            PostStatus::Draft => {
                let mut drafts = self.load(DRAFTS_KEY)?;

                match drafts.iter().position(|d| d.id == post.id) {
                    Some(i) => {
                        if drafts[i].updated_at > post.updated_at {
                            post.updated_at = drafts[i].updated_at;
                        }
                        drafts[i] = post.clone();
                    }
                    None => drafts.push(post.clone()),
                }
                self.store(DRAFTS_KEY, &drafts)?;

                tracing::debug!("Saved draft {} ({})", post.id, post.slug);
            }
        }

        Ok(post)
    }

    /// Remove `id` from both collections. Deleting a missing id is a no-op.
    pub fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let mut published = self.load(PUBLISHED_KEY)?;
        let mut drafts = self.load(DRAFTS_KEY)?;

        published.retain(|p| p.id.as_str() != id);
        drafts.retain(|d| d.id.as_str() != id);
        self.store(PUBLISHED_KEY, &published)?;
        self.store(DRAFTS_KEY, &drafts)?;

        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    fn load_or_empty(&self, key: &str) -> Vec<Post> {
        self.load(key).unwrap_or_else(|e| {
            tracing::error!("Could not read {}: {}", key, e);
            Vec::new()
        })
    }

    /// Absent and corrupt collections both decode as empty. Only backend
    /// failures are errors.
    fn load(&self, key: &str) -> StoreResult<Vec<Post>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(posts) => Ok(posts),
            Err(e) => {
                tracing::warn!("Ignoring corrupt collection {}: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, key: &str, posts: &[Post]) -> StoreResult<()> {
        let json = serde_json::to_string(posts)?;
        self.storage.set(key, &json)
    }
}
