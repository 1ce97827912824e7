// Who sees what. These rules live with the presentation layer: they read the
// gate's admin flag and the store, but the store itself never checks them.
use crate::blog::post::Post;
use crate::blog::store::ContentStore;

/// What the blog index shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub published: Vec<Post>,
    pub drafts: Vec<Post>,
}

/// Admins see the whole published collection plus drafts. Guests see only
/// published-collection entries whose status is actually published.
pub fn listing(store: &ContentStore, is_admin: bool) -> Listing {
    if is_admin {
        Listing {
            published: store.list_published(),
            drafts: store.list_drafts(),
        }
    } else {
        Listing {
            published: store
                .list_published()
                .into_iter()
                .filter(Post::is_published)
                .collect(),
            drafts: Vec::new(),
        }
    }
}

/// The post page. A draft looks the same as a missing post to guests.
pub fn readable_by_slug(store: &ContentStore, slug: &str, is_admin: bool) -> Option<Post> {
    store
        .find_by_slug(slug)
        .filter(|post| is_admin || post.is_published())
}

/// The editor page. Guests never get a post to edit.
pub fn editable_by_id(store: &ContentStore, id: &str, is_admin: bool) -> Option<Post> {
    if !is_admin {
        tracing::debug!("Refusing editor for {} to guest", id);
        return None;
    }
    store.find_by_id(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::post::PostStatus;
    use crate::clock::SystemClock;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn seeded() -> (ContentStore, Post, Post) {
        let store = ContentStore::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock));

        let mut draft = store.create();
        draft.title = "Work in progress".into();
        let draft = store.save(draft).unwrap();

        let mut live = store.create();
        live.title = "Shipped".into();
        live.status = PostStatus::Published;
        let live = store.save(live).unwrap();

        (store, draft, live)
    }

    #[test]
    fn guest_listing_hides_drafts() {
        let (store, _, live) = seeded();
        let listing = listing(&store, false);
        assert_eq!(listing.published, vec![live]);
        assert!(listing.drafts.is_empty());
    }

    #[test]
    fn admin_listing_includes_drafts() {
        let (store, draft, live) = seeded();
        let listing = listing(&store, true);
        assert_eq!(listing.published, vec![live]);
        assert_eq!(listing.drafts, vec![draft]);
    }

    #[test]
    fn draft_slug_is_not_found_for_guests() {
        let (store, draft, live) = seeded();
        assert!(readable_by_slug(&store, &draft.slug, false).is_none());
        assert_eq!(readable_by_slug(&store, &draft.slug, true), Some(draft));
        assert_eq!(readable_by_slug(&store, &live.slug, false), Some(live));
    }

    #[test]
    fn editor_requires_admin() {
        let (store, draft, _) = seeded();
        assert!(editable_by_id(&store, draft.id.as_str(), false).is_none());
        assert_eq!(editable_by_id(&store, draft.id.as_str(), true), Some(draft));
    }
}
