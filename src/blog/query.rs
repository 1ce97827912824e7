// Read-side filters over already-loaded posts. All linear scans.
use crate::blog::post::Post;

/// Case-insensitive substring match over title, excerpt, content and tags.
/// A blank query keeps everything.
pub fn search(posts: Vec<Post>, text: &str) -> Vec<Post> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return posts;
    }

    posts
        .into_iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.excerpt.to_lowercase().contains(&needle)
                || p.content.to_lowercase().contains(&needle)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Posts carrying `tag`, compared case-insensitively.
pub fn filter_by_tag(posts: Vec<Post>, tag: &str) -> Vec<Post> {
    let tag = tag.trim().to_lowercase();
    posts
        .into_iter()
        .filter(|p| p.tags.iter().any(|t| t.to_lowercase() == tag))
        .collect()
}

/// Distinct tags across `posts`, sorted. Tags differing only in case are
/// merged under the first spelling seen.
pub fn all_tags(posts: &[Post]) -> Vec<String> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        let key = tag.to_lowercase();
        if !seen.iter().any(|(k, _)| *k == key) {
            seen.push((key, tag.clone()));
        }
    }
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    seen.into_iter().map(|(_, tag)| tag).collect()
}

/// Most recent first, by publication date or creation date for drafts.
pub fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        let a = a.published_at.unwrap_or(a.created_at);
        let b = b.published_at.unwrap_or(b.created_at);
        b.cmp(&a)
    });
    posts
}
