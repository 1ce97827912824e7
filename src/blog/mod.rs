pub mod post;
pub mod query;
pub mod snippets;
pub mod store;
pub mod visibility;

pub use post::{derive_slug, format_date, reading_time, Post, PostId, PostStatus};
pub use store::ContentStore;
pub use visibility::Listing;
