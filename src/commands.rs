use std::path::PathBuf;

use anyhow::{anyhow, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::auth::digest::hash_password;
use crate::auth::session::SessionGate;
use crate::blog::post::{Post, PostStatus};
use crate::blog::{query, snippets, visibility};
use crate::clock::Clock;
use crate::error::StoreError;
use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the digest of a password, for auth.password_hash
    HashPassword { password: String },

    /// Start an admin session
    Login {
        #[arg(long)]
        password: String,
    },

    /// End the admin session
    Logout,

    /// Show whether an admin session is active
    Status,

    /// Write a new post (saved as a draft unless --publish)
    New {
        #[command(flatten)]
        fields: PostFields,

        #[arg(long)]
        publish: bool,
    },

    /// Change an existing post
    Edit {
        id: String,

        #[command(flatten)]
        fields: PostFields,

        #[arg(long)]
        publish: bool,
    },

    /// Publish a draft
    Publish { id: String },

    /// List posts, newest first
    List {
        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// Print one post
    Show { slug: String },

    /// Delete a post from drafts and published
    Delete { id: String },

    /// List every tag in use
    Tags,

    /// Append a media or code snippet to a post body
    Insert {
        id: String,

        #[command(subcommand)]
        snippet: Snippet,
    },
}

#[derive(Args, Debug, Default)]
pub struct PostFields {
    #[arg(long)]
    pub title: Option<String>,

    /// Overrides the slug derived from the title
    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long)]
    pub excerpt: Option<String>,

    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the Markdown body from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Cover image URL; pass an empty string to clear it
    #[arg(long)]
    pub cover_image: Option<String>,

    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long = "remove-tag")]
    pub remove_tags: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Snippet {
    Image {
        url: String,
        #[arg(long)]
        alt: Option<String>,
    },
    Gif {
        url: String,
        #[arg(long)]
        alt: Option<String>,
    },
    Video { url: String },
    Code { language: String },
}

/// Run one command and return what it prints.
pub fn run(state: &AppState, command: Command) -> anyhow::Result<String> {
    let store = state.content_store();
    let now = state.clock.now();

    match command {
        Command::HashPassword { password } => Ok(hash_password(&password)),

        Command::Login { password } => {
            let mut gate = state.session_gate();
            if !gate.login(&password).map_err(could_not_save)? {
                bail!("Invalid password");
            }
            Ok(match gate.expires_at() {
                Some(at) => format!("Logged in until {}", at.format("%Y-%m-%d %H:%M UTC")),
                None => "Logged in".to_string(),
            })
        }

        Command::Logout => {
            state.session_gate().logout().map_err(could_not_save)?;
            Ok("Logged out".to_string())
        }

        Command::Status => {
            let gate = state.session_gate();
            Ok(match gate.expires_at() {
                Some(at) => format!("admin (until {})", at.format("%Y-%m-%d %H:%M UTC")),
                None => gate.state().as_str().to_string(),
            })
        }

        Command::New { fields, publish } => {
            require_admin(&state.session_gate())?;
            let mut post = store.create();
            apply_fields(&mut post, fields, now)?;
            if post.title.trim().is_empty() {
                bail!("A post needs a --title");
            }
            if publish {
                post.status = PostStatus::Published;
            }
            let saved = store.save(post).map_err(could_not_save)?;
            Ok(format!("{} {} ({})", saved.status, saved.id, saved.slug))
        }

        Command::Edit { id, fields, publish } => {
            let gate = state.session_gate();
            let mut post = editable(state, &gate, &id)?;
            apply_fields(&mut post, fields, now)?;
            if publish {
                post.status = PostStatus::Published;
            }
            let saved = store.save(post).map_err(could_not_save)?;
            Ok(format!("Saved {} ({})", saved.id, saved.status))
        }

        Command::Publish { id } => {
            let gate = state.session_gate();
            let mut post = editable(state, &gate, &id)?;
            post.status = PostStatus::Published;
            let saved = store.save(post).map_err(could_not_save)?;
            Ok(format!("Published /blog/{} on {}", saved.slug, saved.display_date()))
        }

        Command::List { tag, search } => {
            let gate = state.session_gate();
            let listing = visibility::listing(&store, gate.is_admin());

            let mut posts = listing.published;
            posts.extend(listing.drafts);
            if let Some(tag) = tag {
                posts = query::filter_by_tag(posts, &tag);
            }
            if let Some(text) = search {
                posts = query::search(posts, &text);
            }
            let posts = query::newest_first(posts);

            if posts.is_empty() {
                return Ok("No posts yet".to_string());
            }
            let lines: Vec<String> = posts
                .iter()
                .map(|post| {
                    format!(
                        "{:<9} {:<18} {} ({} min read) /blog/{}",
                        post.status,
                        post.display_date(),
                        post.title,
                        post.reading_time,
                        post.slug
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }

        Command::Show { slug } => {
            let gate = state.session_gate();
            let post = visibility::readable_by_slug(&store, &slug, gate.is_admin())
                .ok_or_else(|| anyhow!("Blog not found: {}", slug))?;
            Ok(render(&post))
        }

        Command::Delete { id } => {
            require_admin(&state.session_gate())?;
            store.delete_by_id(&id).map_err(could_not_save)?;
            Ok(format!("Deleted {}", id))
        }

        Command::Tags => {
            let gate = state.session_gate();
            let listing = visibility::listing(&store, gate.is_admin());
            let mut posts = listing.published;
            posts.extend(listing.drafts);
            Ok(query::all_tags(&posts).join("\n"))
        }

        Command::Insert { id, snippet } => {
            let gate = state.session_gate();
            let mut post = editable(state, &gate, &id)?;
            let fragment = match snippet {
                Snippet::Image { url, alt } => snippets::image(&url, alt.as_deref()),
                Snippet::Gif { url, alt } => snippets::gif(&url, alt.as_deref()),
                Snippet::Video { url } => snippets::video(&url)?,
                Snippet::Code { language } => snippets::code_block(&language),
            };
            let content = snippets::append(&post.content, &fragment);
            post.set_content(content, now);
            let saved = store.save(post).map_err(could_not_save)?;
            Ok(format!("Updated {} ({} min read)", saved.id, saved.reading_time))
        }
    }
}

fn require_admin(gate: &SessionGate) -> anyhow::Result<()> {
    if !gate.is_admin() {
        bail!("Admin session required. Run `folio login` first.");
    }
    Ok(())
}

fn editable(state: &AppState, gate: &SessionGate, id: &str) -> anyhow::Result<Post> {
    require_admin(gate)?;
    visibility::editable_by_id(&state.content_store(), id, gate.is_admin())
        .ok_or_else(|| anyhow!("No post with id {}", id))
}

fn could_not_save(err: StoreError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn apply_fields(post: &mut Post, fields: PostFields, now: DateTime<Utc>) -> anyhow::Result<()> {
    if let Some(title) = fields.title {
        post.set_title(title, now);
    }
    if let Some(slug) = fields.slug {
        post.slug = slug;
    }
    if let Some(excerpt) = fields.excerpt {
        post.excerpt = excerpt;
    }

    let content = match (fields.content, fields.content_file) {
        (Some(content), _) => Some(content),
        (None, Some(path)) => Some(std::fs::read_to_string(&path)?),
        (None, None) => None,
    };
    if let Some(content) = content {
        post.set_content(content, now);
    }

    if let Some(cover) = fields.cover_image {
        post.cover_image = Some(cover).filter(|c| !c.trim().is_empty());
    }
    for tag in &fields.tags {
        post.add_tag(tag, now);
    }
    for tag in &fields.remove_tags {
        post.remove_tag(tag, now);
    }
    Ok(())
}

fn render(post: &Post) -> String {
    let draft_marker = if post.status == PostStatus::Draft {
        " · draft"
    } else {
        ""
    };

    let mut out = format!("# {}\n", post.title);
    out.push_str(&format!(
        "{} · {} min read{}\n",
        post.display_date(),
        post.reading_time,
        draft_marker
    ));
    if !post.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", post.tags.join(", ")));
    }
    if let Some(cover) = &post.cover_image {
        out.push_str(&format!("cover: {}\n", cover));
    }
    if !post.excerpt.is_empty() {
        out.push_str(&format!("\n> {}\n", post.excerpt));
    }
    out.push_str(&format!("\n{}", post.content));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn state() -> (Arc<ManualClock>, AppState) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        ));
        let state = AppState::new(
            Config::default(),
            Arc::new(MemoryStorage::new()),
            clock.clone(),
        );
        (clock, state)
    }

    fn fields(title: &str, content: &str) -> PostFields {
        PostFields {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..PostFields::default()
        }
    }

    fn login(state: &AppState) {
        run(
            state,
            Command::Login {
                password: "admin123".into(),
            },
        )
        .unwrap();
    }

    fn id_from(output: &str) -> String {
        output.split_whitespace().nth(1).unwrap().to_string()
    }

    #[test]
    fn hash_password_prints_digest() {
        let (_, state) = state();
        let out = run(
            &state,
            Command::HashPassword {
                password: "admin123".into(),
            },
        )
        .unwrap();
        assert_eq!(out, "-g10hvh");
    }

    #[test]
    fn guests_cannot_write() {
        let (_, state) = state();
        let err = run(
            &state,
            Command::New {
                fields: fields("Nope", "body"),
                publish: false,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("Admin session required"));
        assert!(state.content_store().list_all().is_empty());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let (_, state) = state();
        let err = run(
            &state,
            Command::Login {
                password: "letmein".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid password");
        assert_eq!(run(&state, Command::Status).unwrap(), "guest");
    }

    #[test]
    fn draft_is_hidden_from_guests_until_published() {
        let (_, state) = state();
        login(&state);

        let out = run(
            &state,
            Command::New {
                fields: fields("Hello, World!", "first words"),
                publish: false,
            },
        )
        .unwrap();
        assert!(out.ends_with("(hello-world)"));
        let id = id_from(&out);

        run(&state, Command::Logout).unwrap();
        let err = run(&state, Command::Show { slug: "hello-world".into() }).unwrap_err();
        assert!(err.to_string().contains("Blog not found"));
        assert_eq!(
            run(&state, Command::List { tag: None, search: None }).unwrap(),
            "No posts yet"
        );

        login(&state);
        run(&state, Command::Publish { id }).unwrap();
        run(&state, Command::Logout).unwrap();

        let shown = run(&state, Command::Show { slug: "hello-world".into() }).unwrap();
        assert!(shown.starts_with("# Hello, World!\nOctober 16, 2026"));
        assert!(shown.ends_with("first words"));
    }

    #[test]
    fn list_filters_by_tag_and_search() {
        let (_, state) = state();
        login(&state);

        let mut rust = fields("Ownership", "borrowing explained");
        rust.tags = vec!["Rust".into()];
        run(&state, Command::New { fields: rust, publish: true }).unwrap();
        let mut bread = fields("Sourdough", "flour water salt");
        bread.tags = vec!["cooking".into()];
        run(&state, Command::New { fields: bread, publish: true }).unwrap();

        let out = run(
            &state,
            Command::List {
                tag: Some("rust".into()),
                search: None,
            },
        )
        .unwrap();
        assert!(out.contains("Ownership"));
        assert!(!out.contains("Sourdough"));

        let out = run(
            &state,
            Command::List {
                tag: None,
                search: Some("FLOUR".into()),
            },
        )
        .unwrap();
        assert!(out.contains("Sourdough"));
        assert!(!out.contains("Ownership"));

        assert_eq!(run(&state, Command::Tags).unwrap(), "cooking\nRust");
    }

    #[test]
    fn insert_appends_snippet() {
        let (_, state) = state();
        login(&state);
        let out = run(
            &state,
            Command::New {
                fields: fields("Media", "intro"),
                publish: false,
            },
        )
        .unwrap();
        let id = id_from(&out);

        run(
            &state,
            Command::Insert {
                id: id.clone(),
                snippet: Snippet::Image {
                    url: "https://x.io/a.png".into(),
                    alt: None,
                },
            },
        )
        .unwrap();

        let post = state.content_store().find_by_id(&id).unwrap();
        assert_eq!(post.content, "intro\n![Image](https://x.io/a.png)");
    }

    #[test]
    fn session_expires_after_a_day() {
        let (clock, state) = state();
        login(&state);
        assert!(run(&state, Command::Status).unwrap().starts_with("admin"));

        clock.advance(Duration::hours(24));
        assert_eq!(run(&state, Command::Status).unwrap(), "guest");
    }

    #[test]
    fn delete_removes_post() {
        let (_, state) = state();
        login(&state);
        let out = run(
            &state,
            Command::New {
                fields: fields("Gone soon", "bye"),
                publish: true,
            },
        )
        .unwrap();
        let id = id_from(&out);

        run(&state, Command::Delete { id: id.clone() }).unwrap();
        assert!(state.content_store().find_by_id(&id).is_none());
        run(&state, Command::Delete { id }).unwrap();
    }

    #[test]
    fn render_lays_out_header_and_body() {
        let (clock, _) = state();
        let mut post = Post::new_draft(clock.now());
        post.set_title("Field notes", clock.now());
        post.set_content("body text", clock.now());
        post.excerpt = "short version".into();
        post.cover_image = Some("https://x.io/c.png".into());
        post.tags = vec!["a".into(), "b".into()];

        assert_eq!(
            render(&post),
            "# Field notes\n\
             October 16, 2026 · 1 min read · draft\n\
             tags: a, b\n\
             cover: https://x.io/c.png\n\
             \n> short version\n\
             \nbody text"
        );

        let mut bare = Post::new_draft(clock.now());
        bare.title = "Bare".into();
        bare.status = PostStatus::Published;
        bare.published_at = Some(clock.now());
        assert_eq!(render(&bare), "# Bare\nOctober 16, 2026 · 0 min read\n\n");
    }

    #[test]
    fn edit_replaces_cover_and_tags() {
        let (_, state) = state();
        login(&state);
        let mut f = fields("Covered", "text");
        f.cover_image = Some("https://x.io/c.png".into());
        f.tags = vec!["a".into(), "b".into()];
        let id = id_from(&run(&state, Command::New { fields: f, publish: false }).unwrap());

        let edit = PostFields {
            cover_image: Some(String::new()),
            remove_tags: vec!["a".into()],
            ..PostFields::default()
        };
        run(&state, Command::Edit { id: id.clone(), fields: edit, publish: false }).unwrap();

        let post = state.content_store().find_by_id(&id).unwrap();
        assert!(post.cover_image.is_none());
        assert_eq!(post.tags, vec!["b"]);
        assert_eq!(post.slug, "covered");
    }
}
