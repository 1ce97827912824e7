//! Markdown fragments the editor toolbar inserts into a post body.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error("Invalid video URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No video id in {0}")]
    MissingVideoId(String),
}

pub fn image(url: &str, alt: Option<&str>) -> String {
    format!("![{}]({})", non_blank(alt).unwrap_or("Image"), url)
}

pub fn gif(url: &str, alt: Option<&str>) -> String {
    format!("![{}]({})", non_blank(alt).unwrap_or("GIF"), url)
}

/// YouTube and Vimeo links become iframe embeds. Anything else is assumed to
/// be a direct video file.
pub fn video(raw: &str) -> Result<String, SnippetError> {
    if raw.contains("youtube.com") || raw.contains("youtu.be") {
        let url = Url::parse(raw)?;
        let id = if raw.contains("youtu.be") {
            last_segment(&url)
        } else {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        };
        let id = id.ok_or_else(|| SnippetError::MissingVideoId(raw.to_string()))?;
        return Ok(format!(
            r#"<iframe width="100%" height="400" src="https://www.youtube.com/embed/{}" frameborder="0" allowfullscreen></iframe>"#,
            id
        ));
    }

    if raw.contains("vimeo.com") {
        let url = Url::parse(raw)?;
        let id = last_segment(&url).ok_or_else(|| SnippetError::MissingVideoId(raw.to_string()))?;
        return Ok(format!(
            r#"<iframe width="100%" height="400" src="https://player.vimeo.com/video/{}" frameborder="0" allowfullscreen></iframe>"#,
            id
        ));
    }

    Ok(format!(
        "<video width=\"100%\" controls>\n  <source src=\"{}\" type=\"video/mp4\">\n  Your browser does not support the video tag.\n</video>",
        raw
    ))
}

pub fn code_block(language: &str) -> String {
    format!("\n```{}\n// Your code here\n```\n", language.trim())
}

/// Append `snippet` on its own line.
pub fn append(content: &str, snippet: &str) -> String {
    format!("{}\n{}", content, snippet)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_defaults_alt_text() {
        assert_eq!(image("https://x.io/a.png", None), "![Image](https://x.io/a.png)");
        assert_eq!(image("https://x.io/a.png", Some("  ")), "![Image](https://x.io/a.png)");
        assert_eq!(image("https://x.io/a.png", Some("Cat")), "![Cat](https://x.io/a.png)");
        assert_eq!(gif("https://x.io/a.gif", None), "![GIF](https://x.io/a.gif)");
    }

    #[test]
    fn youtube_watch_link_embeds_by_query_id() {
        let html = video("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").unwrap();
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ\""));
    }

    #[test]
    fn youtu_be_link_embeds_by_path_id() {
        let html = video("https://youtu.be/dQw4w9WgXcQ?si=abc").unwrap();
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ\""));
    }

    #[test]
    fn vimeo_link_embeds() {
        let html = video("https://vimeo.com/76979871").unwrap();
        assert!(html.contains("https://player.vimeo.com/video/76979871"));
    }

    #[test]
    fn youtube_link_without_id_is_rejected() {
        assert!(matches!(
            video("https://www.youtube.com/feed"),
            Err(SnippetError::MissingVideoId(_))
        ));
        assert!(matches!(
            video("youtube.com/watch?v=x"),
            Err(SnippetError::InvalidUrl(_))
        ));
    }

    #[test]
    fn other_links_become_video_tags() {
        let html = video("/media/clip.mp4").unwrap();
        assert!(html.starts_with("<video"));
        assert!(html.contains("src=\"/media/clip.mp4\""));
    }

    #[test]
    fn code_block_is_fenced() {
        assert_eq!(code_block("rust"), "\n```rust\n// Your code here\n```\n");
    }

    #[test]
    fn append_adds_newline() {
        assert_eq!(append("intro", "![Image](u)"), "intro\n![Image](u)");
    }
}
