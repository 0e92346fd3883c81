//! Rendering state trackers and shared helpers.

use std::collections::HashMap;

/// A heading extracted during rendering.
///
/// Levels 2-6 only: the H1 feeds title extraction and is rendered in the
/// body, but it never becomes a navigation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (2-6, lower is more significant).
    pub level: u8,
    /// Plain display text with inline markup stripped.
    pub title: String,
    /// Anchor id, unique within one rendered document.
    pub id: String,
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Slugify heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics, collapses whitespace and hyphen runs
/// into single hyphens, and drops everything else. An all-symbol heading
/// falls back to `"section"` so ids are never empty.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Tracks the heading currently being rendered, extracted headings,
/// title capture, and anchor id uniqueness.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Level of the heading currently open, if any.
    active: Option<u8>,
    /// Plain text accumulated for the open heading.
    text: String,
    /// Inline HTML accumulated for the open heading.
    html: String,
    /// Extracted title from the first H1, when enabled.
    title: Option<String>,
    extract_title: bool,
    seen_h1: bool,
    headings: Vec<Heading>,
    /// Occurrence count per base slug, for `-1`/`-2` dedup suffixes.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            ..Self::default()
        }
    }

    pub(crate) fn start(&mut self, level: u8) {
        self.active = Some(level);
        self.text.clear();
        self.html.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    /// Close the open heading: assign a unique anchor id, capture the title
    /// from the first H1 (when enabled), and record levels 2-6 for
    /// navigation. Returns `(level, id, inline_html)` for the caller to
    /// write the tag.
    pub(crate) fn complete(&mut self) -> (u8, String, String) {
        let level = self.active.take().unwrap_or(1);
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);

        let id = self.unique_id(&text);

        if level == 1 {
            if self.extract_title && !self.seen_h1 {
                self.title = Some(text.trim().to_owned());
            }
            self.seen_h1 = true;
        } else {
            self.headings.push(Heading {
                level,
                title: text.trim().to_owned(),
                id: id.clone(),
            });
        }

        (level, id, html)
    }

    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.id_counts.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_headings(&mut self) -> Vec<Heading> {
        std::mem::take(&mut self.headings)
    }
}

/// Tracks an open fenced or indented code block.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    content: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.content.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub(crate) fn push_newline(&mut self) {
        self.content.push('\n');
    }

    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.content))
    }
}

/// Collects alt text while an image tag is open.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt.push_str(text);
    }

    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("\"hi\""), "&quot;hi&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Section Title"), "section-title");
        assert_eq!(slugify("Install npm"), "install-npm");
    }

    #[test]
    fn slugify_drops_symbols() {
        assert_eq!(slugify("What? Why!"), "what-why");
        assert_eq!(slugify("a  --  b"), "a-b");
    }

    #[test]
    fn slugify_underscores() {
        assert_eq!(slugify("getting_started"), "getting-started");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify("???"), "section");
        assert_eq!(slugify(""), "section");
    }

    #[test]
    fn heading_ids_deduplicated() {
        let mut state = HeadingState::new(false);
        for _ in 0..3 {
            state.start(2);
            state.push_text("FAQ");
            state.complete();
        }
        let headings = state.take_headings();
        assert_eq!(headings[0].id, "faq");
        assert_eq!(headings[1].id, "faq-1");
        assert_eq!(headings[2].id, "faq-2");
    }

    #[test]
    fn h1_feeds_title_not_navigation() {
        let mut state = HeadingState::new(true);
        state.start(1);
        state.push_text("Book Title");
        state.complete();
        state.start(2);
        state.push_text("Intro");
        state.complete();

        assert_eq!(state.take_title(), Some("Book Title".to_owned()));
        let headings = state.take_headings();
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].title, "Intro");
    }

    #[test]
    fn only_first_h1_becomes_title() {
        let mut state = HeadingState::new(true);
        state.start(1);
        state.push_text("First");
        state.complete();
        state.start(1);
        state.push_text("Second");
        state.complete();
        assert_eq!(state.take_title(), Some("First".to_owned()));
    }
}
