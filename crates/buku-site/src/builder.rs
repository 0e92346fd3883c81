//! Book build orchestration.
//!
//! [`BookBuilder`] runs the one-shot batch build: render every configured
//! chapter, derive titles, assemble navigation fragments, render page
//! templates, write the output files, and copy static assets. One output
//! file per built chapter plus `cover.html` and `toc.html`.

use std::collections::BTreeMap;
use std::fmt::Write;

use buku_config::Config;
use buku_renderer::{Heading, MarkdownRenderer, escape_html};

use crate::assets;
use crate::outline::{Outline, OutlineOptions};
use crate::template::{
    BookContext, ChapterContext, ChapterNavContext, CoverContext, TemplateError, Templates,
    TocContext,
};

const COVER_TEMPLATE: &str = "cover.html";
const TOC_TEMPLATE: &str = "toc.html";
const CHAPTER_TEMPLATE: &str = "chapter.html";

/// Error returned when a build fails.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// I/O error reading sources or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Template loading or rendering failure.
    #[error("{0}")]
    Template(#[from] TemplateError),
}

/// A chapter that survived the render pass.
#[derive(Clone, Debug)]
pub struct ChapterRecord {
    /// Chapter key from the configuration.
    pub key: String,
    /// Chapter number over built chapters, when numbering is enabled.
    pub number: Option<usize>,
    /// Derived title (first H1, or the key with underscores as spaces),
    /// with the number prefix already applied.
    pub title: String,
    /// Rendered HTML body.
    pub html: String,
    /// Headings (levels 2-6) in document order.
    pub headings: Vec<Heading>,
}

/// Result of a completed build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Chapter keys written, in build order.
    pub built: Vec<String>,
    /// Chapter keys skipped because their source file was missing.
    pub skipped: Vec<String>,
    /// Derived title per built chapter key.
    pub titles: BTreeMap<String, String>,
}

/// One-shot book builder.
///
/// Single-threaded and synchronous: a build either completes or fails on
/// the first unrecoverable error. A missing chapter source skips that
/// chapter; a missing or broken template is fatal.
pub struct BookBuilder<'a> {
    config: &'a Config,
}

impl<'a> BookBuilder<'a> {
    /// Create a builder over a loaded configuration.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Returns `BuildError` on template failures or on any I/O error other
    /// than a missing chapter source.
    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        let paths = &self.config.paths_resolved;
        let templates = Templates::from_dir(&paths.templates_dir)?;
        std::fs::create_dir_all(&paths.build_dir)?;

        let (chapters, skipped) = self.render_chapters()?;
        let book = BookContext::from(&self.config.book);

        for (index, chapter) in chapters.iter().enumerate() {
            let nav = sidebar_fragment(&chapters, &chapter.key);
            let prev = index.checked_sub(1).map(|i| chapters[i].key.as_str());
            let next = chapters.get(index + 1).map(|c| c.key.as_str());

            let page = templates.render(
                CHAPTER_TEMPLATE,
                ChapterContext {
                    book: &book,
                    title: &chapter.title,
                    chapter: &chapter.html,
                    nav: &nav,
                    chapter_nav: ChapterNavContext::chapter(prev, next),
                },
            )?;

            let out_path = paths.build_dir.join(format!("{}.html", chapter.key));
            std::fs::write(&out_path, page)?;
            tracing::info!(chapter = %chapter.key, path = %out_path.display(), "wrote chapter");
        }

        let cover = templates.render(
            COVER_TEMPLATE,
            CoverContext {
                book: &book,
                chapter_nav: ChapterNavContext::cover(),
            },
        )?;
        std::fs::write(paths.build_dir.join(COVER_TEMPLATE), cover)?;

        let toc_fragment = toc_fragment(&chapters);
        let toc = templates.render(
            TOC_TEMPLATE,
            TocContext {
                book: &book,
                toc: &toc_fragment,
                chapter_nav: ChapterNavContext::toc(chapters.first().map(|c| c.key.as_str())),
            },
        )?;
        std::fs::write(paths.build_dir.join(TOC_TEMPLATE), toc)?;

        self.copy_static_assets()?;

        let mut summary = BuildSummary {
            skipped,
            ..BuildSummary::default()
        };
        for chapter in chapters {
            summary.titles.insert(chapter.key.clone(), chapter.title);
            summary.built.push(chapter.key);
        }
        Ok(summary)
    }

    /// Render every configured chapter that has a source file.
    ///
    /// Returns the built records in configuration order plus the skipped
    /// keys. Titles and numbering are derived here; the record list is the
    /// only carrier of cross-chapter state (no shared mutable cache).
    fn render_chapters(&self) -> Result<(Vec<ChapterRecord>, Vec<String>), BuildError> {
        let paths = &self.config.paths_resolved;
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for key in &self.config.chapters {
            let source = paths.chapter_source(key);
            if !source.exists() {
                tracing::warn!(chapter = %key, path = %source.display(), "chapter source missing, skipping");
                skipped.push(key.clone());
                continue;
            }

            let markdown = std::fs::read_to_string(&source)?;
            let result = MarkdownRenderer::new()
                .with_title_extraction()
                .render_markdown(&markdown);

            let number = self.config.prefix_numbers.then(|| records.len() + 1);
            let title = derive_title(result.title, key, number);

            records.push(ChapterRecord {
                key: key.clone(),
                number,
                title,
                html: result.html,
                headings: result.headings,
            });
        }

        Ok((records, skipped))
    }

    fn copy_static_assets(&self) -> Result<(), BuildError> {
        let paths = &self.config.paths_resolved;
        let static_dir = paths.static_dir();
        if !static_dir.exists() {
            tracing::warn!(path = %static_dir.display(), "static assets missing, skipping");
            return Ok(());
        }
        assets::copy_static(&static_dir, &paths.build_dir.join("static"))?;
        Ok(())
    }
}

/// Derive a chapter title: first-H1 text, else the key with underscores
/// replaced by spaces; numbered chapters get an `N. ` prefix.
fn derive_title(extracted: Option<String>, key: &str, number: Option<usize>) -> String {
    let base = extracted.unwrap_or_else(|| key.replace('_', " "));
    match number {
        Some(n) => format!("{n}. {base}"),
        None => base,
    }
}

/// Build the sidebar fragment for one chapter page: every built chapter as
/// a list entry, with the current chapter marked and carrying its own
/// nested outline.
fn sidebar_fragment(chapters: &[ChapterRecord], current: &str) -> String {
    let mut nav = String::from(r#"<ol id="chapter-nav" class="nav">"#);
    for chapter in chapters {
        let href = format!("{}.html#book", chapter.key);
        if chapter.key == current {
            write!(
                nav,
                r#"<li id="current-chapter"><a href="{href}">{}</a>"#,
                escape_html(&chapter.title)
            )
            .unwrap();
            let outline = Outline::from_headings(
                &chapter.headings,
                &OutlineOptions {
                    href_prefix: None,
                    number: chapter.number,
                },
            );
            nav.push_str(&outline.to_html());
            nav.push_str("</li>");
        } else {
            write!(
                nav,
                r#"<li><a href="{href}">{}</a></li>"#,
                escape_html(&chapter.title)
            )
            .unwrap();
        }
    }
    nav.push_str("</ol>");
    nav
}

/// Build the cross-chapter toc fragment: every chapter's outline nested
/// under its entry, link targets prefixed with the owning chapter's file.
fn toc_fragment(chapters: &[ChapterRecord]) -> String {
    let mut toc = String::from(r#"<ol id="toc-list" class="toc">"#);
    for chapter in chapters {
        let file = format!("{}.html", chapter.key);
        write!(
            toc,
            r#"<li><a href="{file}#book">{}</a>"#,
            escape_html(&chapter.title)
        )
        .unwrap();
        let outline = Outline::from_headings(
            &chapter.headings,
            &OutlineOptions {
                href_prefix: Some(&file),
                number: chapter.number,
            },
        );
        toc.push_str(&outline.to_html());
        toc.push_str("</li>");
    }
    toc.push_str("</ol>");
    toc
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    const TEMPLATES: &[(&str, &str)] = &[
        ("cover.html", "COVER:{{ book.title }}"),
        ("toc.html", "TOC:{{ toc }}|next={{ chapter_nav.next }}"),
        (
            "chapter.html",
            "{{ title }}|{{ nav }}|{{ chapter }}|prev={{ chapter_nav.prev }}|next={{ chapter_nav.next }}",
        ),
    ];

    fn write_templates(base: &Path) {
        let dir = base.join("templates");
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in TEMPLATES {
            std::fs::write(dir.join(name), content).unwrap();
        }
    }

    fn write_chapter(base: &Path, key: &str, markdown: &str) {
        let dir = base.join("chapters");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{key}.md")), markdown).unwrap();
    }

    fn config(base: &Path, chapters: &[&str]) -> Config {
        let mut yaml = String::from("book:\n  title: Test Book\nchapters:\n");
        for key in chapters {
            yaml.push_str(&format!("  - {key}\n"));
        }
        Config::from_yaml(&yaml, base).unwrap()
    }

    fn read(base: &Path, name: &str) -> String {
        std::fs::read_to_string(base.join("build").join(name)).unwrap()
    }

    #[test]
    fn builds_chapter_cover_and_toc() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "intro", "# Intro\n\n## One\n\n## Two");

        let config = config(dir.path(), &["intro"]);
        let summary = BookBuilder::new(&config).build().unwrap();

        assert_eq!(summary.built, vec!["intro"]);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.titles.get("intro").map(String::as_str), Some("Intro"));

        let chapter = read(dir.path(), "intro.html");
        assert!(chapter.starts_with("Intro|"));
        assert!(chapter.contains(r#"<ol id="chapter-nav" class="nav">"#));
        assert!(chapter.contains(r#"<li id="current-chapter"><a href="intro.html#book">Intro</a>"#));
        assert!(chapter.contains(r##"<a href="#one">One</a>"##));
        assert!(chapter.contains(r#"<h2 id="one">One</h2>"#));

        let cover = read(dir.path(), "cover.html");
        assert_eq!(cover, "COVER:Test Book");

        let toc = read(dir.path(), "toc.html");
        assert!(toc.contains(r#"<ol id="toc-list" class="toc">"#));
        assert!(toc.contains(r##"<a href="intro.html#one">One</a>"##));
    }

    #[test]
    fn missing_chapter_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "intro", "# Intro");

        let config = config(dir.path(), &["intro", "missing"]);
        let summary = BookBuilder::new(&config).build().unwrap();

        assert_eq!(summary.built, vec!["intro"]);
        assert_eq!(summary.skipped, vec!["missing"]);
        assert!(!dir.path().join("build/missing.html").exists());
    }

    #[test]
    fn title_falls_back_to_filename() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "getting_started", "No heading here.");

        let config = config(dir.path(), &["getting_started"]);
        let summary = BookBuilder::new(&config).build().unwrap();

        assert_eq!(
            summary.titles.get("getting_started").map(String::as_str),
            Some("getting started")
        );
    }

    #[test]
    fn chapter_nav_links_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "one", "# One");
        write_chapter(dir.path(), "two", "# Two");
        write_chapter(dir.path(), "three", "# Three");

        let config = config(dir.path(), &["one", "two", "three"]);
        BookBuilder::new(&config).build().unwrap();

        let first = read(dir.path(), "one.html");
        assert!(first.contains("prev=toc.html#toc-list"));
        assert!(first.contains("next=two.html#chapter"));

        let middle = read(dir.path(), "two.html");
        assert!(middle.contains("prev=one.html#chapter"));
        assert!(middle.contains("next=three.html#chapter"));

        // A serialized Option renders as `None` when absent
        let last = read(dir.path(), "three.html");
        assert!(last.contains("next=None"));
        assert!(!last.contains("next=None.html"));
    }

    #[test]
    fn toc_next_points_to_first_chapter() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "intro", "# Intro");

        let config = config(dir.path(), &["intro"]);
        BookBuilder::new(&config).build().unwrap();

        let toc = read(dir.path(), "toc.html");
        assert!(toc.contains("next=intro.html#chapter"));
    }

    #[test]
    fn numbering_prefixes_titles_and_outline() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "one", "# First\n\n## Alpha");
        write_chapter(dir.path(), "three", "# Third");

        let yaml = "book:\n  title: T\nchapters:\n  - one\n  - missing\n  - three\n";
        let mut config = Config::from_yaml(yaml, dir.path()).unwrap();
        config.prefix_numbers = true;
        let summary = BookBuilder::new(&config).build().unwrap();

        // Numbers run over built chapters only
        assert_eq!(summary.titles.get("one").map(String::as_str), Some("1. First"));
        assert_eq!(summary.titles.get("three").map(String::as_str), Some("2. Third"));

        let page = read(dir.path(), "one.html");
        assert!(page.contains(r##"<a href="#alpha">1. Alpha</a>"##));
    }

    #[test]
    fn sidebar_lists_other_chapters_without_outline() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "one", "# One\n\n## A");
        write_chapter(dir.path(), "two", "# Two\n\n## B");

        let config = config(dir.path(), &["one", "two"]);
        BookBuilder::new(&config).build().unwrap();

        let page = read(dir.path(), "one.html");
        // Current chapter embeds its outline
        assert!(page.contains(r#"<li id="current-chapter"><a href="one.html#book">One</a><ol>"#));
        // The other chapter is a bare link
        assert!(page.contains(r#"<li><a href="two.html#book">Two</a></li>"#));
        assert!(!page.contains(r##"<a href="#b">"##));
    }

    #[test]
    fn copies_static_assets() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        let static_dir = dir.path().join("templates/static");
        std::fs::create_dir_all(static_dir.join("css")).unwrap();
        std::fs::write(static_dir.join("css/book.css"), "body {}").unwrap();
        write_chapter(dir.path(), "intro", "# Intro");

        let config = config(dir.path(), &["intro"]);
        BookBuilder::new(&config).build().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("build/static/css/book.css")).unwrap(),
            "body {}"
        );
    }

    #[test]
    fn build_without_static_dir_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        write_templates(dir.path());
        write_chapter(dir.path(), "intro", "# Intro");

        let config = config(dir.path(), &["intro"]);
        assert!(BookBuilder::new(&config).build().is_ok());
    }

    #[test]
    fn missing_templates_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_chapter(dir.path(), "intro", "# Intro");

        let config = config(dir.path(), &["intro"]);
        let err = BookBuilder::new(&config).build().unwrap_err();
        assert!(matches!(err, BuildError::Template(TemplateError::MissingDir(_))));
    }

    #[test]
    fn derive_title_variants() {
        assert_eq!(derive_title(Some("H1 Title".to_owned()), "key", None), "H1 Title");
        assert_eq!(derive_title(None, "getting_started", None), "getting started");
        assert_eq!(derive_title(None, "plain", None), "plain");
        assert_eq!(derive_title(Some("T".to_owned()), "k", Some(2)), "2. T");
    }
}
