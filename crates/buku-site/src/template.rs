//! Page templates and render contexts.
//!
//! Templates are minijinja files loaded from the book's `templates/`
//! directory. Each page type has a fixed, serde-serializable context shape;
//! HTML fragments (chapter body, navigation) are rendered and escaped before
//! they reach the template, so autoescaping is disabled.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, path_loader};
use serde::Serialize;

use buku_config::BookMeta;

/// Template rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Templates directory not found.
    #[error("Templates directory not found: {}", .0.display())]
    MissingDir(PathBuf),
    /// Template missing or failed to render.
    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// Book metadata exposed to every page template as `book`.
#[derive(Debug, Serialize)]
pub struct BookContext {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub language: String,
}

impl From<&BookMeta> for BookContext {
    fn from(meta: &BookMeta) -> Self {
        Self {
            title: meta.title.clone(),
            author: meta.author.clone(),
            description: meta.description.clone(),
            language: meta.language.clone(),
        }
    }
}

/// Prev/toc/next page links exposed to templates as `chapter_nav`.
#[derive(Clone, Debug, Serialize)]
pub struct ChapterNavContext {
    /// Previous page, `None` on the cover.
    pub prev: Option<String>,
    /// Table-of-contents link.
    pub toc: String,
    /// Next page, `None` on the last chapter.
    pub next: Option<String>,
}

impl ChapterNavContext {
    /// Navigation for the cover page: nothing before it, toc after.
    #[must_use]
    pub fn cover() -> Self {
        Self {
            prev: None,
            toc: "toc.html#toc-list".to_owned(),
            next: Some("toc.html#toc-list".to_owned()),
        }
    }

    /// Navigation for the toc page: cover before, the first chapter after.
    #[must_use]
    pub fn toc(first_chapter: Option<&str>) -> Self {
        Self {
            prev: Some("cover.html".to_owned()),
            toc: "#toc-list".to_owned(),
            next: first_chapter.map(|key| format!("{key}.html#chapter")),
        }
    }

    /// Navigation for a chapter page: neighbors by build order, with the
    /// toc page standing in before the first chapter.
    #[must_use]
    pub fn chapter(prev: Option<&str>, next: Option<&str>) -> Self {
        Self {
            prev: Some(match prev {
                Some(key) => format!("{key}.html#chapter"),
                None => "toc.html#toc-list".to_owned(),
            }),
            toc: "toc.html#toc-list".to_owned(),
            next: next.map(|key| format!("{key}.html#chapter")),
        }
    }
}

/// Context for `cover.html`.
#[derive(Debug, Serialize)]
pub struct CoverContext<'a> {
    pub book: &'a BookContext,
    pub chapter_nav: ChapterNavContext,
}

/// Context for `toc.html`. `toc` is the serialized cross-chapter outline.
#[derive(Debug, Serialize)]
pub struct TocContext<'a> {
    pub book: &'a BookContext,
    pub toc: &'a str,
    pub chapter_nav: ChapterNavContext,
}

/// Context for `chapter.html`. `chapter` is the rendered chapter HTML and
/// `nav` the sidebar navigation fragment.
#[derive(Debug, Serialize)]
pub struct ChapterContext<'a> {
    pub book: &'a BookContext,
    pub title: &'a str,
    pub chapter: &'a str,
    pub nav: &'a str,
    pub chapter_nav: ChapterNavContext,
}

/// Page template environment loaded from a templates directory.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Load templates from a directory.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::MissingDir` if the directory doesn't exist.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::MissingDir(dir.to_path_buf()));
        }
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        // Contexts carry pre-rendered, pre-escaped HTML fragments
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Ok(Self { env })
    }

    /// Render a named template with the given context.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Render` if the template is missing or fails
    /// to render.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, TemplateError> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}
