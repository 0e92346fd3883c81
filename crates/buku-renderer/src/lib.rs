//! Markdown to HTML rendering for buku.
//!
//! This crate provides [`MarkdownRenderer`], an event-driven renderer built
//! on pulldown-cmark that produces semantic HTML5 with:
//!
//! - Fenced code blocks with `language-*` classes
//! - Slugified, deduplicated heading anchor ids
//! - First-H1 title extraction
//! - A flat, document-order list of [`Heading`] records (levels 2-6)
//!   for navigation building
//!
//! The renderer is a pure library: it never touches the filesystem. Callers
//! read chapter sources and pass the markdown text in.
//!
//! # Example
//!
//! ```
//! use buku_renderer::MarkdownRenderer;
//!
//! let markdown = "# Title\n\n## Section\n\nBody text.";
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render_markdown(markdown);
//!
//! assert_eq!(result.title.as_deref(), Some("Title"));
//! assert_eq!(result.headings.len(), 1);
//! assert_eq!(result.headings[0].id, "section");
//! ```

mod renderer;
mod state;
mod util;

pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{Heading, escape_html, slugify};
