//! Site structure and page building for buku.
//!
//! This crate turns a configured book into a static HTML site:
//!
//! - [`Outline`]: nested navigation built from a chapter's heading sequence
//! - [`Templates`]: minijinja page templates (cover, toc, chapter)
//! - [`BookBuilder`]: the one-shot build orchestrator
//! - [`assets`]: static asset subtree copying
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use buku_config::Config;
//! use buku_site::BookBuilder;
//!
//! let config = Config::load(None, None)?;
//! let summary = BookBuilder::new(&config).build()?;
//! println!("built {} chapters", summary.built.len());
//! # Ok(())
//! # }
//! ```

pub mod assets;
mod builder;
mod outline;
mod template;

pub use builder::{BookBuilder, BuildError, BuildSummary, ChapterRecord};
pub use outline::{NavEntry, Outline, OutlineOptions};
pub use template::{
    BookContext, ChapterContext, ChapterNavContext, CoverContext, TemplateError, Templates,
    TocContext,
};
