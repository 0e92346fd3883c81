//! `buku build` command implementation.

use std::path::PathBuf;

use buku_config::{CliSettings, Config};
use buku_site::BookBuilder;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Markdown chapter source directory (overrides config).
    #[arg(long)]
    chapters_dir: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Prefix chapter and heading titles with chapter numbers.
    #[arg(long)]
    prefix_chapter_number: bool,

    /// Path to configuration file (default: auto-discover book.yaml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            chapters_dir: self.chapters_dir.clone(),
            templates_dir: self.templates_dir.clone(),
            build_dir: self.output_dir.clone(),
            prefix_numbers: self.prefix_chapter_number.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Book: {}", config.book.title));
        output.info(&format!(
            "Chapters: {}",
            config.paths_resolved.chapters_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.paths_resolved.build_dir.display()
        ));

        let summary = BookBuilder::new(&config).build()?;

        for key in &summary.skipped {
            output.warning(&format!("Skipped missing chapter: {key}"));
        }
        output.success(&format!(
            "Book built successfully ({} chapters) to {}",
            summary.built.len(),
            config.paths_resolved.build_dir.display()
        ));
        Ok(())
    }
}
