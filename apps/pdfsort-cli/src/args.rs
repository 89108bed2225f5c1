use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pdfsort_core::config::EmbedderKind;
use pdfsort_core::SorterConfig;

/// Sort a folder of PDFs into <language>/<topic>/ folders.
#[derive(Parser, Debug)]
#[command(name = "pdfsort")]
#[command(version)]
pub struct Args {
    /// Directory holding the PDFs to sort
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Root of the sorted tree
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Where the run logs go (default: <output>/logs)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Extra TOML config merged over config.toml and APP_* variables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Descend into subdirectories of the input
    #[arg(short, long)]
    pub recursive: bool,

    /// Copy instead of move
    #[arg(long)]
    pub keep_originals: bool,

    /// Only read the first and last pages, N in total (0 = all pages)
    #[arg(long, value_name = "N")]
    pub sample_pages: Option<usize>,

    /// Extraction worker threads (0 = one per core)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    #[arg(long, value_enum)]
    pub embedder: Option<EmbedderArg>,

    /// Warnings only, no progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedderArg {
    Hashing,
    BgeM3,
}

impl From<EmbedderArg> for EmbedderKind {
    fn from(arg: EmbedderArg) -> Self {
        match arg {
            EmbedderArg::Hashing => EmbedderKind::Hashing,
            EmbedderArg::BgeM3 => EmbedderKind::BgeM3,
        }
    }
}

impl Args {
    /// Flags win over every config layer. Flags that are absent leave the config alone.
    pub fn apply(&self, config: &mut SorterConfig) {
        if let Some(input) = &self.input {
            config.paths.input_dir = input.to_string_lossy().into_owned();
        }
        if let Some(output) = &self.output {
            config.paths.output_dir = output.to_string_lossy().into_owned();
        }
        if let Some(log_dir) = &self.log_dir {
            config.paths.log_dir = Some(log_dir.to_string_lossy().into_owned());
        }
        if self.recursive {
            config.discovery.recursive = true;
        }
        if self.keep_originals {
            config.placement.keep_originals = true;
        }
        if let Some(n) = self.sample_pages {
            config.extraction.sample_pages = n;
        }
        if let Some(n) = self.workers {
            config.extraction.max_workers = n;
        }
        if let Some(embedder) = self.embedder {
            config.topics.embedder = embedder.into();
        }
    }
}
