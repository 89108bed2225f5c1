//! pdfsort-pipeline
//!
//! The batch job: discovery → extraction + fingerprint → classification →
//! placement. Extraction fans out over a rayon pool; the topic fit waits for
//! every extraction task and then runs once over the whole corpus.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use pdfsort_classify::{TopicAssignment, TopicModel, WhatlangDetector};
use pdfsort_core::discovery::DocumentScanner;
use pdfsort_core::error::{Error, Result};
use pdfsort_core::fingerprint::{sha256_hex, Fingerprint, FingerprintTable};
use pdfsort_core::traits::{Embedder, LanguageDetector, TextExtractor};
use pdfsort_core::types::{DocumentRecord, IndexEntry, Outcome};
use pdfsort_core::SorterConfig;
use pdfsort_extract::PdfTextExtractor;
use pdfsort_place::{IndexWriter, LogKind, Placer, RunLogs};

pub mod report;

pub use report::{DocumentSummary, RunReport};

pub const SUMMARY_FILE: &str = "summary.json";

pub struct Pipeline {
    config: SorterConfig,
    extractor: Box<dyn TextExtractor>,
    detector: Box<dyn LanguageDetector>,
    topics: TopicModel,
    show_progress: bool,
}

/// Output-side handles opened during setup.
struct Sinks {
    logs: RunLogs,
    index: IndexWriter,
    placer: Placer,
}

impl Pipeline {
    pub fn new(
        config: SorterConfig,
        extractor: Box<dyn TextExtractor>,
        detector: Box<dyn LanguageDetector>,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        let topics = TopicModel::new(config.topics.clone(), embedder);
        Self { config, extractor, detector, topics, show_progress: false }
    }

    /// PDF extractor, whatlang detector and the configured embedder.
    pub fn from_config(config: SorterConfig) -> Self {
        let extractor = Box::new(PdfTextExtractor::with_sample_pages(config.extraction.sample_pages));
        let detector = Box::new(WhatlangDetector::new(&config.language));
        let model_dir = config.model_dir();
        let embedder = pdfsort_embed::load_embedder(config.topics.embedder, model_dir.as_deref(), config.topics.hashing_dim);
        Self::new(config, extractor, detector, embedder)
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        let input = self.config.input_dir();
        let sinks = self.setup(&input)?;

        let discovered = DocumentScanner::from_config(&self.config).scan(&input)?;
        if discovered.is_empty() {
            tracing::info!(input = %input.display(), "no documents to sort");
            return Ok(RunReport::default());
        }
        tracing::info!(input = %input.display(), files = discovered.files.len(), "starting sort run");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.extraction.max_workers)
            .build()
            .map_err(|e| Error::Operation(format!("worker pool: {e}")))?;

        let mut records = pool.install(|| self.extract_all(&discovered.files, &sinks.logs));
        for (path, reason) in discovered.rejected {
            let mut doc = DocumentRecord::new(path);
            settle(&sinks.logs, &mut doc, Outcome::Error { reason });
            records.push(doc);
        }

        fingerprint_all(&mut records, &sinks.logs);
        let assignment = pool.install(|| self.classify_all(&mut records));
        self.place_all(&mut records, &sinks);

        let mut report = RunReport::from_records(&records);
        report.topics = assignment.topics;
        report.topic_fallback = assignment.fallback;
        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let summary = format!(
            "run complete: {} discovered, {} sorted, {} duplicates, {} unreadable, {} errors",
            report.discovered, report.sorted, report.duplicates, report.unreadable, report.errors
        );
        if let Err(e) = sinks.logs.record(LogKind::Process, &input, &summary) {
            tracing::error!("failed to write run summary to process log: {}", e);
        }
        let summary_path = sinks.placer.output_root().join(SUMMARY_FILE);
        if let Err(e) = report.write_json(&summary_path) {
            tracing::error!("failed to write {}: {}", summary_path.display(), e);
        }
        tracing::info!("{}", summary);
        Ok(report)
    }

    /// Fatal checks: readable input directory, writable output root, log dir and index.
    fn setup(&self, input: &Path) -> Result<Sinks> {
        if !input.exists() {
            return Err(Error::InputMissing(input.to_path_buf()));
        }
        if !input.is_dir() {
            return Err(Error::NotADirectory(input.to_path_buf()));
        }
        let output = self.config.output_dir();
        fs::create_dir_all(&output).map_err(|source| Error::OutputNotWritable { path: output.clone(), source })?;
        let logs = RunLogs::open(self.config.log_dir())?;
        let index = IndexWriter::open(self.config.index_path())?;
        let placer = Placer::new(output, &self.config.placement);
        Ok(Sinks { logs, index, placer })
    }

    /// Read, hash and extract every file in parallel. Output keeps discovery order.
    fn extract_all(&self, files: &[PathBuf], logs: &RunLogs) -> Vec<DocumentRecord> {
        let progress = if self.show_progress { ProgressBar::new(files.len() as u64) } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }

        let records = files
            .par_iter()
            .map(|path| {
                let mut doc = DocumentRecord::new(path.clone());
                if let Some(outcome) = self.extract_one(&mut doc) {
                    settle(logs, &mut doc, outcome);
                }
                progress.inc(1);
                doc
            })
            .collect();
        progress.finish_with_message("extraction done");
        records
    }

    /// Fill bytes, hash and text. Returns an outcome when the document stops here.
    fn extract_one(&self, doc: &mut DocumentRecord) -> Option<Outcome> {
        let bytes = match fs::read(&doc.source) {
            Ok(bytes) => bytes,
            Err(e) => return Some(Outcome::Unreadable { reason: format!("cannot open: {e}") }),
        };
        doc.byte_len = bytes.len() as u64;
        doc.hash = Some(sha256_hex(&bytes));

        match self.extractor.extract(&doc.source, &bytes) {
            Ok(text) if text.trim().is_empty() => Some(Outcome::Unreadable { reason: "no extractable text".to_string() }),
            Ok(text) => {
                doc.text = text;
                None
            }
            Err(Error::UnreadableDocument { reason, .. }) => Some(Outcome::Unreadable { reason }),
            Err(e) => Some(Outcome::Error { reason: e.to_string() }),
        }
    }

    /// Language per document in parallel, then the single corpus-wide topic fit.
    fn classify_all(&self, records: &mut [DocumentRecord]) -> TopicAssignment {
        records
            .par_iter_mut()
            .filter(|d| d.outcome().is_pending())
            .for_each(|d| d.language = self.detector.detect(&d.text));

        let survivors: Vec<usize> = (0..records.len()).filter(|&i| records[i].outcome().is_pending()).collect();
        let texts: Vec<&str> = survivors.iter().map(|&i| records[i].text.as_str()).collect();
        let assignment = self.topics.fit_assign(&texts);
        for (&i, label) in survivors.iter().zip(&assignment.labels) {
            records[i].topic = label.clone();
        }
        assignment
    }

    /// Serialized: one move at a time, so directory creation never races.
    fn place_all(&self, records: &mut [DocumentRecord], sinks: &Sinks) {
        for doc in records.iter_mut().filter(|d| d.outcome().is_pending()) {
            let outcome = match sinks.placer.place(&doc.source, &doc.language, &doc.topic) {
                Ok(destination) => {
                    let entry = IndexEntry {
                        path: destination.clone(),
                        language: doc.language.clone(),
                        topic: doc.topic.clone(),
                        file_name: doc.file_name(),
                    };
                    match sinks.index.append(&entry) {
                        Ok(()) => Outcome::Sorted { destination },
                        Err(e) => Outcome::Error {
                            reason: format!("moved to {} but index write failed: {e}", destination.display()),
                        },
                    }
                }
                Err(e) => Outcome::Error { reason: format!("placement failed: {e}") },
            };
            settle(&sinks.logs, doc, outcome);
        }
    }
}

/// Duplicate check in discovery order; the first holder of a hash stays canonical.
fn fingerprint_all(records: &mut [DocumentRecord], logs: &RunLogs) {
    let mut table = FingerprintTable::new();
    for doc in records.iter_mut().filter(|d| d.outcome().is_pending()) {
        let Some(hash) = doc.hash.clone() else { continue };
        if let Fingerprint::Duplicate { original } = table.register(&hash, &doc.source) {
            settle(logs, doc, Outcome::Duplicate { original });
        }
    }
    tracing::debug!(unique = table.len(), "fingerprinting complete");
}

/// Settle and log one document. A log line that cannot be written is reported
/// on the console and never aborts the batch.
fn settle(logs: &RunLogs, doc: &mut DocumentRecord, outcome: Outcome) {
    if let Err(e) = doc.settle(outcome) {
        tracing::error!("{}", e);
        return;
    }
    if let Err(e) = logs.record_outcome(doc) {
        tracing::error!("failed to log outcome for {}: {}", doc.source.display(), e);
    }
}
