use std::fs;
use std::path::{Path, PathBuf};

use pdfsort_classify::TopicSummary;
use pdfsort_core::error::Result;
use pdfsort_core::types::{DocumentRecord, Outcome, OutcomeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source: PathBuf,
    pub language: String,
    pub topic: String,
    pub hash: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            source: doc.source.clone(),
            language: doc.language.clone(),
            topic: doc.topic.clone(),
            hash: doc.hash.clone(),
            outcome: doc.outcome().clone(),
        }
    }
}

/// What a run did, per outcome and per topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub discovered: usize,
    pub sorted: usize,
    pub duplicates: usize,
    pub unreadable: usize,
    pub errors: usize,
    pub topics: Vec<TopicSummary>,
    pub topic_fallback: Option<String>,
    pub elapsed_ms: u64,
    pub documents: Vec<DocumentSummary>,
}

impl RunReport {
    pub fn from_records(records: &[DocumentRecord]) -> Self {
        let mut report = Self { discovered: records.len(), ..Self::default() };
        for doc in records {
            match doc.outcome().kind() {
                Some(OutcomeKind::Sorted) => report.sorted += 1,
                Some(OutcomeKind::Duplicate) => report.duplicates += 1,
                Some(OutcomeKind::Unreadable) => report.unreadable += 1,
                Some(OutcomeKind::Error) | None => report.errors += 1,
            }
        }
        report.documents = records.iter().map(DocumentSummary::from).collect();
        report
    }

    pub fn documents_with(&self, kind: OutcomeKind) -> impl Iterator<Item = &DocumentSummary> {
        self.documents.iter().filter(move |d| d.outcome.kind() == Some(kind))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| pdfsort_core::Error::Operation(format!("serialize run report: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }
}
