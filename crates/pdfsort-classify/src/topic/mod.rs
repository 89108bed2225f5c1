//! Corpus-level topic model.
//!
//! Fitting needs every extracted text up front: documents are embedded,
//! clustered with spherical k-means, and each cluster is named after its
//! highest-weighted c-TF-IDF keywords. Degenerate corpora never fail; they fall
//! back to a single default topic.

use std::collections::HashSet;

use pdfsort_core::config::TopicConfig;
use pdfsort_core::traits::Embedder;
use serde::{Deserialize, Serialize};

pub mod keywords;
pub mod kmeans;

const MAX_EMBED_CHARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: usize,
    pub label: String,
    pub keywords: Vec<String>,
    pub size: usize,
}

/// Per-document labels, aligned with the input texts.
#[derive(Debug, Clone)]
pub struct TopicAssignment {
    pub labels: Vec<String>,
    pub topics: Vec<TopicSummary>,
    /// Why the single-topic fallback was used, if it was.
    pub fallback: Option<String>,
}

pub struct TopicModel {
    config: TopicConfig,
    embedder: Box<dyn Embedder>,
}

impl TopicModel {
    pub fn new(config: TopicConfig, embedder: Box<dyn Embedder>) -> Self {
        Self { config, embedder }
    }

    /// `k = clamp(round(sqrt(n / 2)), 2, max_topics)`, never above `n`.
    pub fn cluster_count(&self, n: usize) -> usize {
        let k = ((n as f64 / 2.0).sqrt().round() as usize).clamp(2, self.config.max_topics.max(2));
        k.min(n)
    }

    /// Fit over the whole batch and label every text.
    ///
    /// Texts below `min_chars` get the unclassified label and are left out of fitting.
    pub fn fit_assign(&self, texts: &[&str]) -> TopicAssignment {
        let mut labels = vec![self.config.unclassified_label.clone(); texts.len()];
        let eligible: Vec<usize> = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| t.trim().chars().count() >= self.config.min_chars)
            .map(|(i, _)| i)
            .collect();

        if eligible.is_empty() {
            return TopicAssignment { labels, topics: Vec::new(), fallback: None };
        }
        if eligible.len() < self.config.min_corpus {
            let reason = format!("corpus of {} documents is below the minimum of {}", eligible.len(), self.config.min_corpus);
            return self.fallback(labels, &eligible, reason);
        }

        let inputs: Vec<String> = eligible.iter().map(|&i| truncate_chars(texts[i], MAX_EMBED_CHARS).to_string()).collect();
        let mut vectors = match self.embedder.embed_batch(&inputs) {
            Ok(v) if v.len() == inputs.len() => v,
            Ok(v) => {
                let reason = format!("embedder returned {} vectors for {} texts", v.len(), inputs.len());
                return self.fallback(labels, &eligible, reason);
            }
            Err(e) => return self.fallback(labels, &eligible, format!("embedding failed: {e}")),
        };
        let dim = self.embedder.dim();
        if vectors.iter().any(|v| v.len() != dim) {
            return self.fallback(labels, &eligible, format!("embedding dimension differs from {dim}"));
        }

        let k = self.cluster_count(eligible.len());
        let clustering = kmeans::fit(&mut vectors, k, self.config.max_iterations.max(1));
        tracing::debug!(k, iterations = clustering.iterations, "k-means converged");
        if clustering.non_empty_clusters() < 2 {
            return self.fallback(labels, &eligible, "corpus too homogeneous for more than one topic".to_string());
        }

        // Compact cluster ids so topic ids have no gaps
        let sizes = clustering.cluster_sizes();
        let mut remap = vec![usize::MAX; sizes.len()];
        let mut next = 0;
        for (cluster, &size) in sizes.iter().enumerate() {
            if size > 0 {
                remap[cluster] = next;
                next += 1;
            }
        }

        let mut members: Vec<Vec<&str>> = vec![Vec::new(); next];
        for (pos, &cluster) in clustering.assignments.iter().enumerate() {
            members[remap[cluster]].push(texts[eligible[pos]]);
        }
        let keywords = keywords::class_keywords(&members, self.config.label_keywords);

        let mut taken = HashSet::new();
        let topics: Vec<TopicSummary> = keywords
            .into_iter()
            .enumerate()
            .map(|(id, kw)| TopicSummary {
                id,
                label: keywords::unique_label(&kw, id, &mut taken),
                keywords: kw,
                size: members[id].len(),
            })
            .collect();

        for (pos, &cluster) in clustering.assignments.iter().enumerate() {
            labels[eligible[pos]] = topics[remap[cluster]].label.clone();
        }
        tracing::info!(documents = eligible.len(), topics = topics.len(), "topic model fitted");
        TopicAssignment { labels, topics, fallback: None }
    }

    fn fallback(&self, mut labels: Vec<String>, eligible: &[usize], reason: String) -> TopicAssignment {
        tracing::warn!("topic model fallback to '{}': {}", self.config.default_label, reason);
        for &i in eligible {
            labels[i] = self.config.default_label.clone();
        }
        let topics = vec![TopicSummary {
            id: 0,
            label: self.config.default_label.clone(),
            keywords: Vec::new(),
            size: eligible.len(),
        }];
        TopicAssignment { labels, topics, fallback: Some(reason) }
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}
