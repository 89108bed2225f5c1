//! Class-based TF-IDF keyword extraction for cluster labels.

use std::collections::{BTreeMap, HashSet};

use pdfsort_embed::TermAnalyzer;

/// Top `n` keywords per class, weighted `tf(t,c) * ln(1 + A / tf(t))`
/// where `A` is the average number of terms per class.
///
/// `classes[c]` holds the texts of class `c`. Ties break alphabetically.
pub fn class_keywords(classes: &[Vec<&str>], n: usize) -> Vec<Vec<String>> {
    let analyzer = TermAnalyzer::default();
    let per_class: Vec<BTreeMap<String, f64>> = classes
        .iter()
        .map(|texts| {
            let mut tf = BTreeMap::new();
            for text in texts {
                for term in analyzer.terms(text) {
                    *tf.entry(term).or_insert(0.0) += 1.0;
                }
            }
            tf
        })
        .collect();

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for tf in &per_class {
        for (term, count) in tf {
            *totals.entry(term.as_str()).or_insert(0.0) += count;
        }
    }
    let non_empty = per_class.iter().filter(|tf| !tf.is_empty()).count().max(1);
    let avg_terms = per_class.iter().map(|tf| tf.values().sum::<f64>()).sum::<f64>() / non_empty as f64;

    per_class
        .iter()
        .map(|tf| {
            let mut scored: Vec<(&str, f64)> = tf
                .iter()
                .map(|(term, count)| {
                    let total = totals.get(term.as_str()).copied().unwrap_or(*count);
                    (term.as_str(), count * (1.0 + avg_terms / total).ln())
                })
                .collect();
            scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            scored.into_iter().take(n).map(|(t, _)| t.to_string()).collect()
        })
        .collect()
}

/// Join keywords into a label and make it unique among `taken`.
pub fn unique_label(keywords: &[String], id: usize, taken: &mut HashSet<String>) -> String {
    let base = if keywords.is_empty() { format!("topic_{id}") } else { keywords.join("_") };
    let label = if taken.contains(&base) { format!("{base}_{id}") } else { base };
    taken.insert(label.clone());
    label
}
