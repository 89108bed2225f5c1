//! Term analysis shared by the hashing embedder and topic keywords.

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream,
};

/// Words the per-language lists miss, plus layout words common to PDF text.
const EXTRA_STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "any", "been", "before", "being", "between", "both", "can", "could", "did", "does",
    "during", "each", "from", "had", "has", "have", "having", "her", "his", "how", "its", "may", "might", "more", "most",
    "must", "only", "other", "our", "out", "over", "own", "same", "shall", "she", "should", "some", "than", "them",
    "through", "under", "upon", "very", "were", "what", "when", "where", "which", "who", "whom", "whose", "why",
    "would", "you", "your", "page", "pages", "figure", "table",
];

const MAX_TOKEN_BYTES: usize = 40;
const MIN_TERM_CHARS: usize = 3;

/// Tantivy analyzer chain: simple tokenizer, long-token removal, lowercasing,
/// then stop words for the languages the sorter sees most.
#[derive(Clone)]
pub struct TermAnalyzer {
    analyzer: TextAnalyzer,
}

impl Default for TermAnalyzer {
    fn default() -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
            .filter(LowerCaser)
            .filter(stop_words(Language::English))
            .filter(stop_words(Language::German))
            .filter(stop_words(Language::French))
            .filter(stop_words(Language::Spanish))
            .filter(stop_words(Language::Italian))
            .filter(stop_words(Language::Portuguese))
            .filter(stop_words(Language::Dutch))
            .filter(StopWordFilter::remove(EXTRA_STOP_WORDS.iter().map(|w| (*w).to_string())))
            .build();
        Self { analyzer }
    }
}

impl TermAnalyzer {
    /// Lowercase alphabetic terms of three or more letters, stop words removed.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            let token = &stream.token().text;
            if token.chars().count() >= MIN_TERM_CHARS && token.chars().all(char::is_alphabetic) {
                out.push(token.clone());
            }
        }
        out
    }
}

fn stop_words(language: Language) -> StopWordFilter {
    StopWordFilter::new(language).unwrap_or_else(|| {
        tracing::warn!("no stop word list for {:?}", language);
        StopWordFilter::remove(Vec::<String>::new())
    })
}
