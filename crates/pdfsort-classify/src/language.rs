use pdfsort_core::config::{LanguageConfig, LanguageNaming};
use pdfsort_core::traits::LanguageDetector;
use pdfsort_core::types::UNKNOWN_LANGUAGE;
use whatlang::{Detector, Info, Lang};

/// Trigram-based detection via `whatlang`.
///
/// Text below `min_chars` yields `"unknown"` rather than a guess. When open
/// detection is not reliable the sample is detected again among the preferred
/// languages only.
#[derive(Debug, Clone)]
pub struct WhatlangDetector {
    min_chars: usize,
    min_confidence: f64,
    max_sample_chars: usize,
    naming: LanguageNaming,
    open: Detector,
    preferred: Option<Detector>,
}

impl WhatlangDetector {
    pub fn new(config: &LanguageConfig) -> Self {
        let mut langs = Vec::new();
        for code in &config.preferred {
            match Lang::from_code(code.trim().to_ascii_lowercase()) {
                Some(lang) if !langs.contains(&lang) => langs.push(lang),
                Some(_) => {}
                None => tracing::warn!("ignoring unknown preferred language code '{}'", code),
            }
        }
        Self {
            min_chars: config.min_chars,
            min_confidence: config.min_confidence,
            max_sample_chars: config.max_sample_chars.max(1),
            naming: config.naming,
            open: Detector::new(),
            preferred: (!langs.is_empty()).then(|| Detector::with_allowlist(langs)),
        }
    }

    fn label(&self, info: &Info) -> String {
        match self.naming {
            LanguageNaming::Name => info.lang().eng_name().to_string(),
            LanguageNaming::Code => info.lang().code().to_string(),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new(&LanguageConfig::default())
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> String {
        let sample = match text.char_indices().nth(self.max_sample_chars) {
            Some((cut, _)) => &text[..cut],
            None => text,
        };
        let significant = sample.chars().filter(|c| !c.is_whitespace()).count();
        if significant < self.min_chars {
            return UNKNOWN_LANGUAGE.to_string();
        }

        let mut info = self.open.detect(sample);
        if let (Some(open), Some(preferred)) = (&info, &self.preferred) {
            if !open.is_reliable() {
                tracing::debug!(lang = open.lang().code(), confidence = open.confidence(), "retrying among preferred languages");
                info = preferred.detect(sample).or(info);
            }
        }
        match info {
            Some(info) if info.confidence() >= self.min_confidence => self.label(&info),
            Some(info) => {
                tracing::debug!(lang = info.lang().code(), confidence = info.confidence(), "language below confidence floor");
                UNKNOWN_LANGUAGE.to_string()
            }
            None => UNKNOWN_LANGUAGE.to_string(),
        }
    }
}
