use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use pdfsort_classify::WhatlangDetector;
use pdfsort_core::config::TopicConfig;
use pdfsort_core::traits::TextExtractor;
use pdfsort_core::{Error, OutcomeKind, SorterConfig};
use pdfsort_embed::HashingEmbedder;
use pdfsort_pipeline::{Pipeline, RunReport, SUMMARY_FILE};
use pdfsort_place::read_index;

/// Treats file bytes as UTF-8 text; `CORRUPT` marks a file that cannot be parsed.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path, bytes: &[u8]) -> pdfsort_core::Result<String> {
        if bytes.is_empty() || bytes.starts_with(b"CORRUPT") {
            return Err(Error::unreadable(path, "malformed document"));
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

const ENGLISH: &str = "The annual report describes how the library extended its opening hours, \
    hired two new archivists and digitised the local newspaper collection for public research.";

fn garden(i: usize) -> String {
    format!(
        "Garden notes {i}: tomato seedlings need compost, the garden soil needs mulch, \
         water the tomato beds and turn the compost heap in the garden every week."
    )
}

fn engine(i: usize) -> String {
    format!(
        "Engine manual {i}: check the piston rings, torque the cylinder head bolts, \
         inspect the crankshaft bearings and replace the engine gasket when the piston wears."
    )
}

struct Fixture {
    _tmp: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        Self { _tmp: tmp, input, output }
    }

    fn write(&self, rel: &str, body: impl AsRef<[u8]>) -> PathBuf {
        let path = self.input.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    fn config(&self) -> SorterConfig {
        let mut config = SorterConfig::default();
        config.paths.input_dir = self.input.to_string_lossy().into_owned();
        config.paths.output_dir = self.output.to_string_lossy().into_owned();
        config.topics = TopicConfig { min_chars: 40, ..TopicConfig::default() };
        config.extraction.max_workers = 2;
        config
    }

    fn pipeline(&self, config: SorterConfig) -> Pipeline {
        let detector = WhatlangDetector::new(&config.language);
        Pipeline::new(config, Box::new(PlainTextExtractor), Box::new(detector), Box::new(HashingEmbedder::new(512)))
    }

    fn run(&self) -> RunReport {
        self.pipeline(self.config()).run().expect("run")
    }

    fn log(&self, name: &str) -> String {
        fs::read_to_string(self.output.join("logs").join(name)).unwrap_or_default()
    }

    /// Relative paths and contents of every file under the output root.
    fn snapshot(&self) -> BTreeSet<(PathBuf, Vec<u8>)> {
        WalkDir::new(&self.output)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().strip_prefix(&self.output).unwrap().to_path_buf(), fs::read(e.path()).unwrap()))
            .collect()
    }
}

#[test]
fn duplicate_is_logged_and_left_in_place() {
    let fx = Fixture::new();
    fx.write("a.pdf", ENGLISH);
    let b = fx.write("b.pdf", ENGLISH);

    let report = fx.run();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.sorted, 1);
    assert_eq!(report.duplicates, 1);
    let dest = fx.output.join("English/general/a.pdf");
    assert!(dest.is_file());
    assert!(b.is_file(), "duplicate stays in the input directory");

    let entries = read_index(&fx.output.join("index.txt")).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, dest);
    assert_eq!(entries[0].language, "English");
    assert_eq!(entries[0].topic, "general");
    assert_eq!(entries[0].file_name, "a.pdf");

    let dups = fx.log("duplicates.log");
    assert_eq!(dups.lines().count(), 1);
    assert!(dups.contains(&format!("duplicate of {}", fx.input.join("a.pdf").display())), "{dups}");
}

#[test]
fn unreadable_documents_never_move() {
    let fx = Fixture::new();
    let empty = fx.write("empty.pdf", "");
    let corrupt = fx.write("corrupt.pdf", "CORRUPT xref table");
    let blank = fx.write("scan.pdf", "   \n  ");
    fx.write("good.pdf", ENGLISH);

    let report = fx.run();

    assert_eq!(report.unreadable, 3);
    assert_eq!(report.sorted, 1);
    for path in [&empty, &corrupt, &blank] {
        assert!(path.exists(), "{} must stay put", path.display());
    }
    assert_eq!(fx.log("unreadable.log").lines().count(), 3);
    assert_eq!(read_index(&fx.output.join("index.txt")).unwrap().len(), 1);
}

#[test]
fn other_extensions_are_ignored() {
    let fx = Fixture::new();
    let notes = fx.write("notes.txt", ENGLISH);
    fx.write("upper.PDF", ENGLISH);

    let report = fx.run();

    assert_eq!(report.discovered, 1);
    assert!(notes.exists());
    assert!(fx.output.join("English/general/upper.PDF").is_file());
}

#[test]
fn empty_input_is_idempotent() {
    let fx = Fixture::new();

    let first = fx.run();
    let after_first = fx.snapshot();
    let second = fx.run();

    assert_eq!(first.discovered, 0);
    assert_eq!(second.discovered, 0);
    assert_eq!(after_first, fx.snapshot());
    assert!(!fx.output.join(SUMMARY_FILE).exists());
}

#[test]
fn same_names_from_subfolders_do_not_collide() {
    let fx = Fixture::new();
    fx.write("sub1/report.pdf", format!("{ENGLISH} First copy."));
    fx.write("sub2/report.pdf", format!("{ENGLISH} Second copy."));

    let mut config = fx.config();
    config.discovery.recursive = true;
    let report = fx.pipeline(config).run().unwrap();

    assert_eq!(report.sorted, 2);
    let dir = fx.output.join("English/general");
    assert!(dir.join("report.pdf").is_file());
    assert!(dir.join("report_1.pdf").is_file());
}

#[test]
fn index_points_at_existing_files() {
    let fx = Fixture::new();
    for i in 0..3 {
        fx.write(&format!("doc{i}.pdf"), format!("{ENGLISH} Edition {i}."));
    }

    let report = fx.run();

    let entries = read_index(&fx.output.join("index.txt")).unwrap();
    assert_eq!(entries.len(), report.sorted);
    for entry in &entries {
        assert!(entry.path.is_file(), "{}", entry.path.display());
        assert_eq!(entry.path.file_name().unwrap().to_string_lossy(), entry.file_name);
    }
}

#[test]
fn separate_vocabularies_land_in_separate_topics() {
    let fx = Fixture::new();
    for i in 0..4 {
        fx.write(&format!("garden{i}.pdf"), garden(i));
        fx.write(&format!("engine{i}.pdf"), engine(i));
    }

    let report = fx.run();

    assert_eq!(report.sorted, 8);
    assert!(report.topic_fallback.is_none(), "{:?}", report.topic_fallback);
    assert_eq!(report.topics.len(), 2);

    let entries = read_index(&fx.output.join("index.txt")).unwrap();
    let topic_of = |name: &str| entries.iter().find(|e| e.file_name == name).map(|e| e.topic.clone()).unwrap();
    assert_eq!(topic_of("garden0.pdf"), topic_of("garden3.pdf"));
    assert_eq!(topic_of("engine0.pdf"), topic_of("engine3.pdf"));
    assert_ne!(topic_of("garden0.pdf"), topic_of("engine0.pdf"));
}

#[test]
fn short_text_gets_placeholder_folders() {
    let fx = Fixture::new();
    fx.write("short.pdf", "x1 y2");

    let report = fx.run();

    assert_eq!(report.sorted, 1);
    assert!(fx.output.join("unknown/unclassified/short.pdf").is_file());
}

#[test]
fn keep_originals_leaves_input_untouched() {
    let fx = Fixture::new();
    let src = fx.write("a.pdf", ENGLISH);

    let mut config = fx.config();
    config.placement.keep_originals = true;
    fx.pipeline(config).run().unwrap();

    assert!(src.is_file());
    assert!(fx.output.join("English/general/a.pdf").is_file());
}

#[test]
fn missing_input_is_fatal_before_output_exists() {
    let fx = Fixture::new();
    let mut config = fx.config();
    config.paths.input_dir = fx.input.join("nope").to_string_lossy().into_owned();

    let err = fx.pipeline(config).run().unwrap_err();

    assert!(matches!(err, Error::InputMissing(_)), "{err:?}");
    assert!(err.is_fatal());
    assert!(!fx.output.exists());
}

#[test]
fn summary_json_matches_report() {
    let fx = Fixture::new();
    fx.write("a.pdf", ENGLISH);
    fx.write("b.pdf", ENGLISH);
    fx.write("c.pdf", "");

    let report = fx.run();
    let json = fs::read_to_string(fx.output.join(SUMMARY_FILE)).unwrap();
    let parsed: RunReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.discovered, 3);
    assert_eq!(parsed.sorted, report.sorted);
    assert_eq!(parsed.documents_with(OutcomeKind::Duplicate).count(), 1);
    assert_eq!(parsed.documents_with(OutcomeKind::Unreadable).count(), 1);
    assert!(fx.log("process.log").lines().any(|l| l.contains("run complete: 3 discovered")));
}

#[test]
fn output_inside_input_is_not_rescanned() {
    let fx = Fixture::new();
    fx.write("a.pdf", format!("{ENGLISH} One."));
    fx.write("b.pdf", format!("{ENGLISH} Two."));

    let mut config = fx.config();
    let nested = fx.input.join("sorted");
    config.paths.output_dir = nested.to_string_lossy().into_owned();
    config.discovery.recursive = true;
    let pipeline = fx.pipeline(config);

    assert_eq!(pipeline.run().unwrap().sorted, 2);
    let second = pipeline.run().unwrap();
    assert_eq!(second.discovered, 0);
    assert_eq!(read_index(&nested.join("index.txt")).unwrap().len(), 2);
}

#[test]
fn real_pdf_is_sorted_end_to_end() {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! { "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Courier" });
    let resources_id = doc.add_object(dictionary! { "Font" => dictionary! { "F1" => font_id } });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![40.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(ENGLISH)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => vec![page_id.into()], "Count" => 1 }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let fx = Fixture::new();
    fx.write("library.pdf", &bytes);
    let report = Pipeline::from_config(fx.config()).run().unwrap();

    assert_eq!(report.sorted, 1, "{:?}", report.documents);
    assert!(fx.output.join("English/general/library.pdf").is_file());
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_not_followed() {
    let fx = Fixture::new();
    let real = fx.write("real.pdf", ENGLISH);
    std::os::unix::fs::symlink(&real, fx.input.join("link.pdf")).unwrap();

    let report = fx.run();

    assert_eq!(report.sorted, 1);
    assert_eq!(report.errors, 1);
    let errors = fx.log("errors.log");
    assert_eq!(errors.lines().count(), 1);
    assert!(errors.contains("link.pdf") && errors.contains("not a regular file"), "{errors}");
}

#[test]
fn hello_world_duplicate_is_sorted_as_english() {
    let fx = Fixture::new();
    fx.write("a.pdf", "Hello world");
    let b = fx.write("b.pdf", "Hello world");

    let report = fx.run();

    assert_eq!(report.sorted, 1);
    assert_eq!(report.duplicates, 1);
    let dest = fx.output.join("English/unclassified/a.pdf");
    assert!(dest.is_file(), "{:?}", report.documents);
    assert!(b.is_file());
    assert_eq!(fx.log("duplicates.log").lines().count(), 1);

    let entries = read_index(&fx.output.join("index.txt")).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, dest);
    assert_eq!(entries[0].language, "English");
}

#[cfg(target_os = "linux")]
#[test]
fn run_completes_when_a_log_cannot_be_written() {
    let full = Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let fx = Fixture::new();
    let logs = fx.output.join("logs");
    fs::create_dir_all(&logs).unwrap();
    std::os::unix::fs::symlink(full, logs.join("unreadable.log")).unwrap();
    fx.write("broken.pdf", "CORRUPT");
    fx.write("good.pdf", ENGLISH);

    let report = fx.run();

    assert_eq!(report.unreadable, 1);
    assert_eq!(report.sorted, 1);
    assert!(fx.output.join("English/general/good.pdf").is_file());
    assert!(fx.output.join(SUMMARY_FILE).is_file());
    assert!(fx.log("process.log").contains("run complete"));
}
