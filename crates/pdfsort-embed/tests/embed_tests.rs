use pdfsort_core::config::EmbedderKind;
use pdfsort_embed::{load_embedder, HashingEmbedder};
use pdfsort_core::traits::Embedder;

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn hashing_embedder_shapes_and_determinism() {
    let embedder = HashingEmbedder::new(256);
    let texts = vec!["hello world of documents".to_string(), "hello world of documents".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn hashing_embedder_separates_vocabularies() {
    let embedder = HashingEmbedder::new(512);
    let garden = embedder.embed_text("tomato garden soil compost seedlings watering tomato garden soil");
    let garden2 = embedder.embed_text("compost soil garden tomato seedlings mulch garden");
    let engine = embedder.embed_text("piston engine crankshaft cylinder gasket torque engine piston");
    assert!(cosine(&garden, &garden2) > cosine(&garden, &engine));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let v = HashingEmbedder::new(64).embed_text("  12 34 !! ");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn missing_model_falls_back_to_hashing() {
    let dir = std::env::temp_dir().join("pdfsort-no-such-model-dir");
    let embedder = load_embedder(EmbedderKind::BgeM3, Some(&dir), 128);
    // Only the hashing embedder reports the configured dimension.
    if std::env::var("APP_MODEL_DIR").is_err() && std::env::var("MODEL_DIR").is_err() && !std::path::Path::new("models/bge-m3").is_dir() {
        assert_eq!(embedder.dim(), 128);
    }
}
