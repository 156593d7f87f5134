//! End-to-end smoke tests over a synthetic two-class image tree.

use classifier::model::MlpClassifierConfig;
use classifier::predict::PredictionEngine;
use classifier::train::{
    load_mlp_from_checkpoint, run_train, vocab_path, Backbone, BackendKind, LabelMode, TrainArgs,
};
use classifier::TrainBackend;
use dataset::{enumerate_images, LabelSource, LabelVocab};
use std::fs;
use std::path::Path;

const IMAGE_SIZE: u32 = 16;

fn synthetic_assets(root: &Path) -> anyhow::Result<()> {
    for (label, color) in [("cat", [255u8, 0, 0]), ("dog", [0u8, 0, 255])] {
        let dir = root.join(label);
        fs::create_dir_all(&dir)?;
        for i in 0..10 {
            let img = image::RgbImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |_x, _y| image::Rgb(color));
            img.save(dir.join(format!("{label}_{i}.png")))?;
        }
    }
    Ok(())
}

fn train_args(assets: &Path, checkpoint: &Path) -> TrainArgs {
    TrainArgs {
        dataset_root: assets.to_string_lossy().into_owned(),
        label_mode: LabelMode::FolderName,
        backbone: Backbone::Mlp,
        backend: BackendKind::NdArray,
        image_size: IMAGE_SIZE,
        test_fraction: 0.3,
        epochs: 1,
        batch_size: 4,
        lr: 1e-3,
        seed: Some(7),
        checkpoint_out: checkpoint.to_string_lossy().into_owned(),
    }
}

#[test]
fn train_writes_checkpoint_and_vocab() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let assets = tmp.path().join("assets");
    synthetic_assets(&assets)?;
    let checkpoint = tmp.path().join("checkpoints/classifier.bin");

    run_train(train_args(&assets, &checkpoint))?;

    assert!(checkpoint.exists());
    let vocab = LabelVocab::load(&vocab_path(checkpoint.to_str().unwrap()))?;
    assert_eq!(vocab.len(), 2);
    assert!(vocab.key("cat").is_some());
    assert!(vocab.key("dog").is_some());
    Ok(())
}

#[test]
fn checkpoint_round_trips_into_a_usable_engine() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let assets = tmp.path().join("assets");
    synthetic_assets(&assets)?;
    let checkpoint = tmp.path().join("checkpoints/classifier.bin");
    run_train(train_args(&assets, &checkpoint))?;

    let vocab = LabelVocab::load(&vocab_path(checkpoint.to_str().unwrap()))?;
    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    let cfg = MlpClassifierConfig::new(IMAGE_SIZE as usize, vocab.len());
    let model = load_mlp_from_checkpoint(&checkpoint, cfg, &device)?;

    let records = enumerate_images(&assets, LabelSource::FolderName)?;
    let engine = PredictionEngine::new(model, vocab, IMAGE_SIZE, device);

    // Records are sorted, so the first one is cat/cat_0.png.
    let single = engine.classify_first(&records)?;
    assert_eq!(single.actual, "cat");
    let line = single.to_string();
    assert!(
        line.starts_with("Image: cat_0.png | Actual Value: cat | Predicted Value: "),
        "unexpected report line: {line}"
    );

    let batch = engine.classify_batch(&records, 10)?;
    assert_eq!(batch.len(), 10);
    for prediction in &batch {
        assert!(["cat", "dog"].contains(&prediction.predicted.as_str()));
    }
    Ok(())
}

#[test]
fn training_metrics_are_reported_per_epoch() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let assets = tmp.path().join("assets");
    synthetic_assets(&assets)?;

    let mut records = enumerate_images(&assets, LabelSource::FolderName)?;
    dataset::shuffle_records(&mut records, Some(3));
    let vocab = LabelVocab::from_records(&records);
    let splits = dataset::partition(records, 0.3);

    let args = train_args(&assets, &tmp.path().join("unused.bin"));
    let mut metrics = Vec::new();
    classifier::train::train_mlp(&args, &splits, &vocab, &mut |m| metrics.push(m.clone()))?;

    assert_eq!(metrics.len(), 1);
    assert!(metrics[0].train_loss.is_finite());
    assert!(metrics[0].validation_accuracy.is_some());
    Ok(())
}
