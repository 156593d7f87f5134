//! Collation failure modes: empty batches and unreadable images.

use classifier::collate;
use classifier::TrainBackend;
use dataset::{ImageRecord, LabelVocab};
use std::path::PathBuf;

#[test]
fn collate_rejects_empty_batch() {
    let vocab = LabelVocab::default();
    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    assert!(collate::<TrainBackend>(&[], &vocab, 8, &device).is_err());
}

#[test]
fn unreadable_image_fails_the_whole_batch() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let good = tmp.path().join("cat/a.png");
    std::fs::create_dir_all(good.parent().unwrap())?;
    image::RgbImage::from_fn(8, 8, |_x, _y| image::Rgb([0, 128, 0])).save(&good)?;

    let mut vocab = LabelVocab::default();
    vocab.insert("cat");
    let records = vec![
        ImageRecord {
            path: good,
            label: "cat".to_string(),
        },
        ImageRecord {
            path: PathBuf::from("missing/b.png"),
            label: "cat".to_string(),
        },
    ];

    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    assert!(collate::<TrainBackend>(&records, &vocab, 8, &device).is_err());
    Ok(())
}

#[test]
fn collate_shapes_match_batch_and_image_size() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut vocab = LabelVocab::default();
    vocab.insert("cat");

    let mut records = Vec::new();
    for i in 0..3 {
        let path = tmp.path().join(format!("cat_{i}.png"));
        image::RgbImage::from_fn(12, 9, |_x, _y| image::Rgb([200, 10, 10])).save(&path)?;
        records.push(ImageRecord {
            path,
            label: "cat".to_string(),
        });
    }

    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    let batch = collate::<TrainBackend>(&records, &vocab, 8, &device)?;
    assert_eq!(batch.images.dims(), [3, 3, 8, 8]);
    assert_eq!(batch.targets.dims(), [3]);
    Ok(())
}
