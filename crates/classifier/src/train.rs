//! CLI arguments and the training loop.

use burn::backend::Autodiff;
use burn::module::Module;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::record::{BinFileRecorder, FullPrecisionSettings, RecorderError};
use clap::{Parser, ValueEnum};
use dataset::{
    enumerate_images, partition, shuffle_records, DatasetSplits, ImageRecord, LabelSource,
    LabelVocab, DEFAULT_TEST_FRACTION,
};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::collate;
use crate::model::{
    Classifier, CnnClassifier, CnnClassifierConfig, MlpClassifier, MlpClassifierConfig,
};
use crate::predict::{PredictionEngine, DEFAULT_BATCH_LIMIT};
use crate::TrainBackend;

type ADBackend = Autodiff<TrainBackend>;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Backbone {
    Mlp,
    Cnn,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BackendKind {
    NdArray,
    Wgpu,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LabelMode {
    /// Label from the immediate parent directory name.
    FolderName,
    /// Label from the leading alphabetic prefix of the file name.
    FileNamePrefix,
}

impl From<LabelMode> for LabelSource {
    fn from(mode: LabelMode) -> Self {
        match mode {
            LabelMode::FolderName => LabelSource::FolderName,
            LabelMode::FileNamePrefix => LabelSource::FileNamePrefix,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Train an image classifier on a folder of labeled .jpg/.png images"
)]
pub struct TrainArgs {
    /// Root folder of labeled images.
    #[arg(long, default_value = "assets")]
    pub dataset_root: String,
    /// Where labels come from: parent folder name or file-name prefix.
    #[arg(long, value_enum, default_value_t = LabelMode::FolderName)]
    pub label_mode: LabelMode,
    /// Backbone to train.
    #[arg(long, value_enum, default_value_t = Backbone::Cnn)]
    pub backbone: Backbone,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
    /// Square size images are resized to before batching.
    #[arg(long, default_value_t = 64)]
    pub image_size: u32,
    /// Fraction held out of training by the first split; the held-out pool is
    /// split again into validation and test sets.
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,
    /// Number of epochs.
    #[arg(long, default_value_t = 4)]
    pub epochs: usize,
    /// Batch size.
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,
    /// Learning rate.
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,
    /// Shuffle seed (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,
    /// Checkpoint output path (vocabulary JSON is written alongside).
    #[arg(long, default_value = "checkpoints/classifier.bin")]
    pub checkpoint_out: String,
}

/// Per-epoch training metrics, handed to the caller's callback.
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f32,
    pub validation_accuracy: Option<f32>,
}

impl fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.validation_accuracy {
            Some(acc) => write!(
                f,
                "epoch {}: avg loss {:.4}, validation accuracy {:.3}",
                self.epoch, self.train_loss, acc
            ),
            None => write!(f, "epoch {}: avg loss {:.4}", self.epoch, self.train_loss),
        }
    }
}

/// Path of the vocabulary JSON written next to a checkpoint.
pub fn vocab_path(checkpoint: &str) -> PathBuf {
    Path::new(checkpoint).with_extension("vocab.json")
}

pub fn validate_backend_choice(kind: BackendKind) -> anyhow::Result<()> {
    let built_wgpu = cfg!(feature = "backend-wgpu");
    match (kind, built_wgpu) {
        (BackendKind::Wgpu, false) => {
            anyhow::bail!("backend-wgpu feature not enabled; rebuild with --features backend-wgpu or choose ndarray backend")
        }
        (BackendKind::NdArray, true) => {
            println!("note: built with backend-wgpu; training will still use the WGPU backend despite --backend ndarray");
        }
        _ => {}
    }
    Ok(())
}

/// The full linear flow: enumerate, shuffle, split, train, checkpoint, and
/// report predictions on the held-out test partition.
pub fn run_train(args: TrainArgs) -> anyhow::Result<()> {
    validate_backend_choice(args.backend)?;

    let root = Path::new(&args.dataset_root);
    let mut records = enumerate_images(root, args.label_mode.into())?;
    if records.is_empty() {
        anyhow::bail!("no .jpg/.png images found under {}", root.display());
    }
    shuffle_records(&mut records, args.seed);

    // The vocabulary is built from everything observed, before splitting, so
    // validation and test labels always have keys.
    let vocab = LabelVocab::from_records(&records);
    let splits = partition(records, args.test_fraction);
    println!(
        "loaded {} images across {} labels (train {}, validation {}, test {})",
        splits.total(),
        vocab.len(),
        splits.train.len(),
        splits.validation.len(),
        splits.test.len()
    );

    if let Some(parent) = Path::new(&args.checkpoint_out).parent() {
        fs::create_dir_all(parent)?;
    }

    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    match args.backbone {
        Backbone::Mlp => {
            let model = train_mlp(&args, &splits, &vocab, &mut |m| println!("{m}"))?;
            model
                .clone()
                .save_file(Path::new(&args.checkpoint_out), &recorder)
                .map_err(|e| anyhow::anyhow!("failed to save checkpoint: {e}"))?;
            report_predictions(model, &vocab, &splits, args.image_size)?;
        }
        Backbone::Cnn => {
            let model = train_cnn(&args, &splits, &vocab, &mut |m| println!("{m}"))?;
            model
                .clone()
                .save_file(Path::new(&args.checkpoint_out), &recorder)
                .map_err(|e| anyhow::anyhow!("failed to save checkpoint: {e}"))?;
            report_predictions(model, &vocab, &splits, args.image_size)?;
        }
    }

    vocab.save(&vocab_path(&args.checkpoint_out))?;
    println!("Saved checkpoint to {}", args.checkpoint_out);
    Ok(())
}

pub fn train_mlp(
    args: &TrainArgs,
    splits: &DatasetSplits,
    vocab: &LabelVocab,
    on_epoch: &mut dyn FnMut(&EpochMetrics),
) -> anyhow::Result<MlpClassifier<ADBackend>> {
    let device = <ADBackend as burn::tensor::backend::Backend>::Device::default();
    let cfg = MlpClassifierConfig::new(args.image_size as usize, vocab.len());
    let mut model = MlpClassifier::<ADBackend>::new(cfg, &device);
    let mut optim = AdamConfig::new().init();

    let batch_size = args.batch_size.max(1);
    for epoch in 0..args.epochs {
        let mut losses = Vec::new();
        for chunk in splits.train.chunks(batch_size) {
            let batch = collate::<ADBackend>(chunk, vocab, args.image_size, &device)?;
            let logits = model.forward(batch.images);
            let loss = CrossEntropyLossConfig::new()
                .init(&device)
                .forward(logits, batch.targets);
            let loss_detached = loss.clone().detach();
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(args.lr, model, grads);

            let loss_val: f32 = loss_detached
                .into_data()
                .to_vec::<f32>()
                .unwrap_or_default()
                .into_iter()
                .next()
                .unwrap_or(0.0);
            losses.push(loss_val);
        }
        on_epoch(&epoch_metrics(
            epoch,
            &losses,
            &model,
            splits,
            vocab,
            args,
            &device,
        )?);
    }
    Ok(model)
}

pub fn train_cnn(
    args: &TrainArgs,
    splits: &DatasetSplits,
    vocab: &LabelVocab,
    on_epoch: &mut dyn FnMut(&EpochMetrics),
) -> anyhow::Result<CnnClassifier<ADBackend>> {
    let device = <ADBackend as burn::tensor::backend::Backend>::Device::default();
    let cfg = CnnClassifierConfig::new(args.image_size as usize, vocab.len());
    let mut model = CnnClassifier::<ADBackend>::new(cfg, &device);
    let mut optim = AdamConfig::new().init();

    let batch_size = args.batch_size.max(1);
    for epoch in 0..args.epochs {
        let mut losses = Vec::new();
        for chunk in splits.train.chunks(batch_size) {
            let batch = collate::<ADBackend>(chunk, vocab, args.image_size, &device)?;
            let logits = model.forward(batch.images);
            let loss = CrossEntropyLossConfig::new()
                .init(&device)
                .forward(logits, batch.targets);
            let loss_detached = loss.clone().detach();
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(args.lr, model, grads);

            let loss_val: f32 = loss_detached
                .into_data()
                .to_vec::<f32>()
                .unwrap_or_default()
                .into_iter()
                .next()
                .unwrap_or(0.0);
            losses.push(loss_val);
        }
        on_epoch(&epoch_metrics(
            epoch,
            &losses,
            &model,
            splits,
            vocab,
            args,
            &device,
        )?);
    }
    Ok(model)
}

fn epoch_metrics<M: Classifier<ADBackend>>(
    epoch: usize,
    losses: &[f32],
    model: &M,
    splits: &DatasetSplits,
    vocab: &LabelVocab,
    args: &TrainArgs,
    device: &<ADBackend as burn::tensor::backend::Backend>::Device,
) -> anyhow::Result<EpochMetrics> {
    let train_loss = if losses.is_empty() {
        0.0
    } else {
        losses.iter().sum::<f32>() / losses.len() as f32
    };
    let validation_accuracy = if splits.validation.is_empty() {
        None
    } else {
        Some(accuracy::<ADBackend, M>(
            model,
            &splits.validation,
            vocab,
            args.image_size,
            device,
            args.batch_size,
        )?)
    };
    Ok(EpochMetrics {
        epoch,
        train_loss,
        validation_accuracy,
    })
}

/// Fraction of records whose argmax prediction matches their label key.
pub fn accuracy<B, M>(
    model: &M,
    records: &[ImageRecord],
    vocab: &LabelVocab,
    image_size: u32,
    device: &B::Device,
    batch_size: usize,
) -> anyhow::Result<f32>
where
    B: burn::tensor::backend::Backend,
    M: Classifier<B>,
{
    let mut correct = 0usize;
    let mut total = 0usize;
    for chunk in records.chunks(batch_size.max(1)) {
        let batch = collate::<B>(chunk, vocab, image_size, device)?;
        let preds = model
            .forward(batch.images)
            .argmax(1)
            .into_data()
            .to_vec::<i64>()
            .unwrap_or_default();
        let targets = batch
            .targets
            .into_data()
            .to_vec::<i64>()
            .unwrap_or_default();
        for (p, t) in preds.into_iter().zip(targets) {
            if p == t {
                correct += 1;
            }
            total += 1;
        }
    }
    Ok(if total == 0 {
        0.0
    } else {
        correct as f32 / total as f32
    })
}

fn report_predictions<M: Classifier<ADBackend>>(
    model: M,
    vocab: &LabelVocab,
    splits: &DatasetSplits,
    image_size: u32,
) -> anyhow::Result<()> {
    if splits.test.is_empty() {
        eprintln!("test partition is empty; skipping prediction report");
        return Ok(());
    }
    let device = <ADBackend as burn::tensor::backend::Backend>::Device::default();
    let engine = PredictionEngine::new(model, vocab.clone(), image_size, device);

    println!("Classifying single image");
    println!("{}", engine.classify_first(&splits.test)?);

    println!("Classifying multiple images");
    for prediction in engine.classify_batch(&splits.test, DEFAULT_BATCH_LIMIT)? {
        println!("{prediction}");
    }
    Ok(())
}

pub fn load_mlp_from_checkpoint<P: AsRef<Path>>(
    path: P,
    cfg: MlpClassifierConfig,
    device: &<TrainBackend as burn::tensor::backend::Backend>::Device,
) -> Result<MlpClassifier<TrainBackend>, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    MlpClassifier::<TrainBackend>::new(cfg, device).load_file(path.as_ref(), &recorder, device)
}

pub fn load_cnn_from_checkpoint<P: AsRef<Path>>(
    path: P,
    cfg: CnnClassifierConfig,
    device: &<TrainBackend as burn::tensor::backend::Backend>::Device,
) -> Result<CnnClassifier<TrainBackend>, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    CnnClassifier::<TrainBackend>::new(cfg, device).load_file(path.as_ref(), &recorder, device)
}
