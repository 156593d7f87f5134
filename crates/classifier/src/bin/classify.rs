use clap::Parser;
use classifier::model::{CnnClassifierConfig, MlpClassifierConfig};
use classifier::predict::{PredictionEngine, DEFAULT_BATCH_LIMIT};
use classifier::train::{
    load_cnn_from_checkpoint, load_mlp_from_checkpoint, validate_backend_choice, vocab_path,
    Backbone, BackendKind, LabelMode,
};
use classifier::TrainBackend;
use dataset::{enumerate_images, LabelVocab};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "classify",
    about = "Classify a folder of labeled images with a trained checkpoint"
)]
struct Args {
    /// Root folder of labeled images.
    #[arg(long, default_value = "assets")]
    dataset_root: String,
    /// Where labels come from: parent folder name or file-name prefix.
    #[arg(long, value_enum, default_value_t = LabelMode::FolderName)]
    label_mode: LabelMode,
    /// Backbone the checkpoint was trained with.
    #[arg(long, value_enum, default_value_t = Backbone::Cnn)]
    backbone: Backbone,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    backend: BackendKind,
    /// Square size images are resized to; must match training.
    #[arg(long, default_value_t = 64)]
    image_size: u32,
    /// Checkpoint path to load.
    #[arg(long, default_value = "checkpoints/classifier.bin")]
    checkpoint: String,
    /// Vocabulary JSON path (defaults to the file next to the checkpoint).
    #[arg(long)]
    vocab: Option<String>,
    /// Maximum number of predictions to print.
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    limit: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    validate_backend_choice(args.backend)?;

    let vocab_file = args
        .vocab
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| vocab_path(&args.checkpoint));
    let vocab = LabelVocab::load(&vocab_file)?;

    let records = enumerate_images(Path::new(&args.dataset_root), args.label_mode.into())?;
    if records.is_empty() {
        println!("No images found under {}", args.dataset_root);
        return Ok(());
    }

    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    match args.backbone {
        Backbone::Mlp => {
            let cfg = MlpClassifierConfig::new(args.image_size as usize, vocab.len());
            let model = load_mlp_from_checkpoint(&args.checkpoint, cfg, &device)
                .map_err(|e| anyhow::anyhow!("failed to load checkpoint {}: {e}", args.checkpoint))?;
            let engine = PredictionEngine::new(model, vocab, args.image_size, device);
            println!("Classifying single image");
            println!("{}", engine.classify_first(&records)?);
            println!("Classifying multiple images");
            for prediction in engine.classify_batch(&records, args.limit)? {
                println!("{prediction}");
            }
        }
        Backbone::Cnn => {
            let cfg = CnnClassifierConfig::new(args.image_size as usize, vocab.len());
            let model = load_cnn_from_checkpoint(&args.checkpoint, cfg, &device)
                .map_err(|e| anyhow::anyhow!("failed to load checkpoint {}: {e}", args.checkpoint))?;
            let engine = PredictionEngine::new(model, vocab, args.image_size, device);
            println!("Classifying single image");
            println!("{}", engine.classify_first(&records)?);
            println!("Classifying multiple images");
            for prediction in engine.classify_batch(&records, args.limit)? {
                println!("{prediction}");
            }
        }
    }

    Ok(())
}
