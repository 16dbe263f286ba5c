use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixelbayes::{grid_from_rows, logging, Corpus, EngineConfig, NaiveBayes, PixelGrid};

#[derive(Parser, Debug)]
#[command(name = "pixelbayes")]
#[command(about = "Naive Bayes classifier for ASCII pixel-grid images")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a labeled corpus and save it
    Train {
        /// Labeled training corpus
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Where to write the trained model
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Measure a saved model's accuracy on a held-out labeled corpus
    Accuracy {
        /// Saved model file
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Held-out labeled corpus
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// Classify a single unlabeled ASCII image
    Predict {
        /// Saved model file
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// File holding the image rows, one per line
        image: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_model(path: &Path) -> Result<NaiveBayes> {
    let mut model = NaiveBayes::new();
    model
        .load(path)
        .with_context(|| format!("loading model {}", path.display()))?;
    Ok(model)
}

/// Reads an unlabeled image file into a pixel grid.
fn load_grid(path: &Path) -> Result<PixelGrid> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading image {}", path.display()))?;
    let rows: Vec<&str> = contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();
    grid_from_rows(&rows).with_context(|| format!("parsing image {}", path.display()))
}

fn render(grid: &PixelGrid) -> String {
    let mut out = String::with_capacity(grid.nrows() * (grid.ncols() + 1));
    for row in 0..grid.nrows() {
        out.extend((0..grid.ncols()).map(|col| grid[(row, col)].to_char()));
        out.push('\n');
    }
    out
}

fn train(config: &EngineConfig, corpus: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let corpus_path = corpus.unwrap_or_else(|| config.paths.training_corpus.clone());
    let output = output.unwrap_or_else(|| config.paths.model.clone());

    let corpus = Corpus::load(&corpus_path)
        .with_context(|| format!("loading corpus {}", corpus_path.display()))?;

    let mut model = NaiveBayes::new();
    model.fit(&corpus).context("training model")?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    model
        .save(&output)
        .with_context(|| format!("saving model {}", output.display()))?;

    println!(
        "Trained on {} images ({} labels), model saved to {}",
        model.total_images(),
        model.table().num_labels(),
        output.display()
    );
    Ok(())
}

fn accuracy(config: &EngineConfig, model: Option<PathBuf>, corpus: Option<PathBuf>) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.paths.model.clone());
    let corpus_path = corpus.unwrap_or_else(|| config.paths.test_corpus.clone());

    let model = load_model(&model_path)?;
    let corpus = Corpus::load(&corpus_path)
        .with_context(|| format!("loading corpus {}", corpus_path.display()))?;

    let evaluation = model.evaluate(&corpus).context("evaluating model")?;
    println!(
        "{}/{} correct, accuracy {:.4}",
        evaluation.correct,
        evaluation.total,
        evaluation.accuracy()?
    );
    Ok(())
}

fn predict(config: &EngineConfig, model: Option<PathBuf>, image: &Path) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.paths.model.clone());
    let model = load_model(&model_path)?;
    let grid = load_grid(image)?;

    print!("{}", render(&grid));
    for (label, score) in model.scores(&grid)? {
        println!("  {label}: {score:.4}");
    }
    println!("Prediction: {}", model.predict(&grid)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init(&config.logging.filter);
    tracing::debug!(?config, "configuration loaded");

    match args.command {
        Command::Train { corpus, output } => train(&config, corpus, output),
        Command::Accuracy { model, corpus } => accuracy(&config, model, corpus),
        Command::Predict { model, image } => predict(&config, model, &image),
    }
}
